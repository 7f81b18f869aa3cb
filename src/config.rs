//! Tunables for the background renderer.
//!
//! Every field has a default matching the blurred-glow look; a TOML file only
//! needs to name the values it changes:
//!
//! ```toml
//! [pointer]
//! damping = 0.045
//!
//! [palette]
//! glow_a = "#0D5C5C"
//! glow_b = "#0D5C5C"
//!
//! [glow]
//! mode = "direct"
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Rgb;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub pointer: PointerConfig,
    pub blobs: BlobConfig,
    pub bridge: BridgeConfig,
    pub palette: Palette,
    pub glow: GlowConfig,
    pub grain: GrainConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Fraction of the remaining distance the smoothed pointer covers per frame.
    pub damping: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self { damping: 0.09 }
    }
}

/// One sine term: `sin(frequency * t + phase)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub frequency: f32, // rad/s
    #[serde(default)]
    pub phase: f32,
}

impl Wave {
    pub const fn new(frequency: f32) -> Self {
        Self { frequency, phase: 0.0 }
    }

    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        (self.frequency * t + self.phase).sin()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub x: Wave,
    pub y: Wave,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Normalized resting centers, left and right of the middle.
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    /// Drift amplitude as a fraction of the viewport width/height.
    pub drift_amplitude: f32,
    pub drift_a: Drift,
    pub drift_b: Drift,
    /// Pointer displacement multiplier per axis.
    pub parallax: Vec2,
    /// How far the parallax term moves each blob, per axis.
    pub parallax_spread: Vec2,
    /// Blob radius as a fraction of the viewport width.
    pub radius: f32,
    /// Extra radius at full merge strength.
    pub radius_swell: f32,
    pub alpha_a: f32,
    pub alpha_b: f32,
    /// Distance (fraction of width) below which the blobs start to merge.
    pub merge_threshold: f32,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            anchor_a: Vec2::new(0.28, 0.42),
            anchor_b: Vec2::new(0.72, 0.58),
            drift_amplitude: 0.05,
            drift_a: Drift {
                x: Wave::new(0.22),
                y: Wave::new(0.18),
            },
            drift_b: Drift {
                x: Wave::new(0.19),
                y: Wave::new(0.16),
            },
            parallax: Vec2::new(0.55, 0.45),
            parallax_spread: Vec2::new(0.28, 0.22),
            radius: 0.34,
            radius_swell: 0.05,
            alpha_a: 0.52,
            alpha_b: 0.48,
            merge_threshold: 0.52,
        }
    }
}

/// A glow whose radius and alpha grow linearly with merge strength.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeGlow {
    pub radius: f32, // fraction of width
    pub radius_gain: f32,
    pub alpha: f32,
    pub alpha_gain: f32,
}

impl BridgeGlow {
    pub fn radius_at(&self, merge: f32) -> f32 {
        self.radius + merge * self.radius_gain
    }

    pub fn alpha_at(&self, merge: f32) -> f32 {
        self.alpha + merge * self.alpha_gain
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Merge strength above which the bridge is drawn at all.
    pub min_merge: f32,
    /// Bright center in the bridge color.
    pub core: BridgeGlow,
    /// Wider halos in glow color A.
    pub halos: Vec<BridgeGlow>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            min_merge: 0.05,
            core: BridgeGlow {
                radius: 0.26,
                radius_gain: 0.10,
                alpha: 0.04,
                alpha_gain: 0.12,
            },
            halos: vec![
                BridgeGlow {
                    radius: 0.32,
                    radius_gain: 0.12,
                    alpha: 0.06,
                    alpha_gain: 0.08,
                },
                BridgeGlow {
                    radius: 0.32,
                    radius_gain: 0.12,
                    alpha: 0.05,
                    alpha_gain: 0.07,
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub glow_a: Rgb,
    pub glow_b: Rgb,
    pub bridge: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_glow(Rgb::new(0x14, 0x5F, 0x88))
    }
}

impl Palette {
    pub const PRESETS: [&'static str; 5] = ["ocean", "teal", "slate", "violet", "amber"];

    /// Both blobs in `glow`, white bridge core.
    pub const fn with_glow(glow: Rgb) -> Self {
        Self {
            glow_a: glow,
            glow_b: glow,
            bridge: Rgb::WHITE,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        let glow = match name.to_ascii_lowercase().as_str() {
            "ocean" => Rgb::new(0x14, 0x5F, 0x88),
            "teal" => Rgb::new(0x0D, 0x5C, 0x5C),
            "slate" => Rgb::new(0x2A, 0x4A, 0x5E),
            "violet" => Rgb::new(0x2E, 0x24, 0x42),
            "amber" => Rgb::new(0x4A, 0x35, 0x28),
            _ => return None,
        };
        Some(Self::with_glow(glow))
    }
}

/// How glows reach the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlowMode {
    /// Accumulate, blur, then composite at reduced opacity.
    #[default]
    Blurred,
    /// Screen the gradients straight onto the frame; no blur.
    Direct,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    pub mode: GlowMode,
    /// Gaussian standard deviation in logical px.
    pub blur_radius: f32,
    /// Opacity of the blurred layer over the black base.
    pub opacity: f32,
    /// Resolution of the accumulation layer relative to the device frame.
    pub layer_scale: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            mode: GlowMode::Blurred,
            blur_radius: 60.0,
            opacity: 0.78,
            layer_scale: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainConfig {
    /// Tile edge in texels (and logical px).
    pub size: usize,
    /// Per-texel alpha, 0..=255. The subtler look uses 22, the stronger 35.
    pub alpha: u8,
    /// Global opacity of the overlay pass.
    pub opacity: f32,
    /// Tile scroll speed in logical px/s.
    pub speed: Vec2,
    /// Fixed seed for reproducible noise; random when absent.
    pub seed: Option<u64>,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            size: 220,
            alpha: 22,
            opacity: 0.12,
            speed: Vec2::new(10.0, 8.0),
            seed: None,
        }
    }
}

impl RendererConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: RendererConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values the paint routine cannot honor.
    pub fn validate(&self) -> Result<(), Error> {
        let damping = self.pointer.damping;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "pointer.damping must be in (0, 1], got {damping}"
            )));
        }
        let scale = self.glow.layer_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "glow.layer_scale must be in (0, 1], got {scale}"
            )));
        }
        if !(self.glow.blur_radius >= 0.0) {
            return Err(Error::InvalidConfig("glow.blur_radius must be >= 0".into()));
        }
        let mut unit_values = vec![
            ("glow.opacity".to_string(), self.glow.opacity),
            ("grain.opacity".to_string(), self.grain.opacity),
            ("blobs.alpha_a".to_string(), self.blobs.alpha_a),
            ("blobs.alpha_b".to_string(), self.blobs.alpha_b),
            ("bridge.min_merge".to_string(), self.bridge.min_merge),
        ];
        let bridge = std::iter::once(("bridge.core".to_string(), &self.bridge.core)).chain(
            self.bridge
                .halos
                .iter()
                .enumerate()
                .map(|(i, halo)| (format!("bridge.halos[{i}]"), halo)),
        );
        for (name, glow) in bridge {
            unit_values.push((format!("{name}.alpha"), glow.alpha));
            unit_values.push((format!("{name}.alpha_gain"), glow.alpha_gain));
            // Strongest alpha, reached at full merge.
            unit_values.push((format!("{name} alpha at full merge"), glow.alpha_at(1.0)));
        }
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.grain.size == 0 {
            return Err(Error::InvalidConfig("grain.size must be positive".into()));
        }
        if !(self.blobs.merge_threshold > 0.0) {
            return Err(Error::InvalidConfig(
                "blobs.merge_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RendererConfig::default();
        config.validate().unwrap();
        assert_eq!(config.pointer.damping, 0.09);
        assert_eq!(config.grain.alpha, 22);
        assert_eq!(config.glow.mode, GlowMode::Blurred);
        assert_eq!(config.bridge.halos.len(), 2);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = RendererConfig::from_toml_str(
            r##"
            [pointer]
            damping = 0.045

            [palette]
            glow_a = "#0D5C5C"
            glow_b = "#0D5C5C"
            bridge = "#FFFFFF"

            [glow]
            mode = "direct"

            [grain]
            alpha = 35
            seed = 7
            "##,
        )
        .unwrap();
        assert_eq!(config.pointer.damping, 0.045);
        assert_eq!(config.palette, Palette::preset("teal").unwrap());
        assert_eq!(config.glow.mode, GlowMode::Direct);
        assert_eq!(config.glow.opacity, 0.78);
        assert_eq!(config.grain.alpha, 35);
        assert_eq!(config.grain.seed, Some(7));
        assert_eq!(config.blobs, BlobConfig::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = RendererConfig::from_toml_str("[pointer]\ndamping = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("pointer.damping"));

        let err = RendererConfig::from_toml_str("[glow]\nlayer_scale = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("layer_scale"));

        let err = RendererConfig::from_toml_str("[grain]\nsize = 0\n").unwrap_err();
        assert!(err.to_string().contains("grain.size"));

        let err = RendererConfig::from_toml_str("[blobs]\nalpha_a = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("blobs.alpha_a"));

        let err = RendererConfig::from_toml_str("[bridge]\nmin_merge = -0.1\n").unwrap_err();
        assert!(err.to_string().contains("bridge.min_merge"));

        let mut config = RendererConfig::default();
        config.bridge.halos[1].alpha_gain = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bridge.halos[1].alpha_gain"));

        let mut config = RendererConfig::default();
        config.bridge.core.alpha = 0.6;
        config.bridge.core.alpha_gain = 0.6;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bridge.core alpha at full merge"));
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let err = RendererConfig::from_toml_str("[palette]\nglow_a = \"blue\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn presets_cover_the_listed_names() {
        for name in Palette::PRESETS {
            assert!(Palette::preset(name).is_some(), "{name}");
        }
        assert_eq!(Palette::preset("OCEAN"), Some(Palette::default()));
        assert!(Palette::preset("neon").is_none());
    }
}
