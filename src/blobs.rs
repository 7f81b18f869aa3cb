// Where the glows go this frame: drift, parallax and the merge bridge.
// Pure math over logical pixels; nothing here touches a buffer.

use glam::Vec2;

use crate::config::{Drift, RendererConfig};
use crate::types::Rgb;
use crate::viewport::Viewport;

/// One soft radial glow, in logical px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub center: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub alpha: f32,
}

/// Everything the painter needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    /// Left (A) and right (B) blob.
    pub blobs: [Glow; 2],
    /// 0 when far apart, 1 when on top of each other.
    pub merge: f32,
    /// Midpoint glows; empty below the bridge threshold.
    pub bridge: Vec<Glow>,
}

impl FrameLayout {
    /// Every glow in paint order.
    pub fn glows(&self) -> impl Iterator<Item = &Glow> {
        self.blobs.iter().chain(self.bridge.iter())
    }

    pub fn distance(&self) -> f32 {
        self.blobs[0].center.distance(self.blobs[1].center)
    }
}

/// `max(0, 1 - distance / threshold)`, clamped to [0, 1].
pub fn merge_strength(distance: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / threshold).clamp(0.0, 1.0)
}

/// Normalized drift offset at time `t`.
pub fn drift(t: f32, drift: &Drift, amplitude: f32) -> Vec2 {
    Vec2::new(drift.x.at(t), drift.y.at(t)) * amplitude
}

/// Compute the frame's glows from time and the pointer's offset from center.
pub fn layout(config: &RendererConfig, viewport: &Viewport, t: f32, pointer_offset: Vec2) -> FrameLayout {
    let blobs = &config.blobs;
    let size = viewport.logical_size();

    let d_a = drift(t, &blobs.drift_a, blobs.drift_amplitude);
    let d_b = drift(t, &blobs.drift_b, blobs.drift_amplitude);

    // Opposite signs: the blobs spread apart or pull together with the pointer.
    let parallax = pointer_offset * blobs.parallax * blobs.parallax_spread;
    let center_a = size * (blobs.anchor_a + d_a + parallax);
    let center_b = size * (blobs.anchor_b + d_b - parallax);

    let merge = merge_strength(center_a.distance(center_b), size.x * blobs.merge_threshold);
    let radius = size.x * (blobs.radius + merge * blobs.radius_swell);

    let palette = &config.palette;
    let glow_a = Glow {
        center: center_a,
        radius,
        color: palette.glow_a,
        alpha: blobs.alpha_a,
    };
    let glow_b = Glow {
        center: center_b,
        radius,
        color: palette.glow_b,
        alpha: blobs.alpha_b,
    };

    let mut bridge = Vec::new();
    if merge > config.bridge.min_merge {
        let mid = (center_a + center_b) * 0.5;
        let core = &config.bridge.core;
        bridge.push(Glow {
            center: mid,
            radius: size.x * core.radius_at(merge),
            color: palette.bridge,
            alpha: core.alpha_at(merge),
        });
        for halo in &config.bridge.halos {
            bridge.push(Glow {
                center: mid,
                radius: size.x * halo.radius_at(merge),
                color: palette.glow_a,
                alpha: halo.alpha_at(merge),
            });
        }
    }

    FrameLayout {
        blobs: [glow_a, glow_b],
        merge,
        bridge,
    }
}
