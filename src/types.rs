// Core pixel types shared by the painter, the blur and the hosts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The image a host presents: one `0x00RRGGBB` word per device pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,     // device pixels
    pub height: usize,    // device pixels
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
        }
    }

    /// Reallocate for new dimensions; contents are reset to black.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Tightly packed RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            out.push(((p >> 16) & 0xFF) as u8);
            out.push(((p >> 8) & 0xFF) as u8);
            out.push((p & 0xFF) as u8);
        }
        out
    }
}

/// Premultiplied RGBA accumulation buffer (each channel in 0..1).
///
/// Glows are screened into a layer, the layer is blurred as a whole, and the
/// result is composited onto the [`FrameBuffer`].
#[derive(Clone, Debug)]
pub struct Layer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f32; 4]>,
}

impl Layer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, [0.0; 4]);
    }

    /// Back to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub(crate) fn ensure_same_size(&self, other: &Layer, what: &'static str) -> Result<(), Error> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::size_mismatch(what, self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    /// Bilinear sample at continuous layer coordinates (pixel centers at +0.5).
    /// Coordinates outside the layer clamp to the nearest edge.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [f32; 4] {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let fx = (x - 0.5).clamp(0.0, max_x);
        let fy = (y - 0.5).clamp(0.0, max_y);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let p00 = self.pixels[y0 * self.width + x0];
        let p10 = self.pixels[y0 * self.width + x1];
        let p01 = self.pixels[y1 * self.width + x0];
        let p11 = self.pixels[y1 * self.width + x1];

        let mut out = [0.0f32; 4];
        for c in 0..4 {
            let top = p00[c] + (p10[c] - p00[c]) * tx;
            let bottom = p01[c] + (p11[c] - p01[c]) * tx;
            out[c] = top + (bottom - top) * ty;
        }
        out
    }
}

/// An opaque sRGB color. Serialized as a `#RRGGBB` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#145F88` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidConfig(format!("color {hex:?} is not #RRGGBB")));
        }
        let n = u32::from_str_radix(digits, 16)
            .map_err(|_| Error::InvalidConfig(format!("color {hex:?} is not #RRGGBB")))?;
        Ok(Self::unpack(n))
    }

    #[inline]
    pub const fn pack(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn unpack(p: u32) -> Self {
        Self::new(((p >> 16) & 0xFF) as u8, ((p >> 8) & 0xFF) as u8, (p & 0xFF) as u8)
    }

    /// Channels scaled to 0..1.
    #[inline]
    pub fn unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[inline]
pub(crate) fn unpack_unit(p: u32) -> [f32; 3] {
    Rgb::unpack(p).unit()
}

#[inline]
pub(crate) fn pack_unit(c: [f32; 3]) -> u32 {
    let to8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (to8(c[0]) << 16) | (to8(c[1]) << 8) | to8(c[2])
}
