// Viewport dimensions and the buffers sized from them.
// Visual: the frame always covers the whole window, at device resolution.

use glam::Vec2;
use log::debug;

use crate::types::{FrameBuffer, Layer};

/// Logical (CSS) size plus device pixel ratio, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// A ratio that is not a positive finite number is read as 1.
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            device_pixel_ratio: dpr,
        }
    }

    /// Device pixel dimensions: `floor(logical * dpr)`, never zero.
    pub fn device_size(&self) -> (usize, usize) {
        let w = (self.width * self.device_pixel_ratio).floor() as usize;
        let h = (self.height * self.device_pixel_ratio).floor() as usize;
        (w.max(1), h.max(1))
    }

    pub fn logical_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// The frame plus the off-screen glow buffers, all kept in step with the viewport.
pub struct ViewportSurface {
    viewport: Viewport,
    layer_scale: f32,
    pub(crate) frame: FrameBuffer, // what the host presents
    pub(crate) glow: Layer,        // accumulation layer for the blobs
    pub(crate) scratch: Layer,     // blur intermediate, same size as `glow`
}

impl ViewportSurface {
    pub fn new(viewport: Viewport, layer_scale: f32) -> Self {
        let layer_scale = layer_scale.clamp(f32::EPSILON, 1.0);
        let (w, h) = viewport.device_size();
        let (lw, lh) = layer_size(w, h, layer_scale);
        Self {
            viewport,
            layer_scale,
            frame: FrameBuffer::new(w, h),
            glow: Layer::new(lw, lh),
            scratch: Layer::new(lw, lh),
        }
    }

    /// Recompute device dimensions for a new viewport; buffers are reallocated
    /// only when the device size actually changes.
    /// Visual: nothing until the next frame, which fills the new size.
    pub fn resize(&mut self, viewport: Viewport) {
        let old = self.viewport.device_size();
        self.viewport = viewport;
        let (w, h) = viewport.device_size();
        if (w, h) == old {
            return;
        }
        let (lw, lh) = layer_size(w, h, self.layer_scale);
        self.frame.resize(w, h);
        self.glow.resize(lw, lh);
        self.scratch.resize(lw, lh);
        debug!(
            "surface resized to {w}x{h} device px ({}x{} @ {})",
            viewport.width, viewport.height, viewport.device_pixel_ratio
        );
    }

    /// Viewport the buffers are sized for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frame size in device px.
    pub fn device_size(&self) -> (usize, usize) {
        (self.frame.width, self.frame.height)
    }

    /// Logical-to-device transform: a uniform scale by the pixel ratio.
    pub fn to_device(&self, logical: Vec2) -> Vec2 {
        logical * self.viewport.device_pixel_ratio
    }

    /// Device px → accumulation layer px, per axis. Each axis is rounded on
    /// its own, so the two ratios can differ slightly.
    pub(crate) fn layer_factor(&self) -> Vec2 {
        Vec2::new(
            self.glow.width as f32 / self.frame.width as f32,
            self.glow.height as f32 / self.frame.height as f32,
        )
    }

    /// The composed output frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn glow_layer(&self) -> &Layer {
        &self.glow
    }
}

fn layer_size(w: usize, h: usize, scale: f32) -> (usize, usize) {
    let lw = ((w as f32) * scale).round() as usize;
    let lh = ((h as f32) * scale).round() as usize;
    (lw.max(1), lh.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_size_scales_by_pixel_ratio() {
        assert_eq!(Viewport::new(800.0, 600.0, 1.0).device_size(), (800, 600));
        assert_eq!(Viewport::new(800.0, 600.0, 2.0).device_size(), (1600, 1200));
        // Truncates like assigning to canvas.width.
        assert_eq!(Viewport::new(801.0, 601.0, 1.5).device_size(), (1201, 901));
    }

    #[test]
    fn bad_pixel_ratio_falls_back_to_one() {
        assert_eq!(Viewport::new(10.0, 10.0, 0.0).device_pixel_ratio, 1.0);
        assert_eq!(Viewport::new(10.0, 10.0, f32::NAN).device_pixel_ratio, 1.0);
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).device_size(), (1, 1));
    }

    #[test]
    fn resize_keeps_logical_drawing_scale() {
        let mut surface = ViewportSurface::new(Viewport::new(800.0, 600.0, 2.0), 0.5);
        assert_eq!(surface.device_size(), (1600, 1200));
        assert_eq!(surface.glow_layer().dimensions(), (800, 600));

        surface.resize(Viewport::new(1600.0, 1200.0, 2.0));
        assert_eq!(surface.device_size(), (3200, 2400));
        assert_eq!(surface.glow_layer().dimensions(), (1600, 1200));
        assert_eq!(surface.to_device(Vec2::new(100.0, 50.0)), Vec2::new(200.0, 100.0));
    }

    #[test]
    fn layer_factor_follows_each_axis_rounding() {
        let surface = ViewportSurface::new(Viewport::new(100.0, 1081.0, 1.0), 0.5);
        assert_eq!(surface.glow_layer().dimensions(), (50, 541));
        let factor = surface.layer_factor();
        assert_eq!(factor.x, 0.5);
        assert!((factor.y - 541.0 / 1081.0).abs() < 1e-7);
        // The bottom edge of the frame lands on the bottom edge of the layer.
        assert!((1081.0 * factor.y - 541.0).abs() < 1e-3);
    }

    #[test]
    fn pixel_ratio_change_alone_resizes() {
        let mut surface = ViewportSurface::new(Viewport::new(400.0, 300.0, 1.0), 1.0);
        surface.resize(Viewport::new(400.0, 300.0, 3.0));
        assert_eq!(surface.device_size(), (1200, 900));
        assert_eq!(surface.frame().pixels.len(), 1200 * 900);
    }
}
