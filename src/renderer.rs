// The animated background: two drifting glows, a merge bridge and grain.
// Visual: slow blue light over true black that leans toward the mouse.

use glam::Vec2;
use log::{debug, trace};

use crate::blobs::{self, FrameLayout};
use crate::blur::gaussian_blur;
use crate::composite::{composite_layer, overlay_grain, BlendMode};
use crate::config::{GlowMode, RendererConfig};
use crate::error::Error;
use crate::grain::GrainTexture;
use crate::paint::paint_glow;
use crate::pointer::PointerState;
use crate::types::{FrameBuffer, Rgb};
use crate::viewport::{Viewport, ViewportSurface};

/// Base fill under everything.
const BASE: Rgb = Rgb::BLACK;

/// Owns every piece of per-instance animation state; nothing is global.
pub struct BackgroundRenderer {
    config: RendererConfig,
    surface: ViewportSurface,
    pointer: PointerState,
    grain: GrainTexture,
    layout: Option<FrameLayout>,
    frames: u64,
}

impl BackgroundRenderer {
    /// Size the surface for `viewport` and generate the grain tile, once.
    pub fn new(config: RendererConfig, viewport: Viewport) -> Self {
        let surface = ViewportSurface::new(viewport, config.glow.layer_scale);
        let pointer = PointerState::new(config.pointer.damping);
        let grain = GrainTexture::from_seed(config.grain.size, config.grain.alpha, config.grain.seed);
        let (w, h) = surface.device_size();
        debug!("background renderer ready at {w}x{h} ({:?} glows)", config.glow.mode);
        Self {
            config,
            surface,
            pointer,
            grain,
            layout: None,
            frames: 0,
        }
    }

    /// Follow a viewport change; the grain tile is kept.
    /// Visual: the glows rescale to the new window, still at full sharpness.
    pub fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
    }

    /// Pointer position in logical client px.
    /// Visual: over the next frames the glows lean toward this spot.
    pub fn pointer_moved(&mut self, client: Vec2) {
        let viewport = self.surface.viewport();
        self.pointer.set_target(client, &viewport);
    }

    /// Advance the pointer one frame and compute where the glows go at `t`,
    /// without painting.
    pub fn step(&mut self, t: f32) -> &FrameLayout {
        let layout = self.next_layout(t);
        self.layout.insert(layout)
    }

    fn next_layout(&mut self, t: f32) -> FrameLayout {
        self.pointer.step();
        blobs::layout(&self.config, &self.surface.viewport(), t, self.pointer.offset())
    }

    /// Paint one full frame for elapsed time `t` (seconds) and return it.
    /// Visual: black base, blurred glows, grain; exactly what the host shows.
    pub fn paint_frame(&mut self, t: f32) -> Result<&FrameBuffer, Error> {
        let layout = self.next_layout(t);
        let layout = self.layout.insert(layout);
        let surface = &mut self.surface;
        let dpr = surface.viewport().device_pixel_ratio;

        /* 1) True black base. */
        surface.frame.fill(BASE.pack());

        /* 2) Screen every glow into the accumulation layer (layer px). */
        surface.glow.clear();
        let to_layer = surface.layer_factor() * dpr;
        // Glows stay circular; the axes differ by well under a pixel.
        let radius_scale = (to_layer.x + to_layer.y) * 0.5;
        for glow in layout.glows() {
            paint_glow(
                &mut surface.glow,
                glow.center * to_layer,
                glow.radius * radius_scale,
                glow.color,
                glow.alpha,
            );
        }

        /* 3) Soften and lay the glows over the base. */
        let glow = &self.config.glow;
        match glow.mode {
            GlowMode::Blurred => {
                let sigma = glow.blur_radius * radius_scale;
                gaussian_blur(&mut surface.glow, &mut surface.scratch, sigma)?;
                composite_layer(&mut surface.frame, &surface.glow, BlendMode::SourceOver, glow.opacity)?;
            }
            GlowMode::Direct => {
                composite_layer(&mut surface.frame, &surface.glow, BlendMode::Screen, 1.0)?;
            }
        }

        /* 4) Scrolling grain on top. */
        let grain = &self.config.grain;
        let offset = self.grain.offset(t, grain.speed);
        overlay_grain(&mut surface.frame, &self.grain, offset, dpr, grain.opacity);

        self.frames += 1;
        trace!("frame {} at t={t:.3}s merge={:.3}", self.frames, layout.merge);
        Ok(&surface.frame)
    }

    /// Settings this renderer was built with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Current viewport and the buffers sized from it.
    pub fn surface(&self) -> &ViewportSurface {
        &self.surface
    }

    /// Last painted frame (black before the first one).
    pub fn frame(&self) -> &FrameBuffer {
        self.surface.frame()
    }

    /// Smoothed and target pointer.
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// The grain tile generated at construction.
    pub fn grain(&self) -> &GrainTexture {
        &self.grain
    }

    /// Layout of the most recent step or frame.
    pub fn layout(&self) -> Option<&FrameLayout> {
        self.layout.as_ref()
    }

    /// Frames painted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RendererConfig {
        let mut config = RendererConfig::default();
        config.grain.seed = Some(11);
        config.glow.blur_radius = 6.0;
        config
    }

    fn luma(p: u32) -> u32 {
        ((p >> 16) & 0xFF) + ((p >> 8) & 0xFF) + (p & 0xFF)
    }

    #[test]
    fn step_does_not_paint() {
        let mut renderer = BackgroundRenderer::new(small_config(), Viewport::new(64.0, 36.0, 1.0));
        let merge = renderer.step(1.0).merge;
        assert!((0.0..=1.0).contains(&merge));
        assert_eq!(renderer.frames(), 0);
        assert!(renderer.frame().pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn glows_light_up_the_blob_centers() {
        let mut renderer = BackgroundRenderer::new(small_config(), Viewport::new(160.0, 90.0, 1.0));
        let frame = renderer.paint_frame(0.0).unwrap().clone();
        let layout = renderer.layout().unwrap();

        let c = layout.blobs[0].center;
        let center = frame.pixel(c.x as usize, c.y as usize);
        let corner = frame.pixel(159, 0);
        assert!(luma(center) > luma(corner));
        // Blue dominates the default palette.
        assert!((center & 0xFF) > (center >> 16) & 0xFF);
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn direct_mode_is_brighter_than_blurred_at_the_core() {
        let viewport = Viewport::new(160.0, 90.0, 1.0);
        let mut blurred = BackgroundRenderer::new(small_config(), viewport);
        let mut config = small_config();
        config.glow.mode = GlowMode::Direct;
        let mut direct = BackgroundRenderer::new(config, viewport);

        let c = blurred.step(0.0).blobs[0].center;
        let (x, y) = (c.x as usize, c.y as usize);
        let b = blurred.paint_frame(0.0).unwrap().pixel(x, y);
        let d = direct.paint_frame(0.0).unwrap().pixel(x, y);
        assert!(luma(d) > luma(b));
    }

    #[test]
    fn grain_survives_frames_and_resizes() {
        let mut renderer = BackgroundRenderer::new(small_config(), Viewport::new(64.0, 36.0, 1.0));
        let before: Vec<u8> = (0..20).map(|i| renderer.grain().texel(i * 7, i * 3)).collect();
        renderer.paint_frame(0.0).unwrap();
        renderer.resize(Viewport::new(80.0, 40.0, 2.0));
        renderer.paint_frame(0.5).unwrap();
        let after: Vec<u8> = (0..20).map(|i| renderer.grain().texel(i * 7, i * 3)).collect();
        assert_eq!(before, after);
        assert_eq!(renderer.frame().width, 160);
    }

    #[test]
    fn grain_scrolls_with_time_in_the_painted_frame() {
        let mut config = small_config();
        config.blobs.drift_amplitude = 0.0;
        config.grain.alpha = 35;
        config.grain.opacity = 0.2;
        config.glow.opacity = 1.0;
        let viewport = Viewport::new(160.0, 90.0, 1.0);
        let mut renderer = BackgroundRenderer::new(config, viewport);

        let first = renderer.paint_frame(0.0).unwrap().clone();
        let again = renderer.paint_frame(0.0).unwrap().clone();
        let later = renderer.paint_frame(1.0).unwrap().clone();

        // Same layout every time, so only the grain offset can change pixels.
        assert_eq!(first, again);
        let changed = first
            .pixels
            .iter()
            .zip(&later.pixels)
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 100, "only {changed} pixels moved");
    }

    #[test]
    fn pointer_moves_are_smoothed_into_the_layout() {
        let mut renderer = BackgroundRenderer::new(small_config(), Viewport::new(100.0, 100.0, 1.0));
        let rest = renderer.step(0.0).blobs[0].center;
        renderer.pointer_moved(Vec2::new(100.0, 100.0));
        let first = renderer.step(0.0).blobs[0].center;
        let second = renderer.step(0.0).blobs[0].center;
        assert!(first.x > rest.x);
        assert!(second.x > first.x);
        assert!(renderer.pointer().smoothed().x < 1.0);
    }
}
