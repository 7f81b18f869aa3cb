// The custom cursor: a thin ring that follows the raw pointer.
// Visual: a 28 px white circle over the background, gone when the pointer leaves.

use glam::Vec2;

use crate::composite::{blend, BlendMode};
use crate::types::{pack_unit, unpack_unit, FrameBuffer};

/// The custom pointer: a thin ring drawn over the finished frame.
pub struct CursorRing {
    /// Diameter in logical px.
    pub size: f32,
    /// Stroke width in logical px.
    pub stroke: f32,
    pub opacity: f32,
    position: Option<Vec2>,
}

impl Default for CursorRing {
    fn default() -> Self {
        Self {
            size: 28.0,
            stroke: 1.5,
            opacity: 0.85,
            position: None,
        }
    }
}

impl CursorRing {
    /// Follow the pointer exactly (no smoothing), in logical px.
    /// Visual: the ring jumps to the mouse on the next frame.
    pub fn moved(&mut self, client: Vec2) {
        self.position = Some(client);
    }

    /// Pointer left the viewport.
    /// Visual: the ring disappears until the mouse comes back.
    pub fn left(&mut self) {
        self.position = None;
    }

    /// Ring center in logical px, if shown.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }

    /// Draw the ring source-over onto `frame` (device px).
    /// Visual: a soft white circle outline around the mouse.
    pub fn draw(&self, frame: &mut FrameBuffer, dpr: f32) {
        let Some(client) = self.position else {
            return;
        };
        let center = client * dpr;
        let radius = self.size * 0.5 * dpr;
        let half = self.stroke * 0.5 * dpr;
        let reach = radius + half + 1.0;

        let x0 = (center.x - reach).floor().max(0.0) as usize;
        let y0 = (center.y - reach).floor().max(0.0) as usize;
        let x1 = ((center.x + reach).ceil().max(0.0) as usize).min(frame.width);
        let y1 = ((center.y + reach).ceil().max(0.0) as usize).min(frame.height);

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - center.y;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.x;
                let d = (dx * dx + dy * dy).sqrt();
                // Pixel coverage of the stroke band, anti-aliased over one px.
                let coverage = (half + 0.5 - (d - radius).abs()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let a = coverage * self.opacity;
                let px = &mut frame.pixels[y * frame.width + x];
                *px = pack_unit(blend(BlendMode::SourceOver, unpack_unit(*px), [a, a, a, a], 1.0));
            }
        }
    }
}
