// Radial-gradient glows, screened into the accumulation layer.
// Visual: each glow is a soft disc of light; overlaps get brighter, never darker.

use glam::Vec2;

use crate::types::{Layer, Rgb};

/// (position along the radius, alpha multiplier) — full color at the center,
/// fading to nothing at the rim.
pub const GLOW_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.35, 0.35), (0.7, 0.12), (1.0, 0.0)];

/// Piecewise-linear alpha multiplier at normalized distance `d` from the center.
pub fn stop_alpha(d: f32) -> f32 {
    if d <= GLOW_STOPS[0].0 {
        return GLOW_STOPS[0].1;
    }
    for pair in GLOW_STOPS.windows(2) {
        let (p0, a0) = pair[0];
        let (p1, a1) = pair[1];
        if d <= p1 {
            let t = (d - p0) / (p1 - p0);
            return a0 + (a1 - a0) * t;
        }
    }
    GLOW_STOPS[GLOW_STOPS.len() - 1].1
}

/// Screen one premultiplied source pixel into the layer: `dst + src * (1 - dst)`.
/// Visual: light only ever adds; a saturated pixel stays exactly white.
#[inline]
pub fn screen_into(dst: &mut [f32; 4], src: [f32; 4]) {
    for c in 0..4 {
        dst[c] += src[c] * (1.0 - dst[c]);
    }
}

/// Paint a radial glow centered at `center` (layer px) with the given radius.
/// Visual: a soft disc of `color`, brightest in the middle, gone at the rim.
/// Only the bounding box is visited; beyond the radius the gradient is
/// transparent and screening with zero leaves the layer unchanged.
pub fn paint_glow(layer: &mut Layer, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
    if radius <= 0.0 || alpha <= 0.0 || layer.width == 0 || layer.height == 0 {
        return;
    }
    let [r, g, b] = color.unit();
    let inv_radius = 1.0 / radius;

    let x0 = ((center.x - radius).floor().max(0.0)) as usize;
    let y0 = ((center.y - radius).floor().max(0.0)) as usize;
    let x1 = ((center.x + radius).ceil().max(0.0) as usize).min(layer.width);
    let y1 = ((center.y + radius).ceil().max(0.0) as usize).min(layer.height);

    for y in y0..y1 {
        let row = y * layer.width;
        let dy = y as f32 + 0.5 - center.y;
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - center.x;
            let d = (dx * dx + dy * dy).sqrt() * inv_radius;
            if d >= 1.0 {
                continue;
            }
            let a = alpha * stop_alpha(d);
            screen_into(&mut layer.pixels[row + x], [r * a, g * a, b * a, a]);
        }
    }
}
