// Blending the glow layer and the grain tile onto the opaque frame.

use glam::Vec2;

use crate::error::Error;
use crate::grain::GrainTexture;
use crate::types::{pack_unit, unpack_unit, FrameBuffer, Layer};

/// How a source pixel lands on the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    SourceOver,
    Screen,
    Overlay,
}

/// Blend a premultiplied source over an opaque destination at `opacity`.
#[inline]
pub fn blend(mode: BlendMode, dst: [f32; 3], src: [f32; 4], opacity: f32) -> [f32; 3] {
    let sa = src[3] * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let mut out = [0.0f32; 3];
    match mode {
        BlendMode::SourceOver => {
            for c in 0..3 {
                out[c] = src[c] * opacity + dst[c] * (1.0 - sa);
            }
        }
        BlendMode::Screen => {
            for c in 0..3 {
                out[c] = dst[c] + src[c] * opacity * (1.0 - dst[c]);
            }
        }
        BlendMode::Overlay => {
            for c in 0..3 {
                let cs = (src[c] / src[3]).clamp(0.0, 1.0);
                let cb = dst[c];
                let mixed = if cb <= 0.5 {
                    2.0 * cb * cs
                } else {
                    1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
                };
                out[c] = (1.0 - sa) * cb + sa * mixed;
            }
        }
    }
    out
}

/// Draw `layer` over the whole frame, resampling when it is smaller.
/// Visual: the glows appear over the black base at `opacity`.
pub fn composite_layer(
    frame: &mut FrameBuffer,
    layer: &Layer,
    mode: BlendMode,
    opacity: f32,
) -> Result<(), Error> {
    if layer.width == 0 || layer.height == 0 {
        return Err(Error::size_mismatch(
            "composite layer",
            (frame.width, frame.height),
            layer.dimensions(),
        ));
    }
    let same_size = layer.width == frame.width && layer.height == frame.height;
    let sx = layer.width as f32 / frame.width as f32;
    let sy = layer.height as f32 / frame.height as f32;

    for y in 0..frame.height {
        let row = y * frame.width;
        let ly = (y as f32 + 0.5) * sy;
        for x in 0..frame.width {
            let src = if same_size {
                layer.pixels[row + x]
            } else {
                layer.sample_bilinear((x as f32 + 0.5) * sx, ly)
            };
            if src[3] <= 0.0 {
                continue;
            }
            let px = &mut frame.pixels[row + x];
            *px = pack_unit(blend(mode, unpack_unit(*px), src, opacity));
        }
    }
    Ok(())
}

/// Overlay the grain tile across the frame, scrolled by `offset` (logical px).
/// Device pixels map back to logical space through `dpr`, so the tile keeps its
/// logical size on dense displays.
/// Visual: a faint film texture that lifts darks and dims highlights.
pub fn overlay_grain(
    frame: &mut FrameBuffer,
    grain: &GrainTexture,
    offset: Vec2,
    dpr: f32,
    opacity: f32,
) {
    let alpha = grain.alpha() as f32 / 255.0;
    if alpha * opacity <= 0.0 {
        return;
    }
    let inv_dpr = 1.0 / dpr;
    for y in 0..frame.height {
        let row = y * frame.width;
        let ly = (y as f32 + 0.5) * inv_dpr;
        for x in 0..frame.width {
            let lx = (x as f32 + 0.5) * inv_dpr;
            let v = grain.sample(Vec2::new(lx, ly), offset) as f32 / 255.0;
            let src = [v * alpha, v * alpha, v * alpha, alpha];
            let px = &mut frame.pixels[row + x];
            *px = pack_unit(blend(BlendMode::Overlay, unpack_unit(*px), src, opacity));
        }
    }
}
