// Separable box blur over the glow layer; three passes approximate a Gaussian.
// Visual: hard gradient rims melt into diffuse light.

use crate::error::Error;
use crate::types::Layer;

/// Box radii whose repeated application approximates a Gaussian of `sigma`.
pub fn box_radii_for_gaussian(sigma: f32, passes: usize) -> Vec<usize> {
    if sigma <= 0.0 || passes == 0 {
        return Vec::new();
    }
    let n = passes as f32;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let l = lower as f32;
    let m = ((12.0 * sigma * sigma - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0)).round();
    let m = (m.max(0.0) as usize).min(passes);

    (0..passes)
        .map(|i| if i < m { lower } else { upper })
        .map(|width| ((width - 1) / 2) as usize)
        .collect()
}

/// Gaussian-like blur of `layer` in place; `scratch` must match its size.
/// Visual: hard gradient rims melt into a smooth haze.
pub fn gaussian_blur(layer: &mut Layer, scratch: &mut Layer, sigma: f32) -> Result<(), Error> {
    for radius in box_radii_for_gaussian(sigma, 3) {
        box_blur(layer, scratch, radius)?;
    }
    Ok(())
}

/// One horizontal + vertical box pass of `radius`, result back in `layer`.
/// Edges are extended (clamped) so light does not drain out of the borders.
pub fn box_blur(layer: &mut Layer, scratch: &mut Layer, radius: usize) -> Result<(), Error> {
    layer.ensure_same_size(scratch, "box_blur scratch")?;
    if radius == 0 {
        return Ok(());
    }
    let w = layer.width;
    let h = layer.height;

    /* ---- Pass 1: horizontal, layer → scratch ---- */
    for y in 0..h {
        let row = y * w;
        blur_line(&layer.pixels, &mut scratch.pixels, radius, w, |i| row + i);
    }

    /* ---- Pass 2: vertical, scratch → layer ---- */
    for x in 0..w {
        blur_line(&scratch.pixels, &mut layer.pixels, radius, h, |i| i * w + x);
    }

    Ok(())
}

/// Sliding-window average along one row or column; `index` maps the position
/// along the line to a buffer index.
#[inline]
fn blur_line(
    src: &[[f32; 4]],
    dst: &mut [[f32; 4]],
    radius: usize,
    len: usize,
    index: impl Fn(usize) -> usize,
) {
    let last = len - 1;
    let r = radius as isize;
    let inv = 1.0 / (2 * radius + 1) as f32;
    let at = |i: isize| src[index(i.clamp(0, last as isize) as usize)];

    // Prime the window [-r, r] around position 0.
    let mut sum = [0.0f32; 4];
    for i in -r..=r {
        let p = at(i);
        for c in 0..4 {
            sum[c] += p[c];
        }
    }

    for i in 0..len as isize {
        let out = &mut dst[index(i as usize)];
        for c in 0..4 {
            out[c] = sum[c] * inv;
        }
        // Slide: add the new right sample, drop the old left one.
        let add = at(i + r + 1);
        let sub = at(i - r);
        for c in 0..4 {
            sum[c] += add[c] - sub[c];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(layer: &Layer) -> f32 {
        layer.pixels.iter().map(|p| p[3]).sum()
    }

    #[test]
    fn radii_grow_with_sigma() {
        assert!(box_radii_for_gaussian(0.0, 3).is_empty());
        let small = box_radii_for_gaussian(2.0, 3);
        let large = box_radii_for_gaussian(30.0, 3);
        assert_eq!(small.len(), 3);
        assert!(large.iter().sum::<usize>() > small.iter().sum::<usize>());
        // Three boxes of width 2r+1 have variance sum((w^2 - 1) / 12) ≈ sigma^2.
        let variance: f32 = large
            .iter()
            .map(|r| {
                let w = (2 * r + 1) as f32;
                (w * w - 1.0) / 12.0
            })
            .sum();
        assert!((variance.sqrt() - 30.0).abs() < 1.5);
    }

    #[test]
    fn uniform_layer_stays_uniform() {
        let mut layer = Layer::new(20, 10);
        layer.pixels.fill([0.25, 0.5, 0.75, 1.0]);
        let mut scratch = Layer::new(20, 10);
        gaussian_blur(&mut layer, &mut scratch, 4.0).unwrap();
        for p in &layer.pixels {
            assert!((p[1] - 0.5).abs() < 1e-5);
            assert!((p[3] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn blur_spreads_a_point_and_keeps_interior_energy() {
        let mut layer = Layer::new(41, 41);
        layer.pixels[20 * 41 + 20] = [1.0; 4];
        let mut scratch = Layer::new(41, 41);
        box_blur(&mut layer, &mut scratch, 2).unwrap();

        let center = layer.pixels[20 * 41 + 20][3];
        assert!((center - 1.0 / 25.0).abs() < 1e-6);
        assert!(layer.pixels[22 * 41 + 22][3] > 0.0);
        assert_eq!(layer.pixels[23 * 41 + 20][3], 0.0);
        assert!((total(&layer) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn mismatched_scratch_is_an_error() {
        let mut layer = Layer::new(8, 8);
        let mut scratch = Layer::new(4, 8);
        let err = box_blur(&mut layer, &mut scratch, 1).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }
}
