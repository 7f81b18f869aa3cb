// Film grain: one small noise tile, generated once and scrolled forever.
// Visual: faint flickerless speckle over the whole background.

use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Square tile of random gray levels, generated once and tiled forever.
pub struct GrainTexture {
    size: usize,     // tile edge in texels
    alpha: u8,       // same for every texel
    luma: Vec<u8>,   // size * size grayscale values
}

impl GrainTexture {
    /// Fill a `size`×`size` tile from `rng`.
    pub fn generate<R: Rng>(size: usize, alpha: u8, rng: &mut R) -> Self {
        let size = size.max(1);
        let luma = (0..size * size).map(|_| rng.gen_range(0..=255u8)).collect();
        Self { size, alpha, luma }
    }

    /// Reproducible tile when `seed` is given, fresh entropy otherwise.
    pub fn from_seed(size: usize, alpha: u8, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!("generating {size}x{size} grain tile (seed {seed:?})");
        Self::generate(size, alpha, &mut rng)
    }

    /// Tile edge in logical px.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Per-texel opacity out of 255.
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u8 {
        self.luma[(y % self.size) * self.size + (x % self.size)]
    }

    /// Scroll offset at time `t`, wrapped into one tile.
    /// Visual: the grain crawls slowly diagonally, so it never looks frozen.
    pub fn offset(&self, t: f32, speed: Vec2) -> Vec2 {
        let size = self.size as f32;
        Vec2::new((t * speed.x).rem_euclid(size), (t * speed.y).rem_euclid(size))
    }

    /// The texel under logical position `p` when the tiling is shifted by `offset`.
    #[inline]
    pub fn sample(&self, p: Vec2, offset: Vec2) -> u8 {
        let size = self.size as i64;
        let x = ((p.x + offset.x).floor() as i64).rem_euclid(size) as usize;
        let y = ((p.y + offset.y).floor() as i64).rem_euclid(size) as usize;
        self.luma[y * self.size + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_noise() {
        let a = GrainTexture::from_seed(32, 22, Some(42));
        let b = GrainTexture::from_seed(32, 22, Some(42));
        let c = GrainTexture::from_seed(32, 22, Some(43));
        assert_eq!(a.luma, b.luma);
        assert_ne!(a.luma, c.luma);
        assert_eq!(a.luma.len(), 32 * 32);
        assert_eq!(a.alpha(), 22);
    }

    #[test]
    fn noise_is_not_flat() {
        let tile = GrainTexture::from_seed(220, 22, Some(1));
        let min = tile.luma.iter().min().copied().unwrap();
        let max = tile.luma.iter().max().copied().unwrap();
        assert!(max - min > 200);
    }

    #[test]
    fn offset_wraps_inside_the_tile() {
        let tile = GrainTexture::from_seed(220, 22, Some(1));
        let speed = Vec2::new(10.0, 8.0);
        assert_eq!(tile.offset(0.0, speed), Vec2::ZERO);
        let o = tile.offset(25.0, speed);
        assert!((o.x - 30.0).abs() < 1e-3);
        assert!((o.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn sampling_tiles_in_both_directions() {
        let tile = GrainTexture::from_seed(16, 22, Some(9));
        let at = |x: f32, y: f32| tile.sample(Vec2::new(x, y), Vec2::ZERO);
        assert_eq!(at(3.0, 5.0), tile.texel(3, 5));
        assert_eq!(at(19.0, 21.0), tile.texel(3, 5));
        assert_eq!(at(-13.0, -11.0), tile.texel(3, 5));
        assert_eq!(tile.sample(Vec2::new(0.0, 0.0), Vec2::new(3.0, 5.0)), tile.texel(3, 5));
    }
}
