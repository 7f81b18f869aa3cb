// Smoothed pointer in normalized viewport coordinates.
// Visual: the blobs lean toward the mouse, lagging behind it a little.

use glam::Vec2;

use crate::viewport::Viewport;

/// Target and smoothed pointer, both normalized to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    smoothed: Vec2,
    target: Vec2,
    damping: f32,
}

impl PointerState {
    /// Both positions start at the viewport center.
    pub fn new(damping: f32) -> Self {
        Self {
            smoothed: Vec2::splat(0.5),
            target: Vec2::splat(0.5),
            damping: damping.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Client position (logical px) divided by the viewport size. Not clamped:
    /// a pointer just past an edge after a resize reads slightly outside [0, 1].
    pub fn set_target(&mut self, client: Vec2, viewport: &Viewport) {
        let size = viewport.logical_size();
        if size.x > 0.0 {
            self.target.x = client.x / size.x;
        }
        if size.y > 0.0 {
            self.target.y = client.y / size.y;
        }
    }

    /// One frame of exponential smoothing toward the target.
    /// Visual: the glows glide after the mouse instead of snapping to it.
    pub fn step(&mut self) -> Vec2 {
        self.smoothed += (self.target - self.smoothed) * self.damping;
        self.smoothed
    }

    /// Displacement of the smoothed pointer from the viewport center.
    pub fn offset(&self) -> Vec2 {
        self.smoothed - Vec2::splat(0.5)
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_a_fixed_fraction_of_the_remaining_distance() {
        let viewport = Viewport::new(1000.0, 500.0, 1.0);
        let mut pointer = PointerState::new(0.1);
        pointer.set_target(Vec2::new(1000.0, 0.0), &viewport);
        assert_eq!(pointer.target(), Vec2::new(1.0, 0.0));

        let s = pointer.step();
        assert!((s.x - 0.55).abs() < 1e-6);
        assert!((s.y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn pointer_outside_the_viewport_is_not_clamped() {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        let mut pointer = PointerState::new(0.09);
        pointer.set_target(Vec2::new(820.0, -6.0), &viewport);
        assert!(pointer.target().x > 1.0);
        assert!(pointer.target().y < 0.0);
    }

    #[test]
    fn centered_pointer_has_zero_offset() {
        let viewport = Viewport::new(1920.0, 1080.0, 1.0);
        let mut pointer = PointerState::new(0.09);
        pointer.set_target(Vec2::new(960.0, 540.0), &viewport);
        pointer.step();
        assert_eq!(pointer.offset(), Vec2::ZERO);
    }

    #[test]
    fn approaches_without_reaching_a_moving_target() {
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let mut pointer = PointerState::new(0.045);
        let mut previous = pointer.smoothed().x;
        for i in 0..200 {
            pointer.set_target(Vec2::new(60.0 + i as f32 * 0.1, 50.0), &viewport);
            let s = pointer.step();
            assert!(s.x > previous);
            assert!(s.x < pointer.target().x);
            previous = s.x;
        }
    }
}
