use glam::Vec2;
use glowfield::blobs::merge_strength;
use glowfield::{PointerState, Viewport};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn smoothing_approaches_without_overshoot(
        damping in 0.04f32..0.1,
        tx in 0.0f32..1.0,
        ty in 0.0f32..1.0,
        steps in 1usize..40,
    ) {
        let target = Vec2::new(tx, ty);
        prop_assume!(target.distance(Vec2::splat(0.5)) >= 1e-2);

        let viewport = Viewport::new(1000.0, 1000.0, 1.0);
        let mut pointer = PointerState::new(damping);
        pointer.set_target(target * 1000.0, &viewport);

        let mut previous = pointer.smoothed().distance(pointer.target());
        for _ in 0..steps {
            let before = pointer.smoothed();
            let after = pointer.step();
            let distance = after.distance(pointer.target());
            prop_assert!(distance < previous);

            // Each axis moves toward the target and never past it.
            for axis in 0..2 {
                let (b, a, t) = (before[axis], after[axis], pointer.target()[axis]);
                prop_assert!((a - t).abs() <= (b - t).abs());
                prop_assert!((b - t) * (a - t) >= 0.0);
            }
            previous = distance;
        }
    }

    #[test]
    fn merge_strength_stays_in_unit_range(distance in 0.0f32..5000.0, threshold in 1.0f32..2000.0) {
        let m = merge_strength(distance, threshold);
        prop_assert!((0.0..=1.0).contains(&m));
        if distance >= threshold {
            prop_assert_eq!(m, 0.0);
        }
    }
}
