use glam::{Quat, Vec3};
use stage_sensors::{AngleSample, ScreenAngle};
use std::f32::consts::FRAC_1_SQRT_2;

/// -90° about X: the camera looks out of the device's back, not its top edge.
pub const BACK_FACING: Quat = Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);

/// Absolute camera rotation for one device-orientation sample.
///
/// The device reports intrinsic Z-X'-Y'' angles (alpha, beta, gamma). In a
/// Y-up camera frame that is `Ry(alpha) · Rx(beta) · Rz(-gamma)`; the order
/// matters. The back-facing correction and the screen rotation (about the
/// device's local Z) are then applied on the right.
///
/// Missing angles contribute zero. `alpha_offset` (radians) only shifts a
/// present alpha.
pub fn device_rotation(sample: &AngleSample, screen: ScreenAngle, alpha_offset: f32) -> Quat {
    let alpha = sample
        .alpha
        .map_or(0.0, |alpha| alpha.to_radians() + alpha_offset);
    let beta = sample.beta.map_or(0.0, f32::to_radians);
    let gamma = sample.gamma.map_or(0.0, f32::to_radians);

    let device =
        Quat::from_rotation_y(alpha) * Quat::from_rotation_x(beta) * Quat::from_rotation_z(-gamma);
    let screen = Quat::from_axis_angle(Vec3::Z, -screen.radians());

    (device * BACK_FACING * screen).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn assert_vec_eq(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, EPS),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn level_device_looks_down() {
        let q = device_rotation(&AngleSample::new(0.0, 0.0, 0.0), ScreenAngle::Deg0, 0.0);

        assert!(q.abs_diff_eq(BACK_FACING, EPS));
        assert_vec_eq(q * Vec3::NEG_Z, Vec3::NEG_Y);
        assert_vec_eq(q * Vec3::Y, Vec3::NEG_Z);
    }

    #[test]
    fn repeated_input_gives_same_rotation() {
        let sample = AngleSample::new(12.0, 34.0, -56.0);
        let first = device_rotation(&sample, ScreenAngle::Deg90, 0.1);
        for _ in 0..3 {
            assert_eq!(device_rotation(&sample, ScreenAngle::Deg90, 0.1), first);
        }
    }

    #[test]
    fn alpha_quarter_turn_yaws_about_vertical() {
        let q = device_rotation(&AngleSample::new(90.0, 0.0, 0.0), ScreenAngle::Deg0, 0.0);

        // Still looking straight down, but the top edge now points to -X.
        assert_vec_eq(q * Vec3::NEG_Z, Vec3::NEG_Y);
        assert_vec_eq(q * Vec3::Y, Vec3::NEG_X);
    }

    #[test]
    fn upright_device_looks_ahead_and_yaw_applies_after_pitch() {
        let upright = device_rotation(&AngleSample::new(0.0, 90.0, 0.0), ScreenAngle::Deg0, 0.0);
        assert_vec_eq(upright * Vec3::NEG_Z, Vec3::NEG_Z);
        assert_vec_eq(upright * Vec3::Y, Vec3::Y);

        let turned = device_rotation(&AngleSample::new(90.0, 90.0, 0.0), ScreenAngle::Deg0, 0.0);
        assert_vec_eq(turned * Vec3::NEG_Z, Vec3::NEG_X);
    }

    #[test]
    fn alpha_offset_matches_extra_alpha() {
        let offset = device_rotation(
            &AngleSample::new(30.0, 20.0, 10.0),
            ScreenAngle::Deg0,
            15.0_f32.to_radians(),
        );
        let direct = device_rotation(&AngleSample::new(45.0, 20.0, 10.0), ScreenAngle::Deg0, 0.0);
        assert!(offset.abs_diff_eq(direct, EPS));
    }

    #[test]
    fn missing_angles_count_as_zero() {
        let partial = AngleSample {
            alpha: None,
            beta: Some(90.0),
            gamma: None,
            absolute: Some(true),
        };
        // The offset only shifts an alpha that was actually reported.
        let q = device_rotation(&partial, ScreenAngle::Deg0, 1.0);
        let zeroed = device_rotation(&AngleSample::new(0.0, 90.0, 0.0), ScreenAngle::Deg0, 0.0);
        assert!(q.abs_diff_eq(zeroed, EPS));
    }

    #[test]
    fn landscape_screen_rolls_about_view_axis() {
        let q = device_rotation(&AngleSample::new(0.0, 0.0, 0.0), ScreenAngle::Deg90, 0.0);

        assert_vec_eq(q * Vec3::NEG_Z, Vec3::NEG_Y);
        assert_vec_eq(q * Vec3::Y, Vec3::X);
    }

    proptest! {
        #[test]
        fn rotation_is_unit(
            alpha in 0.0f32..360.0,
            beta in -180.0f32..180.0,
            gamma in -90.0f32..90.0,
            screen in prop_oneof![
                Just(ScreenAngle::Deg0),
                Just(ScreenAngle::Deg90),
                Just(ScreenAngle::Deg180),
                Just(ScreenAngle::Deg270),
            ],
            offset in -3.2f32..3.2,
        ) {
            let q = device_rotation(&AngleSample::new(alpha, beta, gamma), screen, offset);
            prop_assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }
}
