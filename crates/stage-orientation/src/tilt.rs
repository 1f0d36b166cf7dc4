use glam::Quat;
use stage_config::TiltConfig;
use stage_sensors::{AngleSample, ScreenAngle};

/// Tilt baseline latched from the first usable sample of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub beta0: f32,
    pub gamma0: f32,
}

impl Calibration {
    /// Baseline from `sample`, if it carries both tilt angles.
    pub fn from_sample(sample: &AngleSample) -> Option<Self> {
        Some(Self {
            beta0: sample.beta?,
            gamma0: sample.gamma?,
        })
    }
}

/// Bounded camera deflection from the neutral pose, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltAngles {
    pub pitch_degrees: f32,
    pub yaw_degrees: f32,
}

impl TiltAngles {
    /// Map a sample to pitch/yaw relative to `calibration`.
    ///
    /// Order: dead-zone on the raw deltas, screen-rotation swap, scaling,
    /// axis inversion, then clamping to the configured maxima.
    pub fn from_sample(
        config: &TiltConfig,
        calibration: &Calibration,
        sample: &AngleSample,
        screen: ScreenAngle,
    ) -> Self {
        let d_beta = dead_zone(
            sample.beta.unwrap_or(0.0) - calibration.beta0,
            config.dead_zone_degrees,
        );
        let d_gamma = dead_zone(
            sample.gamma.unwrap_or(0.0) - calibration.gamma0,
            config.dead_zone_degrees,
        );

        let (pitch_in, yaw_in) = if config.screen_compensation {
            swap_for_screen(d_beta, d_gamma, screen)
        } else {
            (d_beta, d_gamma)
        };

        Self {
            pitch_degrees: map_axis(
                pitch_in,
                config.pitch_range_degrees,
                config.max_pitch_degrees,
                config.invert_pitch,
            ),
            yaw_degrees: map_axis(
                yaw_in,
                config.yaw_range_degrees,
                config.max_yaw_degrees,
                config.invert_yaw,
            ),
        }
    }

    /// `neutral · Ry(yaw) · Rx(pitch)`. Always relative to the neutral pose,
    /// never to the previous frame, so no drift accumulates.
    pub fn rotation(&self, neutral: Quat) -> Quat {
        neutral
            * Quat::from_rotation_y(self.yaw_degrees.to_radians())
            * Quat::from_rotation_x(self.pitch_degrees.to_radians())
    }
}

fn dead_zone(delta: f32, threshold: f32) -> f32 {
    if delta.abs() < threshold {
        0.0
    } else {
        delta
    }
}

/// Re-express (beta, gamma) deltas as (pitch, yaw) inputs for a rotated display.
fn swap_for_screen(d_beta: f32, d_gamma: f32, screen: ScreenAngle) -> (f32, f32) {
    match screen {
        ScreenAngle::Deg0 => (d_beta, d_gamma),
        ScreenAngle::Deg90 => (d_gamma, -d_beta),
        ScreenAngle::Deg180 => (-d_beta, -d_gamma),
        ScreenAngle::Deg270 => (-d_gamma, d_beta),
    }
}

fn map_axis(delta: f32, range: f32, max: f32, invert: bool) -> f32 {
    let scaled = delta / range * max;
    let signed = if invert { -scaled } else { scaled };
    if signed.is_nan() {
        return 0.0;
    }
    signed.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn plain_config() -> TiltConfig {
        TiltConfig {
            invert_pitch: false,
            invert_yaw: false,
            ..TiltConfig::default()
        }
    }

    const ORIGIN: Calibration = Calibration {
        beta0: 0.0,
        gamma0: 0.0,
    };

    #[test]
    fn calibration_needs_both_tilt_angles() {
        assert_eq!(
            Calibration::from_sample(&AngleSample::tilt(10.0, 5.0)),
            Some(Calibration {
                beta0: 10.0,
                gamma0: 5.0
            })
        );
        let beta_only = AngleSample {
            beta: Some(10.0),
            ..AngleSample::default()
        };
        assert_eq!(Calibration::from_sample(&beta_only), None);
    }

    #[test]
    fn deltas_scale_linearly_inside_range() {
        let calibration = Calibration {
            beta0: 10.0,
            gamma0: 5.0,
        };
        let angles = TiltAngles::from_sample(
            &plain_config(),
            &calibration,
            &AngleSample::tilt(20.0, 0.0),
            ScreenAngle::Deg0,
        );
        // 10° of 20° range -> half of 8°, -5° of 20° -> -2°.
        assert!((angles.pitch_degrees - 4.0).abs() < 1e-5);
        assert!((angles.yaw_degrees + 2.0).abs() < 1e-5);
    }

    #[test]
    fn inversion_flips_sign() {
        let angles = TiltAngles::from_sample(
            &TiltConfig::default(),
            &ORIGIN,
            &AngleSample::tilt(10.0, -10.0),
            ScreenAngle::Deg0,
        );
        assert!((angles.pitch_degrees + 4.0).abs() < 1e-5);
        assert!((angles.yaw_degrees - 4.0).abs() < 1e-5);
    }

    #[test]
    fn dead_zone_snaps_small_deltas_to_zero() {
        let config = TiltConfig {
            dead_zone_degrees: 2.0,
            ..plain_config()
        };
        let angles = TiltAngles::from_sample(
            &config,
            &ORIGIN,
            &AngleSample::tilt(1.9, -2.5),
            ScreenAngle::Deg0,
        );
        assert_eq!(angles.pitch_degrees, 0.0);
        assert!((angles.yaw_degrees + 1.0).abs() < 1e-5);
    }

    #[test]
    fn screen_compensation_swaps_axes() {
        let config = TiltConfig {
            screen_compensation: true,
            ..plain_config()
        };
        let sample = AngleSample::tilt(10.0, 5.0);
        let at = |screen| TiltAngles::from_sample(&config, &ORIGIN, &sample, screen);

        let portrait = at(ScreenAngle::Deg0);
        assert!((portrait.pitch_degrees - 4.0).abs() < 1e-5);
        assert!((portrait.yaw_degrees - 2.0).abs() < 1e-5);

        let landscape = at(ScreenAngle::Deg90);
        assert!((landscape.pitch_degrees - 2.0).abs() < 1e-5);
        assert!((landscape.yaw_degrees + 4.0).abs() < 1e-5);

        let upside_down = at(ScreenAngle::Deg180);
        assert!((upside_down.pitch_degrees + 4.0).abs() < 1e-5);
        assert!((upside_down.yaw_degrees + 2.0).abs() < 1e-5);

        let landscape_flipped = at(ScreenAngle::Deg270);
        assert!((landscape_flipped.pitch_degrees + 2.0).abs() < 1e-5);
        assert!((landscape_flipped.yaw_degrees - 4.0).abs() < 1e-5);
    }

    #[test]
    fn screen_angle_is_ignored_without_compensation() {
        let sample = AngleSample::tilt(10.0, 5.0);
        let a = TiltAngles::from_sample(&plain_config(), &ORIGIN, &sample, ScreenAngle::Deg0);
        let b = TiltAngles::from_sample(&plain_config(), &ORIGIN, &sample, ScreenAngle::Deg270);
        assert_eq!(a, b);
    }

    #[test]
    fn yaw_is_applied_before_pitch() {
        let angles = TiltAngles {
            pitch_degrees: 90.0,
            yaw_degrees: 90.0,
        };
        let q = angles.rotation(Quat::IDENTITY);
        // Pitch tips the view up to +Y; the preceding yaw only spins about it.
        assert!((q * Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-5));
        assert!((q * Vec3::X).abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn rotation_is_relative_to_neutral() {
        let neutral = Quat::from_rotation_y(std::f32::consts::PI);
        let q = TiltAngles::default().rotation(neutral);
        assert!(q.abs_diff_eq(neutral, 1e-6));
    }

    proptest! {
        #[test]
        fn output_stays_within_limits(
            beta in -1.0e6f32..1.0e6,
            gamma in -1.0e6f32..1.0e6,
            beta0 in -180.0f32..180.0,
            gamma0 in -90.0f32..90.0,
            max_pitch in 0.0f32..45.0,
            max_yaw in 0.0f32..45.0,
            pitch_range in 0.1f32..90.0,
            yaw_range in 0.1f32..90.0,
            invert_pitch in any::<bool>(),
            invert_yaw in any::<bool>(),
            compensate in any::<bool>(),
        ) {
            let config = TiltConfig {
                max_pitch_degrees: max_pitch,
                max_yaw_degrees: max_yaw,
                pitch_range_degrees: pitch_range,
                yaw_range_degrees: yaw_range,
                invert_pitch,
                invert_yaw,
                screen_compensation: compensate,
                ..TiltConfig::default()
            };
            let calibration = Calibration { beta0, gamma0 };
            let angles = TiltAngles::from_sample(
                &config,
                &calibration,
                &AngleSample::tilt(beta, gamma),
                ScreenAngle::Deg90,
            );
            prop_assert!(angles.pitch_degrees.abs() <= max_pitch);
            prop_assert!(angles.yaw_degrees.abs() <= max_yaw);
        }
    }
}
