use glam::Quat;
use stage_config::SmoothingStrategy;
use std::time::Duration;

/// Per-frame slerp of `current` toward `target`.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    pub factor: f32,
    pub strategy: SmoothingStrategy,
}

impl Smoother {
    pub fn new(factor: f32, strategy: SmoothingStrategy) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            strategy,
        }
    }

    /// Interpolation fraction for a frame lasting `dt`.
    ///
    /// `PerFrame` ignores `dt`, so convergence speed follows the frame rate.
    pub fn fraction(&self, dt: Duration) -> f32 {
        match self.strategy {
            SmoothingStrategy::PerFrame => self.factor,
            SmoothingStrategy::TimeScaled {
                reference_frame_seconds,
            } => {
                if self.factor >= 1.0 {
                    return 1.0;
                }
                let frames = dt.as_secs_f32() / reference_frame_seconds;
                1.0 - (1.0 - self.factor).powf(frames)
            }
        }
    }

    /// Advance `current` one frame toward `target`.
    pub fn advance(&self, current: Quat, target: Quat, dt: Duration) -> Quat {
        let t = self.fraction(dt);
        if t <= 0.0 || current == target {
            current
        } else if t >= 1.0 {
            target
        } else {
            current.slerp(target, t).normalize()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn target() -> Quat {
        Quat::from_rotation_y(0.6) * Quat::from_rotation_x(-0.3)
    }

    #[test]
    fn each_step_moves_closer() {
        let smoother = Smoother::new(0.12, SmoothingStrategy::PerFrame);
        let target = target();
        let mut current = Quat::IDENTITY;
        let mut distance = current.angle_between(target);

        for _ in 0..20 {
            current = smoother.advance(current, target, FRAME);
            let next = current.angle_between(target);
            assert!(next < distance, "{next} !< {distance}");
            distance = next;
        }
    }

    #[test]
    fn factor_one_snaps_and_zero_freezes() {
        let target = target();
        let snap = Smoother::new(1.0, SmoothingStrategy::PerFrame);
        assert_eq!(snap.advance(Quat::IDENTITY, target, FRAME), target);

        let frozen = Smoother::new(0.0, SmoothingStrategy::PerFrame);
        assert_eq!(frozen.advance(Quat::IDENTITY, target, FRAME), Quat::IDENTITY);
    }

    #[test]
    fn per_frame_ignores_elapsed_time() {
        let smoother = Smoother::new(0.12, SmoothingStrategy::PerFrame);
        assert_eq!(smoother.fraction(FRAME), 0.12);
        assert_eq!(smoother.fraction(Duration::from_millis(100)), 0.12);
    }

    #[test]
    fn time_scaled_matches_factor_at_reference_frame() {
        let smoother = Smoother::new(
            0.12,
            SmoothingStrategy::TimeScaled {
                reference_frame_seconds: 0.016,
            },
        );
        assert!((smoother.fraction(FRAME) - 0.12).abs() < 1e-5);
        assert_eq!(smoother.fraction(Duration::ZERO), 0.0);

        // Two reference frames at once equal two separate steps.
        let double = smoother.fraction(FRAME * 2);
        assert!((double - (1.0 - 0.88 * 0.88)).abs() < 1e-5);
    }
}
