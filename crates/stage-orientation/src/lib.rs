pub mod absolute;
pub mod smoothing;
pub mod tilt;

pub use smoothing::Smoother;
pub use tilt::{Calibration, TiltAngles};

use glam::Quat;
use stage_config::{ConfigError, OrientationConfig, OrientationMode, TiltConfig};
use stage_sensors::{AngleSample, ScreenAngle};
use std::time::Duration;
use tracing::{debug, info};

/// Camera rotation captured at startup. Every relative tilt is measured from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutralPose(Quat);

impl NeutralPose {
    pub fn new(rotation: Quat) -> Self {
        Self(rotation.normalize())
    }

    pub fn rotation(&self) -> Quat {
        self.0
    }
}

enum CalibrationState {
    Waiting,
    Latched(Calibration),
}

/// Turns device-orientation samples into a camera rotation.
///
/// Sample handlers ([`apply_sample`], [`set_screen_angle`]) only touch the
/// target (and, in absolute mode, `current` directly); in relative mode
/// `current` is written exclusively by the per-frame [`step`].
///
/// With no samples at all the camera stays at the neutral pose.
///
/// [`apply_sample`]: OrientationEngine::apply_sample
/// [`set_screen_angle`]: OrientationEngine::set_screen_angle
/// [`step`]: OrientationEngine::step
pub struct OrientationEngine {
    mode: OrientationMode,
    tilt: TiltConfig,
    alpha_offset: f32,
    smoother: Smoother,
    neutral: NeutralPose,
    calibration: CalibrationState,
    screen: ScreenAngle,
    /// Last sample that produced a target, re-evaluated when the screen rotates.
    last_sample: Option<AngleSample>,
    last_tilt: Option<TiltAngles>,
    current: Quat,
    target: Quat,
    enabled: bool,
}

impl OrientationEngine {
    pub fn new(config: &OrientationConfig, neutral: NeutralPose) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(mode = ?config.mode, "Orientation engine created");
        Ok(Self {
            mode: config.mode,
            tilt: config.tilt.clone(),
            alpha_offset: config.alpha_offset_radians,
            smoother: Smoother::new(config.tilt.smoothing, config.smoothing_strategy),
            neutral,
            calibration: CalibrationState::Waiting,
            screen: ScreenAngle::default(),
            last_sample: None,
            last_tilt: None,
            current: neutral.rotation(),
            target: neutral.rotation(),
            enabled: true,
        })
    }

    pub fn mode(&self) -> OrientationMode {
        self.mode
    }

    /// Rotation the camera should display this frame.
    pub fn current(&self) -> Quat {
        self.current
    }

    /// Rotation implied by the latest sample.
    pub fn target(&self) -> Quat {
        self.target
    }

    pub fn neutral(&self) -> NeutralPose {
        self.neutral
    }

    pub fn calibration(&self) -> Option<Calibration> {
        match self.calibration {
            CalibrationState::Waiting => None,
            CalibrationState::Latched(calibration) => Some(calibration),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.calibration, CalibrationState::Latched(_))
    }

    /// Pitch/yaw derived from the most recent relative-mode sample.
    pub fn last_tilt(&self) -> Option<TiltAngles> {
        self.last_tilt
    }

    /// Manual yaw correction for absolute mode (radians).
    pub fn alpha_offset(&self) -> f32 {
        self.alpha_offset
    }

    pub fn set_alpha_offset(&mut self, radians: f32) {
        self.alpha_offset = radians;
        self.reapply_absolute();
    }

    pub fn screen_angle(&self) -> ScreenAngle {
        self.screen
    }

    pub fn set_screen_angle(&mut self, angle: ScreenAngle) {
        if !self.enabled || angle == self.screen {
            return;
        }
        self.screen = angle;
        match self.mode {
            OrientationMode::AbsoluteDeviceOrientation => self.reapply_absolute(),
            OrientationMode::RelativeTiltDelta => self.reapply_tilt(),
        }
    }

    /// Feed one device-orientation sample.
    pub fn apply_sample(&mut self, sample: &AngleSample) {
        if !self.enabled {
            return;
        }
        match self.mode {
            OrientationMode::AbsoluteDeviceOrientation => {
                self.last_sample = Some(*sample);
                self.reapply_absolute();
            }
            OrientationMode::RelativeTiltDelta => self.apply_tilt(sample),
        }
    }

    /// Per-frame update. Returns the rotation to display.
    pub fn step(&mut self, dt: Duration) -> Quat {
        if self.enabled && self.mode == OrientationMode::RelativeTiltDelta {
            self.current = self.smoother.advance(self.current, self.target, dt);
        }
        self.current
    }

    /// Forget the tilt baseline; the next usable sample latches a new one.
    pub fn reset_calibration(&mut self) {
        self.calibration = CalibrationState::Waiting;
        self.last_tilt = None;
        if self.mode == OrientationMode::RelativeTiltDelta {
            self.last_sample = None;
        }
        self.target = self.neutral.rotation();
        info!("Tilt calibration reset");
    }

    /// Resume processing samples and frames.
    pub fn connect(&mut self) {
        self.enabled = true;
    }

    /// Stop processing. `current` keeps its last value until reconnected.
    pub fn disconnect(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply_tilt(&mut self, sample: &AngleSample) {
        let calibration = match self.calibration {
            CalibrationState::Latched(calibration) => calibration,
            CalibrationState::Waiting => {
                if let Some(calibration) = Calibration::from_sample(sample) {
                    self.calibration = CalibrationState::Latched(calibration);
                    info!(
                        beta0 = calibration.beta0,
                        gamma0 = calibration.gamma0,
                        "Tilt calibration latched"
                    );
                }
                return;
            }
        };

        let angles = TiltAngles::from_sample(&self.tilt, &calibration, sample, self.screen);
        debug!(
            pitch = angles.pitch_degrees,
            yaw = angles.yaw_degrees,
            "Tilt target updated"
        );
        self.target = angles.rotation(self.neutral.rotation());
        self.last_tilt = Some(angles);
        self.last_sample = Some(*sample);
    }

    fn reapply_tilt(&mut self) {
        if !self.tilt.screen_compensation {
            return;
        }
        if let Some(sample) = self.last_sample {
            self.apply_tilt(&sample);
        }
    }

    fn reapply_absolute(&mut self) {
        if self.mode != OrientationMode::AbsoluteDeviceOrientation {
            return;
        }
        if let Some(sample) = &self.last_sample {
            self.target = absolute::device_rotation(sample, self.screen, self.alpha_offset);
            self.current = self.target;
        }
    }
}
