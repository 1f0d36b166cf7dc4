use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("Screen angle {0} is not a multiple of 90 degrees")]
    InvalidScreenAngle(i32),
}

/// One raw device-orientation event.
///
/// Angles are intrinsic Tait-Bryan angles in degrees (Z-X'-Y''). Every
/// field may be missing independently; consumers treat a missing angle as
/// zero but must not calibrate against it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleSample {
    /// Rotation about the device Z axis.
    pub alpha: Option<f32>,
    /// Rotation about the device X' axis.
    pub beta: Option<f32>,
    /// Rotation about the device Y'' axis.
    pub gamma: Option<f32>,
    /// Whether alpha is referenced to the earth frame.
    pub absolute: Option<bool>,
}

impl AngleSample {
    /// A sample with all three angles present.
    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
            absolute: None,
        }
    }

    /// A sample carrying only the tilt angles.
    pub fn tilt(beta: f32, gamma: f32) -> Self {
        Self {
            beta: Some(beta),
            gamma: Some(gamma),
            ..Self::default()
        }
    }

    /// Both tilt angles are present, so the sample can serve as a baseline.
    pub fn has_tilt(&self) -> bool {
        self.beta.is_some() && self.gamma.is_some()
    }
}

/// Rotation of the display relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenAngle {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl ScreenAngle {
    /// Parse an integer angle, normalizing modulo 360 (legacy sources report -90).
    pub fn from_degrees(degrees: i32) -> Result<Self, SensorError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(SensorError::InvalidScreenAngle(degrees)),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn radians(self) -> f32 {
        (self.degrees() as f32).to_radians()
    }
}

impl TryFrom<i32> for ScreenAngle {
    type Error = SensorError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

/// A decoded event from a sensor source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    Orientation(AngleSample),
    Screen(ScreenAngle),
}
