use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{axis} tilt range must be positive (got {value})")]
    NonPositiveRange { axis: &'static str, value: f32 },
    #[error("{axis} max angle must not be negative (got {value})")]
    NegativeMaxAngle { axis: &'static str, value: f32 },
    #[error("smoothing factor must be within [0, 1] (got {0})")]
    SmoothingOutOfRange(f32),
    #[error("dead-zone must not be negative (got {0})")]
    NegativeDeadZone(f32),
    #[error("smoothing reference frame must be positive (got {0})")]
    InvalidReferenceFrame(f32),
    #[error("{which} clip planes must satisfy 0 < near < far (got near={near}, far={far})")]
    InvalidClipPlanes {
        which: &'static str,
        near: f32,
        far: f32,
    },
    #[error("portal near plane {portal} lies beyond the camera near plane {camera}")]
    PortalNearBeyondCamera { portal: f32, camera: f32 },
    #[error("portal surface must have positive size (got {width}x{height})")]
    InvalidSurface { width: f32, height: f32 },
    #[error("max pixel ratio must be positive (got {0})")]
    InvalidPixelRatio(f32),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Sensor feed connection.
    pub sensors: SensorConfig,
    /// Render-target sizing and frame cadence.
    pub render: RenderConfig,
    /// Device orientation to camera mapping.
    pub orientation: OrientationConfig,
    /// Primary (viewer) camera.
    pub camera: CameraConfig,
    /// Portal surface and its secondary camera.
    pub portal: PortalConfig,
}

/// `false` for NaN.
fn is_positive(value: f32) -> bool {
    value > 0.0
}

/// `false` for NaN.
fn is_non_negative(value: f32) -> bool {
    value >= 0.0
}

impl StageConfig {
    /// Check every tunable against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.orientation.validate()?;
        self.camera.validate()?;
        self.portal.validate(self.camera.near)?;
        if !is_positive(self.render.max_pixel_ratio) {
            return Err(ConfigError::InvalidPixelRatio(self.render.max_pixel_ratio));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Address of the handheld streaming orientation events.
    /// `None` disables the feed; the camera then stays at its neutral pose.
    pub feed_addr: Option<String>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            feed_addr: Some("127.0.0.1:7878".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound applied to the device pixel ratio when sizing the portal target.
    pub max_pixel_ratio: f32,
    /// Portal render-target size before the first resize.
    pub initial_target_size: (u32, u32),
    /// Frame interval of the render loop in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            initial_target_size: (1024, 1024),
            frame_interval_ms: 16,
        }
    }
}

/// How device angles drive the camera. Fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationMode {
    /// Full 3-axis reconstruction from alpha/beta/gamma, no smoothing.
    AbsoluteDeviceOrientation,
    /// Bounded yaw/pitch around the neutral pose from beta/gamma deltas.
    RelativeTiltDelta,
}

/// How the per-frame slerp fraction is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum SmoothingStrategy {
    /// Apply the smoothing factor once per frame regardless of elapsed time.
    /// Convergence speed is therefore tied to the frame rate.
    #[default]
    PerFrame,
    /// Rescale the factor by elapsed time so that a frame lasting
    /// `reference_frame_seconds` uses the factor unchanged.
    TimeScaled { reference_frame_seconds: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub mode: OrientationMode,
    /// Manual yaw correction added to alpha in absolute mode (radians).
    pub alpha_offset_radians: f32,
    pub smoothing_strategy: SmoothingStrategy,
    /// Relative tilt mode tunables.
    pub tilt: TiltConfig,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            mode: OrientationMode::RelativeTiltDelta,
            alpha_offset_radians: 0.0,
            smoothing_strategy: SmoothingStrategy::PerFrame,
            tilt: TiltConfig::default(),
        }
    }
}

impl OrientationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tilt.validate()?;
        if let SmoothingStrategy::TimeScaled {
            reference_frame_seconds,
        } = self.smoothing_strategy
        {
            if !is_positive(reference_frame_seconds) {
                return Err(ConfigError::InvalidReferenceFrame(reference_frame_seconds));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Largest camera pitch away from neutral (degrees).
    pub max_pitch_degrees: f32,
    /// Largest camera yaw away from neutral (degrees).
    pub max_yaw_degrees: f32,
    /// Device beta delta that maps to the full pitch (degrees).
    pub pitch_range_degrees: f32,
    /// Device gamma delta that maps to the full yaw (degrees).
    pub yaw_range_degrees: f32,
    /// Slerp fraction applied per frame. 0 freezes, 1 snaps.
    pub smoothing: f32,
    pub invert_pitch: bool,
    pub invert_yaw: bool,
    /// Deltas smaller than this (degrees) are treated as zero.
    pub dead_zone_degrees: f32,
    /// Swap/negate the deltas according to the screen rotation.
    pub screen_compensation: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_pitch_degrees: 8.0,
            max_yaw_degrees: 8.0,
            pitch_range_degrees: 20.0,
            yaw_range_degrees: 20.0,
            smoothing: 0.12,
            invert_pitch: true,
            invert_yaw: true,
            dead_zone_degrees: 0.0,
            screen_compensation: false,
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [
            ("pitch", self.pitch_range_degrees),
            ("yaw", self.yaw_range_degrees),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::NonPositiveRange { axis, value });
            }
        }
        for (axis, value) in [
            ("pitch", self.max_pitch_degrees),
            ("yaw", self.max_yaw_degrees),
        ] {
            if !is_non_negative(value) {
                return Err(ConfigError::NegativeMaxAngle { axis, value });
            }
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing));
        }
        if !is_non_negative(self.dead_zone_degrees) {
            return Err(ConfigError::NegativeDeadZone(self.dead_zone_degrees));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// World-space camera position.
    #[serde(with = "vec3_serde")]
    pub position: Vec3,
    /// Point the camera faces at startup; defines the neutral pose.
    #[serde(with = "vec3_serde")]
    pub look_at: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, -2.2),
            look_at: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::InvalidClipPlanes {
                which: "camera",
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Secondary camera near plane. `None` shares the primary camera's.
    pub near: Option<f32>,
    /// Secondary camera far plane.
    pub far: f32,
    pub surface: SurfaceConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            near: None,
            far: 10.0,
            surface: SurfaceConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Near plane actually used, given the primary camera's.
    pub fn effective_near(&self, camera_near: f32) -> f32 {
        self.near.unwrap_or(camera_near)
    }

    pub fn validate(&self, camera_near: f32) -> Result<(), ConfigError> {
        let near = self.effective_near(camera_near);
        if !(near > 0.0 && self.far > near) {
            return Err(ConfigError::InvalidClipPlanes {
                which: "portal",
                near,
                far: self.far,
            });
        }
        if near > camera_near {
            return Err(ConfigError::PortalNearBeyondCamera {
                portal: near,
                camera: camera_near,
            });
        }
        if !(self.surface.width > 0.0 && self.surface.height > 0.0) {
            return Err(ConfigError::InvalidSurface {
                width: self.surface.width,
                height: self.surface.height,
            });
        }
        Ok(())
    }
}

/// The rectangular surface showing the portal view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Physical width and height in world units.
    pub width: f32,
    pub height: f32,
    /// World-space center position.
    #[serde(with = "vec3_serde")]
    pub position: Vec3,
    /// World orientation; the surface normal is its local +Z.
    #[serde(with = "quat_serde")]
    pub rotation: Quat,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 0.8,
            height: 1.2,
            position: Vec3::new(0.0, 0.0, -0.2),
            rotation: Quat::IDENTITY,
        }
    }
}

// glam types as bare arrays keep the TOML readable.

mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        v.to_array().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        <[f32; 3]>::deserialize(d).map(Vec3::from_array)
    }
}

mod quat_serde {
    use glam::Quat;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(q: &Quat, s: S) -> Result<S::Ok, S::Error> {
        q.to_array().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Quat, D::Error> {
        let [x, y, z, w] = <[f32; 4]>::deserialize(d)?;
        Ok(Quat::from_xyzw(x, y, z, w).normalize())
    }
}
