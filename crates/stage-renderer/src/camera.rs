use glam::{Mat3, Mat4, Quat, Vec3};
use stage_config::CameraConfig;

/// Primary (viewer) camera.
///
/// The orientation engine only ever writes `orientation`; the position is
/// fixed by the host scene.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1.0)
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self {
            position: config.position,
            orientation: look_rotation(config.position, config.look_at),
            fov_y_degrees: config.fov_y_degrees,
            aspect_ratio,
            near: config.near,
            far: config.far,
        }
    }

    /// Direction the camera looks along (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Update the aspect ratio for a viewport; a zero height counts as one pixel.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    }

    /// View matrix (inverse of camera world transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.conjugate()) * Mat4::from_translation(-self.position)
    }

    /// Symmetric perspective projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

/// Rotation that points a camera at `eye` toward `target` with +Y up.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let back = (eye - target).normalize_or_zero();
    if back == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = Vec3::Y.cross(back).normalize_or_zero();
    if right == Vec3::ZERO {
        // Looking straight up or down.
        return Quat::from_rotation_arc(Vec3::NEG_Z, -back);
    }
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}
