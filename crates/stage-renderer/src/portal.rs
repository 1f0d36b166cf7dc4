use glam::{Mat4, Quat, Vec3, Vec4};
use stage_config::{PortalConfig, SurfaceConfig};

/// Smallest viewer-to-surface depth used when scaling onto the near plane.
pub const MIN_SURFACE_DISTANCE: f32 = 1e-4;

/// The rectangle in the primary scene that shows the portal texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalSurface {
    /// World-space center.
    pub position: Vec3,
    /// World orientation; local +Z is the surface normal.
    pub rotation: Quat,
    pub width: f32,
    pub height: f32,
}

impl PortalSurface {
    pub fn from_config(config: &SurfaceConfig) -> Self {
        Self {
            position: config.position,
            rotation: config.rotation,
            width: config.width,
            height: config.height,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Surface transform for drawing the quad in the primary pass.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Clipping planes of an asymmetric perspective frustum, in view space at the near plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalFrustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl PortalFrustum {
    pub fn projection_matrix(&self) -> Mat4 {
        off_axis_perspective(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// Pose and projection of the secondary camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalView {
    pub position: Vec3,
    pub orientation: Quat,
    pub frustum: PortalFrustum,
    /// Surface center in the secondary camera's view space. A positive `z`
    /// means the surface lies behind the camera.
    pub surface_center: Vec3,
}

impl PortalView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.conjugate()) * Mat4::from_translation(-self.position)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.frustum.projection_matrix()
    }
}

/// Computes the secondary camera that turns the surface into a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalProjector {
    pub near: f32,
    pub far: f32,
}

impl PortalProjector {
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    pub fn from_config(config: &PortalConfig, camera_near: f32) -> Self {
        Self::new(config.effective_near(camera_near), config.far)
    }

    /// Off-axis frustum for a viewer at `viewer` looking through `surface`.
    ///
    /// The secondary camera sits at the viewer and shares the surface's
    /// orientation. The surface rectangle, expressed in that camera's view
    /// space, is scaled onto the near plane; the result moves with the viewer
    /// and gives true parallax. The depth is `|z|` clamped to
    /// [`MIN_SURFACE_DISTANCE`], so a viewer on the surface plane or a surface
    /// behind the viewer still yields a finite frustum.
    pub fn project(&self, viewer: Vec3, surface: &PortalSurface) -> PortalView {
        let orientation = surface.rotation;
        let center = orientation.conjugate() * (surface.position - viewer);

        let half_w = surface.width * 0.5;
        let half_h = surface.height * 0.5;

        let distance = center.z.abs().max(MIN_SURFACE_DISTANCE);
        let scale = self.near / distance;

        PortalView {
            position: viewer,
            orientation,
            frustum: PortalFrustum {
                left: (center.x - half_w) * scale,
                right: (center.x + half_w) * scale,
                top: (center.y + half_h) * scale,
                bottom: (center.y - half_h) * scale,
                near: self.near,
                far: self.far,
            },
            surface_center: center,
        }
    }
}

/// Right-handed off-axis perspective projection looking down -Z, with clip
/// depth mapped to [0, 1] (the `Mat4::perspective_rh` convention).
pub fn off_axis_perspective(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let inv_width = 1.0 / (right - left);
    let inv_height = 1.0 / (top - bottom);
    let inv_depth = 1.0 / (near - far);

    Mat4::from_cols(
        Vec4::new(2.0 * near * inv_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * inv_height, 0.0, 0.0),
        Vec4::new(
            (right + left) * inv_width,
            (top + bottom) * inv_height,
            far * inv_depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, near * far * inv_depth, 0.0),
    )
}
