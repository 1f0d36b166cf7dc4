use crate::camera::Camera;
use crate::portal::{PortalProjector, PortalSurface, PortalView};
use crate::target::RenderTargetSize;
use stage_config::{ConfigError, StageConfig};
use stage_orientation::{NeutralPose, OrientationEngine};
use stage_sensors::{attach_when_permitted, PermissionGate, PermissionState, SensorSampler};
use std::time::Duration;
use tracing::{debug, info};

/// Host renderer driven by [`Stage::frame`].
pub trait StageRenderer {
    /// Render the secondary scene through `view` into the off-screen portal target.
    fn render_portal(&mut self, view: &PortalView, target: RenderTargetSize);
    /// Render the primary scene; the portal surface samples the target's texture.
    fn render_primary(&mut self, camera: &Camera, surface: &PortalSurface);
    /// Reallocate the portal target.
    fn resize_target(&mut self, target: RenderTargetSize);
}

/// Everything the render loop needs, owned in one place.
pub struct Stage {
    camera: Camera,
    sampler: SensorSampler,
    engine: OrientationEngine,
    projector: PortalProjector,
    surface: PortalSurface,
    target_size: RenderTargetSize,
    max_pixel_ratio: f32,
    frame_count: u64,
}

impl Stage {
    pub fn new(config: &StageConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (width, height) = config.render.initial_target_size;
        let target_size = RenderTargetSize::new(width, height);
        let camera = Camera::from_config(&config.camera, target_size.aspect_ratio());
        let engine = OrientationEngine::new(
            &config.orientation,
            NeutralPose::new(camera.orientation),
        )?;

        Ok(Self {
            projector: PortalProjector::from_config(&config.portal, camera.near),
            surface: PortalSurface::from_config(&config.portal.surface),
            camera,
            sampler: SensorSampler::new(),
            engine,
            target_size,
            max_pixel_ratio: config.render.max_pixel_ratio,
            frame_count: 0,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn engine(&self) -> &OrientationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut OrientationEngine {
        &mut self.engine
    }

    pub fn sampler_mut(&mut self) -> &mut SensorSampler {
        &mut self.sampler
    }

    pub fn surface(&self) -> &PortalSurface {
        &self.surface
    }

    /// Replace the surface transform supplied by the host scene.
    pub fn set_surface(&mut self, surface: PortalSurface) {
        self.surface = surface;
    }

    pub fn projector(&self) -> &PortalProjector {
        &self.projector
    }

    pub fn target_size(&self) -> RenderTargetSize {
        self.target_size
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Ask for sensor access and attach the sampler if allowed.
    pub async fn request_sensors<G: PermissionGate>(&mut self, gate: &G) -> PermissionState {
        attach_when_permitted(gate, &mut self.sampler).await
    }

    /// Reattach the sampler and resume the engine.
    pub fn connect(&mut self) {
        self.sampler.connect();
        self.engine.connect();
    }

    /// Detach both sensor listeners and freeze the camera orientation.
    pub fn disconnect(&mut self) {
        self.sampler.disconnect();
        self.engine.disconnect();
    }

    /// Advance one frame: consume the latest sample, smooth the camera,
    /// project the portal, then render portal and primary passes in that order.
    pub fn frame<R: StageRenderer>(&mut self, renderer: &mut R, dt: Duration) -> PortalView {
        self.engine.set_screen_angle(self.sampler.screen_angle());
        if let Some(sample) = self.sampler.take_latest() {
            self.engine.apply_sample(&sample);
        }
        self.camera.orientation = self.engine.step(dt);

        let view = self.projector.project(self.camera.position, &self.surface);
        renderer.render_portal(&view, self.target_size);
        renderer.render_primary(&self.camera, &self.surface);

        self.frame_count += 1;
        if self.frame_count % 300 == 0 {
            debug!(frames = self.frame_count, "Render heartbeat");
        }
        view
    }

    /// Window resized to `width`×`height` logical pixels.
    pub fn resize<R: StageRenderer>(
        &mut self,
        renderer: &mut R,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
    ) {
        self.target_size =
            RenderTargetSize::for_window(width, height, device_pixel_ratio, self.max_pixel_ratio);
        self.camera
            .set_viewport(self.target_size.width, self.target_size.height);
        renderer.resize_target(self.target_size);
        info!(
            width = self.target_size.width,
            height = self.target_size.height,
            "Portal target resized"
        );
    }
}
