use anyhow::Result;
use stage_config::StageConfig;
use stage_renderer::{Camera, PortalSurface, PortalView, RenderTargetSize, Stage, StageRenderer};
use stage_sensors::{NoPermissionRequired, SensorFeed};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// Stand-in for the GPU host: tracks the passes it would draw and logs them.
#[derive(Default)]
struct HeadlessRenderer {
    portal_passes: u64,
    primary_passes: u64,
    target: Option<RenderTargetSize>,
}

impl StageRenderer for HeadlessRenderer {
    fn render_portal(&mut self, view: &PortalView, target: RenderTargetSize) {
        self.portal_passes += 1;
        if self.portal_passes % 300 == 0 {
            let f = view.frustum;
            debug!(
                left = f.left,
                right = f.right,
                top = f.top,
                bottom = f.bottom,
                width = target.width,
                height = target.height,
                "Portal pass"
            );
        }
    }

    fn render_primary(&mut self, camera: &Camera, surface: &PortalSurface) {
        self.primary_passes += 1;
        trace!(
            forward = ?camera.forward(),
            surface = ?surface.position,
            "Primary pass"
        );
    }

    fn resize_target(&mut self, target: RenderTargetSize) {
        self.target = Some(target);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shadow_stage=info,stage_sensors=info,stage_orientation=info,stage_renderer=info"
                    .into()
            }),
        )
        .init();

    info!("Shadow stage starting");

    let mut config = stage_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        StageConfig::default()
    });

    info!(mode = ?config.orientation.mode, "Config loaded");

    // Connect to the handheld (fall back to an idle mock if it is not there).
    let mut feed = match config.sensors.feed_addr.as_deref() {
        Some(addr) => match SensorFeed::connect(addr).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(?e, "Sensor feed not available, camera stays at neutral pose");
                SensorFeed::mock()
            }
        },
        None => {
            info!("Sensor feed disabled");
            SensorFeed::mock()
        }
    };

    let mut stage = Stage::new(&config)?;
    stage.request_sensors(&NoPermissionRequired).await;

    let mut renderer = HeadlessRenderer::default();
    let (width, height) = config.render.initial_target_size;
    stage.resize(&mut renderer, width as f32, height as f32, 1.0);

    let mut ticker = tokio::time::interval(Duration::from_millis(
        config.render.frame_interval_ms.max(1),
    ));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_frame = Instant::now();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now - last_frame;
                last_frame = now;

                feed.drain_into(stage.sampler_mut());
                stage.frame(&mut renderer, dt);
            }
            _ = &mut shutdown => {
                info!(
                    frames = stage.frame_count(),
                    portal_passes = renderer.portal_passes,
                    primary_passes = renderer.primary_passes,
                    target = ?renderer.target,
                    live_feed = feed.is_live(),
                    "Shutting down"
                );
                break;
            }
        }
    }

    stage.disconnect();

    // Persist the manual yaw correction with the rest of the config.
    config.orientation.alpha_offset_radians = stage.engine().alpha_offset();
    if let Err(e) = stage_config::save_config(&config) {
        error!(?e, "Failed to save config");
    }

    Ok(())
}
