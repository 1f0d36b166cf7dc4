use crate::sampler::SensorSampler;
use std::future::Future;
use tracing::{info, warn};

/// Outcome of asking the platform for motion-sensor access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The platform exposes no orientation sensors.
    NotSupported,
    /// Sensors are available without an explicit grant.
    NotRequired,
}

impl PermissionState {
    pub fn allows_sensors(self) -> bool {
        matches!(self, Self::Granted | Self::NotRequired)
    }
}

/// Platform-specific sensor permission request.
pub trait PermissionGate {
    fn request(&self) -> impl Future<Output = PermissionState> + Send;
}

/// Gate for platforms without a permission step (native feeds).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPermissionRequired;

impl PermissionGate for NoPermissionRequired {
    async fn request(&self) -> PermissionState {
        PermissionState::NotRequired
    }
}

/// Request access and attach the sampler's listeners only if it is allowed.
///
/// A refusal is not an error: the sampler stays detached and the camera
/// keeps its neutral pose.
pub async fn attach_when_permitted<G: PermissionGate>(
    gate: &G,
    sampler: &mut SensorSampler,
) -> PermissionState {
    let state = gate.request().await;
    if state.allows_sensors() {
        sampler.connect();
        info!(?state, "Sensor access available");
    } else {
        warn!(?state, "Sensor access unavailable, camera stays at neutral pose");
    }
    state
}
