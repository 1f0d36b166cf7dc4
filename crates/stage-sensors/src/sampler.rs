use crate::types::{AngleSample, ScreenAngle};
use tracing::{debug, info};

/// Latest-value holder for device rotation and screen angle.
///
/// Nothing is queued: a newer sample replaces an unread older one, and the
/// frame loop consumes at most one sample per frame via [`take_latest`].
///
/// [`take_latest`]: SensorSampler::take_latest
#[derive(Debug, Default)]
pub struct SensorSampler {
    listening: bool,
    latest: Option<AngleSample>,
    screen: ScreenAngle,
    dropped: u64,
}

impl SensorSampler {
    /// A detached sampler. Call [`connect`](Self::connect) once sensor access is permitted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach both the rotation and the screen-angle listeners.
    pub fn connect(&mut self) {
        if !self.listening {
            self.listening = true;
            info!("Sensor listeners attached");
        }
    }

    /// Detach both listeners. Pending samples are discarded.
    pub fn disconnect(&mut self) {
        if self.listening {
            self.listening = false;
            self.latest = None;
            info!(dropped = self.dropped, "Sensor listeners detached");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Rotation listener. Overwrites any unread sample.
    pub fn on_device_orientation(&mut self, sample: AngleSample) {
        if !self.listening {
            return;
        }
        if self.latest.replace(sample).is_some() {
            self.dropped += 1;
        }
    }

    /// Screen-angle listener.
    pub fn on_screen_orientation_change(&mut self, angle: ScreenAngle) {
        if !self.listening {
            return;
        }
        if angle != self.screen {
            debug!(degrees = angle.degrees(), "Screen orientation changed");
        }
        self.screen = angle;
    }

    /// Take the sample delivered since the previous call, if any.
    pub fn take_latest(&mut self) -> Option<AngleSample> {
        self.latest.take()
    }

    pub fn screen_angle(&self) -> ScreenAngle {
        self.screen
    }

    /// Samples overwritten before a frame consumed them.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped
    }
}
