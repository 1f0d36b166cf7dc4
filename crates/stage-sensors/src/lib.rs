pub mod permission;
pub mod protocol;
pub mod sampler;
pub mod types;

pub use permission::{attach_when_permitted, NoPermissionRequired, PermissionGate, PermissionState};
pub use sampler::SensorSampler;
pub use types::{AngleSample, ScreenAngle, SensorError, SensorEvent};

use anyhow::Result;
use protocol::ProtocolParser;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Client for a handheld streaming its orientation sensors.
///
/// Connects over TCP, parses the newline-delimited event stream and
/// publishes the latest rotation sample and screen angle. Values are
/// overwritten, never queued; the frame loop picks them up with
/// [`drain_into`](SensorFeed::drain_into).
pub struct SensorFeed {
    sample_rx: watch::Receiver<Option<AngleSample>>,
    screen_rx: watch::Receiver<ScreenAngle>,
    task: Option<JoinHandle<()>>,
}

impl SensorFeed {
    /// Connect to the handheld at `addr` and start reading.
    pub async fn connect(addr: &str) -> Result<Self> {
        tracing::info!(%addr, "Connecting to sensor feed");

        let stream = TcpStream::connect(addr).await?;
        tracing::info!("Connected to sensor feed");

        let (sample_tx, sample_rx) = watch::channel(None);
        let (screen_tx, screen_rx) = watch::channel(ScreenAngle::default());

        let task = tokio::spawn(feed_read_loop(stream, sample_tx, screen_tx));

        Ok(Self {
            sample_rx,
            screen_rx,
            task: Some(task),
        })
    }

    /// A feed that never delivers anything, for running without a handheld.
    pub fn mock() -> Self {
        let (_, sample_rx) = watch::channel(None);
        let (_, screen_rx) = watch::channel(ScreenAngle::default());
        Self {
            sample_rx,
            screen_rx,
            task: None,
        }
    }

    /// Forward values published since the last drain into `sampler`.
    pub fn drain_into(&mut self, sampler: &mut SensorSampler) {
        let screen = self.screen_rx.borrow_and_update();
        if screen.has_changed() {
            sampler.on_screen_orientation_change(*screen);
        }
        drop(screen);

        let sample = self.sample_rx.borrow_and_update();
        if sample.has_changed() {
            if let Some(sample) = *sample {
                sampler.on_device_orientation(sample);
            }
        }
    }

    /// Whether the read task is still running.
    pub fn is_live(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SensorFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Background task: read TCP stream, parse events, publish the latest values.
async fn feed_read_loop(
    mut stream: TcpStream,
    sample_tx: watch::Sender<Option<AngleSample>>,
    screen_tx: watch::Sender<ScreenAngle>,
) {
    let mut parser = ProtocolParser::new();
    let mut buf = [0u8; 4096];
    let mut sample_count: u64 = 0;

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!("Sensor feed connection closed");
                break;
            }
            Ok(n) => {
                parser.push_data(&buf[..n]);

                while let Some(result) = parser.next_event() {
                    match result {
                        Ok(SensorEvent::Orientation(sample)) => {
                            sample_tx.send_replace(Some(sample));
                            sample_count += 1;
                            if sample_count % 1000 == 0 {
                                tracing::debug!(sample_count, "Orientation samples received");
                            }
                        }
                        Ok(SensorEvent::Screen(angle)) => {
                            screen_tx.send_replace(angle);
                        }
                        Err(e) => {
                            tracing::trace!(?e, "Skipping malformed sensor message");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(?e, "Sensor feed read error");
                break;
            }
        }
    }
}
