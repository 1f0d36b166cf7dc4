use crate::types::{AngleSample, ScreenAngle, SensorError, SensorEvent};
use serde::Deserialize;
use std::collections::VecDeque;
use thiserror::Error;

/// Longest line accepted before the buffer is discarded.
const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Sensor message is not valid UTF-8")]
    NotUtf8,
    #[error("Sensor message exceeds 4096 bytes without a newline")]
    LineTooLong,
    #[error("Malformed sensor message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// One line on the wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    Orientation {
        alpha: Option<f32>,
        beta: Option<f32>,
        gamma: Option<f32>,
        absolute: Option<bool>,
    },
    Screen {
        angle: i32,
    },
}

/// Streaming parser for newline-delimited JSON sensor events.
///
/// Feed raw bytes via `push_data`, then drain events via `next_event`.
pub struct ProtocolParser {
    buffer: VecDeque<u8>,
}

impl Default for ProtocolParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(1024),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Extract the next complete event. Returns `None` until a full line is buffered.
    /// A malformed line is consumed and reported; the stream stays usable.
    pub fn next_event(&mut self) -> Option<Result<SensorEvent, ProtocolError>> {
        loop {
            let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.buffer.len() > MAX_LINE_LEN {
                    self.buffer.clear();
                    return Some(Err(ProtocolError::LineTooLong));
                }
                return None;
            };

            if newline > MAX_LINE_LEN {
                self.buffer.drain(..=newline);
                return Some(Err(ProtocolError::LineTooLong));
            }

            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let Ok(text) = std::str::from_utf8(&line) else {
                return Some(Err(ProtocolError::NotUtf8));
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            return Some(parse_line(text));
        }
    }
}

fn parse_line(line: &str) -> Result<SensorEvent, ProtocolError> {
    match serde_json::from_str::<WireMessage>(line)? {
        WireMessage::Orientation {
            alpha,
            beta,
            gamma,
            absolute,
        } => Ok(SensorEvent::Orientation(AngleSample {
            alpha,
            beta,
            gamma,
            absolute,
        })),
        WireMessage::Screen { angle } => Ok(SensorEvent::Screen(ScreenAngle::from_degrees(angle)?)),
    }
}
