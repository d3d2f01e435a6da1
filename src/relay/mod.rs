pub mod hub;
pub mod message;
pub mod tcp;

use thiserror::Error;

pub use hub::{Relay, RelayConnection};
pub use message::{ClientEvent, ServerEvent, TestResults, UserId};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay connection closed")]
    Closed,
    #[error("relay i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode relay event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for outgoing session events.
///
/// Delivery is best-effort; callers are expected to ignore errors.
pub trait EventSink {
    fn emit(&mut self, event: &ClientEvent) -> Result<(), RelayError>;
}

/// Sink used when no relay is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &ClientEvent) -> Result<(), RelayError> {
        Ok(())
    }
}
