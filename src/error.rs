//! Error types for the control link

use std::time::Duration;
use tokio_tungstenite::tungstenite;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Connection and startup errors.
///
/// Everything here other than the configuration variants is recovered by the
/// link itself: the connection is dropped and re-established after the backoff.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Websocket handshake or stream failure
    #[error("Transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// Connect attempt did not complete in time
    #[error("Connect timed out after {0:?}")]
    Timeout(Duration),

    /// Ground station ended the stream
    #[error("Connection closed by ground station")]
    ConnectionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparseable configuration file
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration outside its documented range
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure to turn one inbound frame into motor output.
///
/// A frame error never ends the connection, the frame is dropped.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Frame is not valid JSON
    #[error("malformed frame: {0}")]
    Decode(String),

    /// Frame is valid JSON but cannot be used
    #[error("error processing frame: {0}")]
    Processing(String),
}

impl FrameError {
    pub fn is_decode(&self) -> bool {
        matches!(self, FrameError::Decode(_))
    }
}
