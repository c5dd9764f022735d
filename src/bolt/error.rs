//! Bolt protocol error types.

use std::fmt;
use std::io;

use super::packstream::PackStreamError;

/// Result type for Bolt protocol operations.
pub type BoltResult<T> = Result<T, BoltError>;

/// Errors produced by the protocol layer: framing, codec, message parsing.
///
/// The user-facing driver layer folds these into its own error taxonomy.
#[derive(Debug)]
pub enum BoltError {
    /// I/O error on the underlying stream
    Io(io::Error),

    /// PackStream serialization error
    PackStream(PackStreamError),

    /// Message shape or signature violates the protocol
    Protocol(String),
}

impl BoltError {
    /// Check whether this error means the peer closed the stream mid-message.
    ///
    /// A half-message can never be legal, so this maps to "bad connection"
    /// at the driver layer.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, BoltError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }

    /// Build a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        BoltError::Protocol(msg.into())
    }
}

impl fmt::Display for BoltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoltError::Io(e) => write!(f, "I/O error: {}", e),
            BoltError::PackStream(e) => write!(f, "PackStream error: {}", e),
            BoltError::Protocol(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

impl std::error::Error for BoltError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoltError::Io(e) => Some(e),
            BoltError::PackStream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BoltError {
    fn from(err: io::Error) -> Self {
        BoltError::Io(err)
    }
}

impl From<PackStreamError> for BoltError {
    fn from(err: PackStreamError) -> Self {
        BoltError::PackStream(err)
    }
}
