//! Driver error types.
//!
//! The user-facing taxonomy: protocol-layer errors are folded into these
//! variants, and each variant is either fatal to its session or recoverable
//! after the automatic failure acknowledgement.

use std::io;
use thiserror::Error;

use crate::bolt::{BoltError, PackStreamError};

/// Server error code returned when authentication fails.
pub const UNAUTHORIZED_CODE: &str = "Neo.ClientError.Security.Unauthorized";

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors surfaced by the driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server closed the stream mid-message; the session must be
    /// discarded, e.g. by a connection-pool layer above the driver
    #[error("bad connection: stream closed mid-message")]
    BadConnection,

    /// The handshake produced no agreed protocol version
    #[error("no protocol version could be agreed (server answered {0})")]
    Version(u32),

    /// The server rejected the supplied credentials
    #[error("unauthorized: {0}")]
    Auth(String),

    /// The server reported a statement-level failure
    #[error("server error: {code}: {message}")]
    Server {
        /// Server error code
        code: String,
        /// Server error message
        message: String,
    },

    /// A message violated the protocol: unexpected signature, missing
    /// metadata, wrong field shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Bytes on the wire did not decode to a legal PackStream value
    #[error("codec error: {0}")]
    Codec(#[from] PackStreamError),

    /// A second transaction was begun while one is open
    #[error("a transaction is already open on this session")]
    TransactionAlreadyOpen,

    /// The connection URI or driver configuration is invalid
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DriverError {
    /// Build a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Map a server FAILURE into the typed error for its code.
    pub fn from_failure(code: String, message: String) -> Self {
        if code == UNAUTHORIZED_CODE {
            Self::Auth(message)
        } else {
            Self::Server { code, message }
        }
    }

    /// Check whether this error ends the session.
    ///
    /// Only [`DriverError::Server`] leaves the session usable: after the
    /// automatic ACK_FAILURE drain the session returns to ready.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Server { .. })
    }
}

impl From<BoltError> for DriverError {
    fn from(err: BoltError) -> Self {
        match err {
            BoltError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Self::BadConnection,
            BoltError::Io(e) => Self::Io(e),
            BoltError::PackStream(e) => Self::Codec(e),
            BoltError::Protocol(msg) => Self::Protocol(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_failure_unauthorized() {
        let err = DriverError::from_failure(
            UNAUTHORIZED_CODE.to_string(),
            "bad credentials".to_string(),
        );
        assert!(matches!(err, DriverError::Auth(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_from_failure_server() {
        let err = DriverError::from_failure(
            "Neo.ClientError.Statement.SyntaxError".to_string(),
            "Invalid input".to_string(),
        );
        assert!(matches!(err, DriverError::Server { .. }));
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "server error: Neo.ClientError.Statement.SyntaxError: Invalid input"
        );
    }

    #[test]
    fn test_short_read_is_bad_connection() {
        let bolt = BoltError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        let err: DriverError = bolt.into();
        assert!(matches!(err, DriverError::BadConnection));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_other_io_stays_io() {
        let bolt = BoltError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let err: DriverError = bolt.into();
        assert!(matches!(err, DriverError::Io(_)));
    }

    #[test]
    fn test_codec_from_packstream() {
        let bolt = BoltError::PackStream(PackStreamError::TrailingBytes { position: 5 });
        let err: DriverError = bolt.into();
        assert!(matches!(err, DriverError::Codec(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_fatality() {
        assert!(DriverError::BadConnection.is_fatal());
        assert!(DriverError::Version(0).is_fatal());
        assert!(DriverError::Auth("no".into()).is_fatal());
        assert!(DriverError::TransactionAlreadyOpen.is_fatal());
        assert!(!DriverError::Server {
            code: "Neo.ClientError.Statement.SyntaxError".into(),
            message: "oops".into()
        }
        .is_fatal());
    }
}
