//! Shared error type across stashmetrics crates.

use thiserror::Error;

/// Stable error codes (used in log fields and by callers matching on failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Destination address could not be resolved.
    Resolution,
    /// Datagram socket could not be established.
    Connect,
    /// Empty field name.
    InvalidKey,
    /// A single flush's write failed.
    TransportWrite,
    /// Snapshot could not be encoded.
    Serialize,
    /// Fault recovered at the flush loop boundary.
    UnexpectedFault,
    /// Configuration rejected.
    BadConfig,
    /// Name already registered with another metric kind.
    KindMismatch,
}

impl ErrorKind {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Resolution => "RESOLUTION",
            ErrorKind::Connect => "CONNECT",
            ErrorKind::InvalidKey => "INVALID_KEY",
            ErrorKind::TransportWrite => "TRANSPORT_WRITE",
            ErrorKind::Serialize => "SERIALIZE",
            ErrorKind::UnexpectedFault => "UNEXPECTED_FAULT",
            ErrorKind::BadConfig => "BAD_CONFIG",
            ErrorKind::KindMismatch => "KIND_MISMATCH",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StashError>;

/// Unified error type used by core and reporter.
#[derive(Debug, Error)]
pub enum StashError {
    #[error("cannot resolve address: {0}")]
    Resolution(String),
    #[error("cannot establish transport: {0}")]
    Connect(String),
    #[error("invalid key: field name must not be empty")]
    InvalidKey,
    #[error("transport write failed: {0}")]
    TransportWrite(String),
    #[error("serialize failed: {0}")]
    Serialize(String),
    #[error("unexpected fault: {0}")]
    UnexpectedFault(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("metric {name} is already registered as a {existing}")]
    KindMismatch { name: String, existing: &'static str },
}

impl StashError {
    /// Map the error to its stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StashError::Resolution(_) => ErrorKind::Resolution,
            StashError::Connect(_) => ErrorKind::Connect,
            StashError::InvalidKey => ErrorKind::InvalidKey,
            StashError::TransportWrite(_) => ErrorKind::TransportWrite,
            StashError::Serialize(_) => ErrorKind::Serialize,
            StashError::UnexpectedFault(_) => ErrorKind::UnexpectedFault,
            StashError::BadConfig(_) => ErrorKind::BadConfig,
            StashError::KindMismatch { .. } => ErrorKind::KindMismatch,
        }
    }
}
