use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportErrorKind {
    /// The caller-supplied timeout elapsed before a response arrived
    Timeout,
    /// The connection could not be established or was dropped
    Connection,
    /// The peer answered with something that is not a usable HTTP response
    Protocol,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connection => "connection",
            TransportErrorKind::Protocol => "protocol",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network or timeout failure raised by a transport
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("transport {kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new<S: Into<String>>(kind: TransportErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after_millis: u64) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response within {} ms", after_millis),
        )
    }

    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Connection, message)
    }

    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Protocol, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() || error.is_request() {
            TransportErrorKind::Connection
        } else {
            TransportErrorKind::Protocol
        };
        TransportError::new(kind, error.to_string())
    }
}
