//! Host Adapter error types.

use std::error::Error;
use std::fmt;

use tn3270_core::PublicErrorLabel;

/// Errors the Host Adapter (C1) can return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The emulator subprocess failed to spawn or never reported ready.
    StartFailed {
        /// Human-readable reason (spawn failure, negotiation timeout, ...).
        reason: String,
    },
    /// An I/O error occurred talking to the emulator subprocess — the
    /// subprocess likely exited. The session is marked unusable; the
    /// next operation returns the same error class.
    IoError {
        /// Human-readable reason.
        reason: String,
    },
    /// An operation that requires a live connection was attempted while
    /// disconnected.
    NotConnected,
    /// `writeStringAt` targeted a field the screen does not have room
    /// for, or targeted a protected field.
    WriteOutOfBounds {
        /// Requested row.
        row: u16,
        /// Requested column.
        col: u16,
    },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFailed { reason } => write!(f, "host start failed: {reason}"),
            Self::IoError { reason } => write!(f, "host I/O error: {reason}"),
            Self::NotConnected => write!(f, "host is not connected"),
            Self::WriteOutOfBounds { row, col } => {
                write!(f, "write out of bounds at row {row}, col {col}")
            }
        }
    }
}

impl Error for HostError {}

impl From<&HostError> for PublicErrorLabel {
    fn from(err: &HostError) -> Self {
        match err {
            HostError::StartFailed { .. } => PublicErrorLabel::HostStartFailed,
            HostError::IoError { .. } => PublicErrorLabel::HostIoError,
            HostError::NotConnected => PublicErrorLabel::NotConnected,
            HostError::WriteOutOfBounds { .. } => PublicErrorLabel::InvalidRequest,
        }
    }
}
