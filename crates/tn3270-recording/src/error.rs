//! Error types for workflow document loading and saving.

use std::fmt;
use std::io;

use tn3270_core::PublicErrorLabel;

/// Errors that can occur reading or writing a workflow document.
#[derive(Debug)]
pub enum RecordingError {
    /// An I/O error occurred reading or writing the document.
    Io(io::Error),
    /// The document's JSON was malformed or missed a required field.
    MalformedDocument {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedDocument { detail } => write!(f, "malformed workflow document: {detail}"),
        }
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::MalformedDocument { .. } => None,
        }
    }
}

impl From<io::Error> for RecordingError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for RecordingError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedDocument {
            detail: e.to_string(),
        }
    }
}

impl From<&RecordingError> for PublicErrorLabel {
    fn from(_: &RecordingError) -> Self {
        PublicErrorLabel::InvalidRequest
    }
}
