//! Playback error types.

use std::error::Error;
use std::fmt;

use tn3270_core::PublicErrorLabel;
use tn3270_host::HostError;

/// Errors a single playback step can fail with.
#[derive(Debug)]
pub enum PlaybackError {
    /// The Host Adapter rejected an operation the step dispatched.
    Host(HostError),
    /// A `FillString` step's coordinates were not 1-based positive
    /// integers within the current screen.
    InvalidCoordinates {
        /// The row as given in the workflow document.
        row: i64,
        /// The column as given in the workflow document.
        column: i64,
    },
    /// A background executor thread could not be spawned.
    ThreadSpawnFailed {
        /// The OS error the spawn attempt returned.
        reason: String,
    },
    /// The supplied [`crate::PacingConfig`] failed validation.
    InvalidPacing {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(e) => write!(f, "host error: {e}"),
            Self::InvalidCoordinates { row, column } => {
                write!(f, "invalid step coordinates ({row}, {column})")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "playback thread spawn failed: {reason}"),
            Self::InvalidPacing { reason } => write!(f, "invalid pacing config: {reason}"),
        }
    }
}

impl Error for PlaybackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HostError> for PlaybackError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

impl From<&PlaybackError> for PublicErrorLabel {
    fn from(err: &PlaybackError) -> Self {
        match err {
            PlaybackError::Host(e) => e.into(),
            PlaybackError::InvalidCoordinates { .. } => PublicErrorLabel::InvalidRequest,
            PlaybackError::ThreadSpawnFailed { .. } => PublicErrorLabel::InvalidRequest,
            PlaybackError::InvalidPacing { .. } => PublicErrorLabel::InvalidRequest,
        }
    }
}
