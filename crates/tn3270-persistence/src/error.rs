//! Run Persistence error types.

use std::error::Error;
use std::fmt;
use std::io;

use tn3270_core::PublicErrorLabel;

/// Errors `tn3270-persistence` can return.
#[derive(Debug)]
pub enum PersistenceError {
    /// An I/O error occurred reading, writing, or listing the runs
    /// directory.
    Io(io::Error),
    /// A saved run's JSON failed to parse.
    Corrupt {
        /// The run id whose file failed to parse.
        id: String,
        /// The underlying parse error.
        reason: String,
    },
    /// No saved run exists under the requested id.
    NotFound {
        /// The run id that was requested.
        id: String,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "persistence I/O error: {e}"),
            Self::Corrupt { id, reason } => write!(f, "run {id} is corrupt: {reason}"),
            Self::NotFound { id } => write!(f, "run {id} not found"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<&PersistenceError> for PublicErrorLabel {
    fn from(err: &PersistenceError) -> Self {
        match err {
            PersistenceError::Io(_) => PublicErrorLabel::PersistError,
            PersistenceError::Corrupt { .. } => PublicErrorLabel::PersistError,
            PersistenceError::NotFound { .. } => PublicErrorLabel::RunNotFound,
        }
    }
}
