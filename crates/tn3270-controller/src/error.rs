//! Chaos Controller error types.

use std::error::Error;
use std::fmt;

use tn3270_chaos::ChaosError;
use tn3270_core::{PublicErrorLabel, SessionId};
use tn3270_persistence::PersistenceError;

/// Errors `tn3270-controller` can return.
#[derive(Debug)]
pub enum ControllerError {
    /// No session is registered under the requested id.
    SessionNotFound(SessionId),
    /// The caller asked to resume/stage a run before loading one, or
    /// loaded one that was never staged.
    NoRunStaged,
    /// The Chaos Engine reported an error.
    Chaos(ChaosError),
    /// The persistence layer reported an error.
    Persistence(PersistenceError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "no session registered for {id}"),
            Self::NoRunStaged => write!(f, "no run has been staged for this session"),
            Self::Chaos(e) => write!(f, "chaos engine error: {e}"),
            Self::Persistence(e) => write!(f, "persistence error: {e}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Chaos(e) => Some(e),
            Self::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ChaosError> for ControllerError {
    fn from(e: ChaosError) -> Self {
        Self::Chaos(e)
    }
}

impl From<PersistenceError> for ControllerError {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

impl From<&ControllerError> for PublicErrorLabel {
    fn from(err: &ControllerError) -> Self {
        match err {
            ControllerError::SessionNotFound(_) => PublicErrorLabel::SessionNotFound,
            ControllerError::NoRunStaged => PublicErrorLabel::InvalidRequest,
            ControllerError::Chaos(e) => e.into(),
            ControllerError::Persistence(e) => e.into(),
        }
    }
}
