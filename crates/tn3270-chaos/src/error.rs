//! Chaos Engine and Mind Map error types.

use std::error::Error;
use std::fmt;

use tn3270_core::PublicErrorLabel;
use tn3270_host::HostError;

/// Errors detected while validating a [`crate::ChaosConfig`].
#[derive(Debug, PartialEq)]
pub enum ChaosConfigError {
    /// `step_delay_secs` or `time_budget_secs` was NaN, infinite, or negative.
    InvalidDuration {
        /// The offending value.
        value: f64,
    },
    /// One of `aid_key_weights`' keys was the empty string.
    EmptyAidKeyName,
}

impl fmt::Display for ChaosConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration { value } => {
                write!(f, "duration must be finite and non-negative, got {value}")
            }
            Self::EmptyAidKeyName => write!(f, "aid_key_weights contains an empty key name"),
        }
    }
}

impl Error for ChaosConfigError {}

/// Errors the Chaos Engine (C6) can return.
#[derive(Debug)]
pub enum ChaosError {
    /// `start`/`resume` was called while already active.
    AlreadyRunning,
    /// `start` was called on a disconnected host.
    NotConnected,
    /// The supplied config failed validation.
    InvalidConfig(ChaosConfigError),
    /// A background executor thread could not be spawned.
    ThreadSpawnFailed {
        /// The OS error the spawn attempt returned.
        reason: String,
    },
    /// The exported workflow failed its own validation pass.
    ExportInvalid {
        /// Human-readable reason.
        reason: String,
    },
    /// The Host Adapter reported an error.
    Host(HostError),
}

impl fmt::Display for ChaosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "chaos engine is already running"),
            Self::NotConnected => write!(f, "host is not connected"),
            Self::InvalidConfig(e) => write!(f, "invalid chaos config: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "chaos thread spawn failed: {reason}"),
            Self::ExportInvalid { reason } => write!(f, "exported workflow is invalid: {reason}"),
            Self::Host(e) => write!(f, "host error: {e}"),
        }
    }
}

impl Error for ChaosError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            Self::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HostError> for ChaosError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

impl From<ChaosConfigError> for ChaosError {
    fn from(e: ChaosConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

impl From<&ChaosError> for PublicErrorLabel {
    fn from(err: &ChaosError) -> Self {
        match err {
            ChaosError::AlreadyRunning => PublicErrorLabel::AlreadyRunning,
            ChaosError::NotConnected => PublicErrorLabel::NotConnected,
            ChaosError::InvalidConfig(_) => PublicErrorLabel::InvalidRequest,
            ChaosError::ThreadSpawnFailed { .. } => PublicErrorLabel::InvalidRequest,
            ChaosError::ExportInvalid { .. } => PublicErrorLabel::ExportInvalid,
            ChaosError::Host(e) => e.into(),
        }
    }
}
