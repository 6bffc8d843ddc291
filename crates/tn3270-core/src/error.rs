//! The stable public error surface (§7).
//!
//! Each crate in this workspace defines its own local error enum with as
//! many variants as its domain needs, and implements `From<LocalError> for
//! PublicErrorLabel` so the out-of-scope HTTP layer can map any internal
//! failure onto this one stable, wire-facing vocabulary without matching
//! on internal variants it was never meant to see.

use std::fmt;

/// The closed set of error labels exposed to external callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PublicErrorLabel {
    /// The referenced session id has no matching entry in the store.
    SessionNotFound,
    /// An operation that requires a live host connection was attempted
    /// without one.
    NotConnected,
    /// A start-type operation was attempted while one was already active.
    AlreadyRunning,
    /// The caller's request was malformed (missing run id, bad
    /// coordinates, ...).
    InvalidRequest,
    /// The emulator subprocess failed to spawn or negotiate.
    HostStartFailed,
    /// An I/O error occurred talking to the emulator subprocess.
    HostIoError,
    /// The referenced run id has no matching saved run.
    RunNotFound,
    /// A generated export failed its own validation pass.
    ExportInvalid,
    /// A persistence operation (save/load/list) failed.
    PersistError,
}

impl fmt::Display for PublicErrorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SessionNotFound => "SessionNotFound",
            Self::NotConnected => "NotConnected",
            Self::AlreadyRunning => "AlreadyRunning",
            Self::InvalidRequest => "InvalidRequest",
            Self::HostStartFailed => "HostStartFailed",
            Self::HostIoError => "HostIOError",
            Self::RunNotFound => "RunNotFound",
            Self::ExportInvalid => "ExportInvalid",
            Self::PersistError => "PersistError",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_render_stable_wire_strings() {
        assert_eq!(PublicErrorLabel::SessionNotFound.to_string(), "SessionNotFound");
        assert_eq!(PublicErrorLabel::HostIoError.to_string(), "HostIOError");
    }
}
