//! tn3270-chaos: an interactive TN3270 mainframe terminal gateway with a
//! seeded chaos-exploration engine and workflow recording/playback.
//!
//! This is the top-level facade crate: most users add `tn3270` as a single
//! dependency and reach every component through [`prelude`].
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`host`] | `tn3270-host` | Host Adapter: emulator subprocess + transport |
//! | [`session`] | `tn3270-session` | Session Store |
//! | [`recording`] | `tn3270-recording` | Workflow document model and recorder |
//! | [`playback`] | `tn3270-playback` | Workflow playback state machine |
//! | [`chaos`] | `tn3270-chaos` | Chaos engine and mind map |
//! | [`persistence`] | `tn3270-persistence` | SavedRun storage |
//! | [`controller`] | `tn3270-controller` | Per-session chaos engine registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core screen/field model, AID keys, ids (`tn3270-core`).
pub use tn3270_core as core;

/// Host Adapter: owns the emulator subprocess (`tn3270-host`).
pub use tn3270_host as host;

/// Session Store (`tn3270-session`).
pub use tn3270_session as session;

/// Workflow document model and recorder (`tn3270-recording`).
pub use tn3270_recording as recording;

/// Workflow playback state machine (`tn3270-playback`).
pub use tn3270_playback as playback;

/// Chaos engine and mind map (`tn3270-chaos`).
pub use tn3270_chaos as chaos;

/// SavedRun persistence (`tn3270-persistence`).
pub use tn3270_persistence as persistence;

/// Per-session chaos engine registry (`tn3270-controller`).
pub use tn3270_controller as controller;

/// Common imports for typical `tn3270` usage.
pub mod prelude {
    pub use tn3270_core::{Aid, Field, PublicErrorLabel, RunId, Screen, SessionId};
    pub use tn3270_host::{HostAdapter, HostConfig, HostError};
    pub use tn3270_session::SessionStore;
    pub use tn3270_recording::{Recorder, WorkflowDocument};
    pub use tn3270_playback::{Playback, PlaybackMode, PlaybackStatus};
    pub use tn3270_chaos::{ChaosConfig, ChaosEngine, ChaosStatus};
    pub use tn3270_persistence::RunStore;
    pub use tn3270_controller::ChaosController;
}
