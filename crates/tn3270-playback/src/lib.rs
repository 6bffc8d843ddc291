//! Workflow Playback (C5): deterministic step execution with
//! play/debug/pause/step/stop control and jittered per-step pacing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod playback;
pub mod status;

pub use config::{PacingConfig, PacingError};
pub use error::PlaybackError;
pub use playback::Playback;
pub use status::{EventLog, PlaybackMode, PlaybackStatus, MAX_EVENTS};
