//! Workflow recording (C4): observing a session and producing a
//! [`WorkflowDocument`] (§6) that `tn3270-playback` can later replay.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod recorder;
pub mod types;

pub use document::{read_document, write_document};
pub use error::RecordingError;
pub use recorder::Recorder;
pub use types::{Coordinates, DelayRange, WorkflowDocument, WorkflowStep};
