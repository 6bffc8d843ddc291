//! The Chaos Engine (C6) and Mind Map (C7): seeded, adaptive exploration
//! of a connected session and the learned screen graph it builds up.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod mindmap;
pub mod types;

pub use config::{ChaosConfig, Hint};
pub use engine::ChaosEngine;
pub use error::{ChaosConfigError, ChaosError};
pub use mindmap::{field_key, Area, FieldMeta, KeyStats, MindMap};
pub use types::{Attempt, ChaosStatus, FieldWrite, SavedRun, Transition};
