//! Core types shared across the tn3270-chaos workspace.
//!
//! This is the leaf crate with zero internal dependencies on sibling
//! crates. It defines the screen/field model, canonical AID keys, the
//! screen-hashing rule, session/run identifiers, and the error kinds
//! every other crate builds on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aid;
pub mod error;
pub mod hash;
pub mod ids;
pub mod screen;

pub use aid::Aid;
pub use error::PublicErrorLabel;
pub use hash::screen_hash;
pub use ids::{RunId, SessionId};
pub use screen::{Field, FieldAttrs, Screen};
