//! The Chaos Controller (C9): the per-session registry that owns chaos
//! engines and staged runs, plus hint extraction from recordings (§4.9).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod hints;

pub use controller::ChaosController;
pub use error::ControllerError;
pub use hints::extract_hints;
