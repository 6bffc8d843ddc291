//! Run Persistence (C8): storing and listing [`tn3270_chaos::SavedRun`]s
//! on disk, and seeding a fresh run from a recorded workflow.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod seed;
pub mod store;

pub use error::PersistenceError;
pub use seed::{seed_from_workflow, status_from_saved};
pub use store::RunStore;
