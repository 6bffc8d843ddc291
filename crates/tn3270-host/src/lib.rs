//! The Host Adapter (C1): owns one long-running 3270 emulator process per
//! session and projects its state into a `Screen`.
//!
//! The emulator is treated as an opaque line-protocol peer (see
//! [`transport::EmulatorTransport`]); a reimplementation is free to swap
//! the subprocess for a native library or an in-process emulator as long
//! as that trait's contract holds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod transport;

pub use adapter::HostAdapter;
pub use config::HostConfig;
pub use error::HostError;
pub use transport::{EmulatorTransport, ProcessTransport, ProcessTransportConfig};
