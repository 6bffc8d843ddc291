//! Test utilities and mock types for tn3270-chaos development.
//!
//! Provides [`MockTransport`], a scriptable [`tn3270_host::EmulatorTransport`]
//! implementation, and small screen-builder helpers for constructing test
//! fixtures without spawning a real emulator subprocess.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::MockTransport;
