//! Core types for the Gatelink device dispatcher.
//!
//! This crate holds everything shared by the protocol, transport, and sync
//! layers: the device record as read from the external directory, the error
//! taxonomy every layer speaks, the typed results of the public operations
//! (health reports, metric snapshots, heartbeat acks), and the protocol
//! constants (verb tables, data-map keys, timeouts).
//!
//! Nothing here performs I/O.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
