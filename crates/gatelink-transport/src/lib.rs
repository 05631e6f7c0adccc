//! Device transport for the Gatelink dispatcher.
//!
//! One call, one connection, one request, one response. This crate owns
//! nothing but the exchange itself:
//!
//! ```text
//! DeviceSyncService
//!     │
//!     └─> DeviceTransport::exchange ──(TCP)──> terminal
//!            │
//!            ├─ precondition: device must carry an endpoint
//!            ├─ connect  (10s timeout)
//!            ├─ write    handler-encoded command bytes
//!            └─ read     one buffer (4096 bytes, 10s timeout)
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: retry policy belongs to callers
//! - **No connection pooling**: terminals hold sessions badly
//! - **No pipelining**: at most one request and one response per call
//! - **Socket always closed**: the stream lives and dies inside `exchange`
//!
//! Failures surface as [`gatelink_core::Error`] variants; the orchestrator
//! above converts them to degraded results.

#![allow(async_fn_in_trait)]

pub mod tcp;

pub use tcp::{TcpDeviceTransport, TransportConfig};

use gatelink_core::{Device, Result};
use gatelink_protocol::{ProtocolHandler, ProtocolMessage};

/// Single-shot command/response exchange against one device.
///
/// Implementations must not dial when the device lacks an endpoint, and
/// must release the connection on every exit path.
pub trait DeviceTransport: Send + Sync {
    /// Send one encoded command and read one response buffer.
    ///
    /// # Errors
    ///
    /// - `ConfigurationMissing` when the device has no address or port
    ///   (no connection is attempted)
    /// - `ConnectTimeout` / `ReadTimeout` when the 10s budget elapses
    /// - `Io` on socket failures
    /// - `CommandBuild` when the handler cannot encode the command
    /// - `ResponseEmpty` when the device closed without sending bytes
    async fn exchange(
        &self,
        device: &Device,
        command: &ProtocolMessage,
        handler: &dyn ProtocolHandler,
    ) -> Result<Vec<u8>>;
}
