//! Device sync orchestration for the Gatelink dispatcher.
//!
//! This crate is the public face of the dispatcher: the
//! [`DeviceSyncService`] composes the directory, the handler registry, the
//! command builder, the transport, and the response interpreter into one
//! pipeline per operation, and owns the never-throw contract — hardware
//! and network failures degrade to documented defaults instead of
//! propagating.
//!
//! ```text
//! caller
//!   │
//!   ▼
//! DeviceSyncService ──> DeviceDirectory   (resolve device)
//!   │                   HandlerRegistry   (resolve protocol handler)
//!   │                   build_command     (abstract verb → envelope)
//!   │                   DeviceTransport   (one TCP exchange)
//!   │                   decode_response   (validate + parse)
//!   ▼
//! typed result (bool / Vec / HealthReport / MetricsSnapshot / ack)
//! ```
//!
//! The only shared mutable state is the per-device [`UserListCache`],
//! consulted exclusively by the list-users path and invalidated by the two
//! user mutations.

#![allow(async_fn_in_trait)]

pub mod cache;
pub mod directory;
pub mod service;

pub use cache::UserListCache;
pub use directory::{DeviceDirectory, InMemoryDirectory};
pub use service::DeviceSyncService;
