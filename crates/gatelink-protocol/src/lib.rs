//! Protocol layer of the Gatelink dispatcher.
//!
//! Physical terminals speak one wire protocol per hardware family, and the
//! rest of the platform speaks a handful of abstract verbs. This crate is
//! the seam between the two:
//!
//! - [`ProtocolMessage`] — the shared command/response envelope,
//! - [`ProtocolHandler`] — the per-family codec capability, implemented
//!   outside this workspace and selected at dispatch time,
//! - [`HandlerRegistry`] — (device type, manufacturer) → handler lookup,
//! - [`build_command`] — abstract verb → concrete command message, with a
//!   deterministic per-family verb table and fallback,
//! - [`interpret`] — validated decoding of loosely-typed responses into
//!   success bits, user lists, and health/metric fields.
//!
//! The wire format itself is opaque here: handlers take and return bytes.

pub mod command;
pub mod handler;
pub mod interpret;
pub mod message;
pub mod mock;

pub use command::{CommandKind, build_command, resolve_verb};
pub use handler::{HandlerRegistry, InMemoryRegistry, ProtocolHandler};
pub use message::{MessageStatus, ProtocolMessage};
