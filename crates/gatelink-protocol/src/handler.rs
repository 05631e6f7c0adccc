//! Handler capability and registry.
//!
//! One [`ProtocolHandler`] exists per hardware family; implementations live
//! outside this workspace, next to the wire-format code they own. The
//! dispatcher selects one at runtime from the (device type, manufacturer)
//! pair and never looks inside the bytes it produces or consumes.

use crate::message::ProtocolMessage;
use gatelink_core::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-family protocol codec capability.
///
/// All methods are synchronous and side-effect free; the trait stays
/// object-safe so registries can hand out `Arc<dyn ProtocolHandler>`.
pub trait ProtocolHandler: Send + Sync {
    /// Tag identifying the concrete protocol, e.g. `ACCESS_ENTROPY_V4_8`.
    /// The command builder keys its verb table on the tag's family prefix.
    fn protocol_type(&self) -> &str;

    /// Decode one raw response buffer into an envelope.
    ///
    /// # Errors
    /// Returns an error when the bytes are not a message of this protocol.
    fn parse_message(&self, raw: &[u8]) -> Result<ProtocolMessage>;

    /// Structural validation of a decoded envelope.
    fn validate_message(&self, msg: &ProtocolMessage) -> bool;

    /// Encode an outbound command envelope into wire bytes.
    ///
    /// This is a distinct capability from response handling: outbound
    /// commands are never produced by running the inbound codec backwards.
    ///
    /// # Errors
    /// Returns an error when the envelope cannot be expressed in this
    /// protocol (unsupported verb, oversized payload).
    fn encode_command(&self, msg: &ProtocolMessage) -> Result<Vec<u8>>;
}

/// Lookup of the handler responsible for a device.
///
/// Routing from (device type, manufacturer) to a handler is pure and
/// deterministic; `None` means the pair is unsupported and every operation
/// against such a device degrades without any transport call.
pub trait HandlerRegistry: Send + Sync {
    fn handler_for(
        &self,
        device_type: &str,
        manufacturer: &str,
    ) -> Option<Arc<dyn ProtocolHandler>>;
}

/// Table-backed registry for embedders and tests.
///
/// Keys are lowercased on registration and lookup; hardware inventories are
/// inconsistent about manufacturer casing.
#[derive(Default)]
pub struct InMemoryRegistry {
    handlers: HashMap<(String, String), Arc<dyn ProtocolHandler>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        InMemoryRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for one (device type, manufacturer) pair.
    /// Re-registering the same pair replaces the previous handler.
    pub fn register(
        &mut self,
        device_type: impl AsRef<str>,
        manufacturer: impl AsRef<str>,
        handler: Arc<dyn ProtocolHandler>,
    ) {
        self.handlers
            .insert(Self::key(device_type.as_ref(), manufacturer.as_ref()), handler);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn key(device_type: &str, manufacturer: &str) -> (String, String) {
        (
            device_type.trim().to_ascii_lowercase(),
            manufacturer.trim().to_ascii_lowercase(),
        )
    }
}

impl HandlerRegistry for InMemoryRegistry {
    fn handler_for(
        &self,
        device_type: &str,
        manufacturer: &str,
    ) -> Option<Arc<dyn ProtocolHandler>> {
        self.handlers
            .get(&Self::key(device_type, manufacturer))
            .cloned()
    }
}
