//! Mock protocol handler for testing without hardware.
//!
//! Real handlers implement vendor wire formats outside this workspace. The
//! mock speaks a plain JSON rendition of [`ProtocolMessage`] so transport
//! and orchestrator tests can exercise the full pipeline against canned
//! byte buffers.

use crate::handler::ProtocolHandler;
use crate::message::ProtocolMessage;
use gatelink_core::{Error, Result};

/// JSON-envelope handler with a configurable protocol tag.
pub struct MockHandler {
    protocol_type: String,
    reject_all: bool,
}

impl MockHandler {
    /// Handler that accepts any well-formed envelope of its own protocol.
    #[must_use]
    pub fn new(protocol_type: impl Into<String>) -> Self {
        MockHandler {
            protocol_type: protocol_type.into(),
            reject_all: false,
        }
    }

    /// Handler whose validation rejects everything, for exercising the
    /// invalid-response path.
    #[must_use]
    pub fn rejecting(protocol_type: impl Into<String>) -> Self {
        MockHandler {
            protocol_type: protocol_type.into(),
            reject_all: true,
        }
    }
}

impl ProtocolHandler for MockHandler {
    fn protocol_type(&self) -> &str {
        &self.protocol_type
    }

    fn parse_message(&self, raw: &[u8]) -> Result<ProtocolMessage> {
        serde_json::from_slice(raw).map_err(|e| Error::ResponseUnparseable(e.to_string()))
    }

    fn validate_message(&self, msg: &ProtocolMessage) -> bool {
        !self.reject_all
            && !msg.message_type.is_empty()
            && msg.protocol_type == self.protocol_type
    }

    fn encode_command(&self, msg: &ProtocolMessage) -> Result<Vec<u8>> {
        serde_json::to_vec(msg).map_err(|e| Error::CommandBuild(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn envelope(tag: &str) -> ProtocolMessage {
        let mut data = Map::new();
        data.insert("userId".into(), json!("42"));
        ProtocolMessage::command("d-1", "GL-001", tag, "ADD_USER", data)
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let handler = MockHandler::new("ACCESS_ENTROPY_V4_8");
        let msg = envelope("ACCESS_ENTROPY_V4_8");

        let bytes = handler.encode_command(&msg).unwrap();
        let back = handler.parse_message(&bytes).unwrap();

        assert_eq!(back.device_id, msg.device_id);
        assert_eq!(back.message_type, "ADD_USER");
        assert!(handler.validate_message(&back));
    }

    #[test]
    fn test_validation_requires_matching_tag() {
        let handler = MockHandler::new("ACCESS_ENTROPY_V4_8");
        let foreign = envelope("CONSUME_ZKTECO_V1_0");
        assert!(!handler.validate_message(&foreign));
    }

    #[test]
    fn test_validation_requires_a_verb() {
        let handler = MockHandler::new("ACCESS_ENTROPY_V4_8");
        let mut msg = envelope("ACCESS_ENTROPY_V4_8");
        msg.message_type = String::new();
        assert!(!handler.validate_message(&msg));
    }

    #[test]
    fn test_rejecting_handler() {
        let handler = MockHandler::rejecting("ACCESS_ENTROPY_V4_8");
        let msg = envelope("ACCESS_ENTROPY_V4_8");
        assert!(!handler.validate_message(&msg));
    }

    #[test]
    fn test_parse_garbage_fails() {
        let handler = MockHandler::new("ACCESS_ENTROPY_V4_8");
        assert!(handler.parse_message(b"\x00\x01\x02").is_err());
    }
}
