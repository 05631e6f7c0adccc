use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Processing status carried by a protocol envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MessageStatus {
    Processed,
    Failed,
    Other(String),
}

impl MessageStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MessageStatus::Processed => "PROCESSED",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Other(s) => s,
        }
    }
}

impl From<String> for MessageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PROCESSED" => MessageStatus::Processed,
            "FAILED" => MessageStatus::Failed,
            _ => MessageStatus::Other(s),
        }
    }
}

impl From<MessageStatus> for String {
    fn from(status: MessageStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command/response envelope exchanged with protocol handlers.
///
/// Outbound commands and inbound responses share this shape; they are
/// distinct messages of one request/response exchange, not one mutated
/// value. `data` is a string-keyed map of loosely-typed values because
/// handler families disagree about everything beyond the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub device_id: String,
    pub device_code: String,
    pub protocol_type: String,
    /// Command verb, e.g. `ADD_USER`.
    pub message_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProtocolMessage {
    /// Fresh outbound command envelope.
    #[must_use]
    pub fn command(
        device_id: impl Into<String>,
        device_code: impl Into<String>,
        protocol_type: impl Into<String>,
        message_type: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        ProtocolMessage {
            device_id: device_id.into(),
            device_code: device_code.into(),
            protocol_type: protocol_type.into(),
            message_type: message_type.into(),
            timestamp: Utc::now(),
            data,
            status: MessageStatus::Processed,
            error_code: None,
            error_message: None,
        }
    }

    /// Get a data value by key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether the envelope carries the given data key.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}
