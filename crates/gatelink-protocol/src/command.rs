//! Abstract operation → concrete command message.
//!
//! Each orchestrator operation maps to one command verb per device family:
//!
//! | Operation        | Access               | Attendance              | Consume               | Generic              |
//! |------------------|----------------------|-------------------------|-----------------------|----------------------|
//! | SyncUser         | ADD_USER             | ADD_USER                | ADD_ACCOUNT           | SYNC_USER            |
//! | RevokeUser       | DELETE_USER          | DELETE_USER             | DISABLE_ACCOUNT       | REVOKE_USER          |
//! | QueryUsers       | QUERY_USER_LIST      | QUERY_USER_LIST         | QUERY_ACCOUNT_LIST    | QUERY_USER_LIST      |
//! | ConfigAttributes | CONFIG_ACCESS_PARAMS | CONFIG_ATTENDANCE_RULES | CONFIG_CONSUME_PARAMS | CONFIG_DEVICE_PARAMS |
//! | HealthCheck      | PING                 | QUERY_STATUS            | TEST_CONNECTION       | HEALTH_CHECK         |
//! | MetricsQuery     | QUERY_PERFORMANCE    | QUERY_STATISTICS        | QUERY_RUNTIME_STATUS  | QUERY_METRICS        |
//!
//! The family is detected from the handler's protocol tag prefix. Tags that
//! match no family fall back to the family of the directory's device-type
//! string, and finally to the generic column. Building never fails.

use crate::message::ProtocolMessage;
use gatelink_core::constants::*;
use gatelink_core::{Device, DeviceFamily};
use serde_json::{Map, Value};

/// The six device-facing operations of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SyncUser,
    RevokeUser,
    QueryUsers,
    ConfigAttributes,
    HealthCheck,
    MetricsQuery,
}

impl CommandKind {
    /// Verb for a resolved family; `None` selects the generic column.
    #[must_use]
    pub fn verb(self, family: Option<DeviceFamily>) -> &'static str {
        use DeviceFamily::*;
        match (self, family) {
            (CommandKind::SyncUser, Some(Access | Attendance)) => VERB_ADD_USER,
            (CommandKind::SyncUser, Some(Consume)) => VERB_ADD_ACCOUNT,
            (CommandKind::SyncUser, None) => VERB_SYNC_USER,

            (CommandKind::RevokeUser, Some(Access | Attendance)) => VERB_DELETE_USER,
            (CommandKind::RevokeUser, Some(Consume)) => VERB_DISABLE_ACCOUNT,
            (CommandKind::RevokeUser, None) => VERB_REVOKE_USER,

            (CommandKind::QueryUsers, Some(Access | Attendance) | None) => VERB_QUERY_USER_LIST,
            (CommandKind::QueryUsers, Some(Consume)) => VERB_QUERY_ACCOUNT_LIST,

            (CommandKind::ConfigAttributes, Some(Access)) => VERB_CONFIG_ACCESS_PARAMS,
            (CommandKind::ConfigAttributes, Some(Attendance)) => VERB_CONFIG_ATTENDANCE_RULES,
            (CommandKind::ConfigAttributes, Some(Consume)) => VERB_CONFIG_CONSUME_PARAMS,
            (CommandKind::ConfigAttributes, None) => VERB_CONFIG_DEVICE_PARAMS,

            (CommandKind::HealthCheck, Some(Access)) => VERB_PING,
            (CommandKind::HealthCheck, Some(Attendance)) => VERB_QUERY_STATUS,
            (CommandKind::HealthCheck, Some(Consume)) => VERB_TEST_CONNECTION,
            (CommandKind::HealthCheck, None) => VERB_HEALTH_CHECK,

            (CommandKind::MetricsQuery, Some(Access)) => VERB_QUERY_PERFORMANCE,
            (CommandKind::MetricsQuery, Some(Attendance)) => VERB_QUERY_STATISTICS,
            (CommandKind::MetricsQuery, Some(Consume)) => VERB_QUERY_RUNTIME_STATUS,
            (CommandKind::MetricsQuery, None) => VERB_QUERY_METRICS,
        }
    }
}

/// Resolve the verb for a command against a device.
///
/// Protocol tag first, device-type string second, generic column last.
#[must_use]
pub fn resolve_verb(kind: CommandKind, protocol_type: &str, device_type: &str) -> &'static str {
    let family = DeviceFamily::detect(protocol_type).or_else(|| DeviceFamily::detect(device_type));
    kind.verb(family)
}

/// Build the outbound command envelope for one operation.
///
/// Pure construction: no I/O, no failure. The caller-provided `data` map
/// carries the operation parameters (user id, attribute values).
#[must_use]
pub fn build_command(
    kind: CommandKind,
    device: &Device,
    protocol_type: &str,
    data: Map<String, Value>,
) -> ProtocolMessage {
    let verb = resolve_verb(kind, protocol_type, &device.device_type);
    ProtocolMessage::command(
        device.id.clone(),
        device.code.clone(),
        protocol_type,
        verb,
        data,
    )
}
