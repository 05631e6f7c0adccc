//! The device sync orchestrator.
//!
//! [`DeviceSyncService`] owns the never-throw contract of the dispatcher:
//! its public operations always return a typed result, and every failure
//! underneath — missing device, unsupported protocol, transport timeout,
//! unparseable response, device-reported failure — is converted into the
//! operation's documented degraded value. The error kind still reaches the
//! logs as a structured field, so operators can tell an unprovisioned
//! device from a flaky one without an exception trace.
//!
//! Degradation table:
//!
//! | Operation         | Device absent | Handler absent | Transport/parse failure |
//! |-------------------|---------------|----------------|-------------------------|
//! | `sync_user`       | `false`       | `false`        | `false`                 |
//! | `revoke_user`     | `false`       | `false`        | `false`                 |
//! | `device_users`    | empty list    | empty list     | empty list              |
//! | `sync_attributes` | `false`       | `false`        | `false`                 |
//! | `check_health`    | `UNKNOWN`     | `UNKNOWN`      | `UNHEALTHY` / `ERROR`   |
//! | `device_metrics`  | zeroed        | zeroed         | zeroed, latency = wait  |
//! | `process_heartbeat` | rejected ack | —             | — (no transport call)   |

use crate::cache::UserListCache;
use crate::directory::DeviceDirectory;
use chrono::Utc;
use gatelink_core::constants::{
    KEY_CPU_USAGE, KEY_ERROR_RATE, KEY_MEMORY_USAGE, KEY_MESSAGE, KEY_RESPONSE_TIME, KEY_USER_ID,
};
use gatelink_core::{
    Device, Error, HealthReport, HealthStatus, HeartbeatAck, MetricsSnapshot, Result,
};
use gatelink_protocol::interpret::{
    decode_response, f64_field, health_status, i64_field, is_success, str_field, u64_field,
    user_list,
};
use gatelink_protocol::{CommandKind, HandlerRegistry, ProtocolHandler, ProtocolMessage, build_command};
use gatelink_transport::DeviceTransport;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Uniform device-facing API over heterogeneous terminal protocols.
///
/// One instance serves all devices; operations may run concurrently. The
/// collaborators are generic so tests can substitute counting doubles, and
/// the only state owned here is the per-device user-list cache.
pub struct DeviceSyncService<D, R, T> {
    directory: D,
    registry: R,
    transport: T,
    cache: UserListCache,
}

impl<D, R, T> DeviceSyncService<D, R, T>
where
    D: DeviceDirectory,
    R: HandlerRegistry,
    T: DeviceTransport,
{
    #[must_use]
    pub fn new(directory: D, registry: R, transport: T) -> Self {
        DeviceSyncService {
            directory,
            registry,
            transport,
            cache: UserListCache::new(),
        }
    }

    /// Provision a user on the device.
    ///
    /// `profile` carries the protocol-agnostic user attributes (name, card
    /// number, validity window); the user id is added under the well-known
    /// key. Returns `false` on any failure. The device's cached user list
    /// is invalidated on every completion path — even a failed attempt may
    /// have changed device state.
    pub async fn sync_user(
        &self,
        device_id: &str,
        user_id: &str,
        profile: Map<String, Value>,
    ) -> bool {
        let mut data = profile;
        data.insert(KEY_USER_ID.into(), Value::String(user_id.to_string()));

        let ok = self
            .command_succeeded(CommandKind::SyncUser, device_id, data)
            .await;
        self.cache.invalidate(device_id);
        ok
    }

    /// Remove or disable a user on the device.
    ///
    /// Returns `false` on any failure. Invalidates the cached user list the
    /// same way [`DeviceSyncService::sync_user`] does.
    pub async fn revoke_user(&self, device_id: &str, user_id: &str) -> bool {
        let mut data = Map::new();
        data.insert(KEY_USER_ID.into(), Value::String(user_id.to_string()));

        let ok = self
            .command_succeeded(CommandKind::RevokeUser, device_id, data)
            .await;
        self.cache.invalidate(device_id);
        ok
    }

    /// The device's current user identifiers, cache-aside.
    ///
    /// A fresh cached list is served without any transport call. On a miss
    /// the full query pipeline runs; only a successful load is stored, so a
    /// device that failed to answer is re-queried on the next call instead
    /// of serving a cached empty list for the full TTL.
    pub async fn device_users(&self, device_id: &str) -> Vec<String> {
        let Some(device) = self.directory.find_by_id(device_id).await else {
            warn!(
                device_id = %device_id,
                kind = "device_not_found",
                "User list query degraded to empty list"
            );
            return Vec::new();
        };

        self.cache
            .get_or_load(device_id, || async {
                match self.query_user_list(&device).await {
                    Ok(users) => Ok(users),
                    Err(err) => {
                        warn!(
                            device_id = %device.id,
                            kind = err.kind(),
                            error = %err,
                            "User list query degraded to empty list"
                        );
                        Err(err)
                    }
                }
            })
            .await
    }

    /// Push business attributes (access params, attendance rules, consume
    /// params) to the device. Returns `false` on any failure.
    pub async fn sync_attributes(&self, device_id: &str, attributes: Map<String, Value>) -> bool {
        self.command_succeeded(CommandKind::ConfigAttributes, device_id, attributes)
            .await
    }

    /// One health probe against the device.
    ///
    /// Never fails: a device or handler that cannot be resolved reports
    /// `UNKNOWN`, a transport failure reports `UNHEALTHY`, and a response
    /// the handler could not make sense of reports `ERROR`. A parsed
    /// response carries the device's own `healthStatus` when present,
    /// otherwise the success bit decides between healthy and unhealthy.
    pub async fn check_health(&self, device_id: &str) -> HealthReport {
        let (device, handler) = match self.resolve(device_id).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(device_id = %device_id, kind = err.kind(), error = %err, "Health check could not run");
                return HealthReport::unknown(device_id, err.to_string());
            }
        };

        let started = Instant::now();
        match self
            .run(CommandKind::HealthCheck, &device, &handler, Map::new())
            .await
        {
            Ok(response) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let status = health_status(&response).unwrap_or(if is_success(&response) {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy
                });
                HealthReport {
                    device_id: device.id,
                    status,
                    checked_at: Utc::now(),
                    response_time_ms: elapsed_ms,
                    message: str_field(&response, KEY_MESSAGE),
                }
            }
            Err(err) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let status = match err {
                    Error::ResponseUnparseable(_) | Error::ResponseInvalid(_) => {
                        HealthStatus::Error
                    }
                    _ => HealthStatus::Unhealthy,
                };
                warn!(device_id = %device.id, kind = err.kind(), error = %err, "Health check failed");
                HealthReport {
                    device_id: device.id,
                    status,
                    checked_at: Utc::now(),
                    response_time_ms: elapsed_ms,
                    message: err.to_string(),
                }
            }
        }
    }

    /// One metrics query against the device.
    ///
    /// Never fails: every numeric field is always present. Degraded
    /// snapshots are zeroed, except that a transport or parse failure
    /// records the elapsed wait as the network latency so dashboards can
    /// see how long the device was given.
    pub async fn device_metrics(&self, device_id: &str) -> MetricsSnapshot {
        let (device, handler) = match self.resolve(device_id).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(device_id = %device_id, kind = err.kind(), error = %err, "Metrics query could not run");
                return MetricsSnapshot::zeroed(device_id);
            }
        };

        let started = Instant::now();
        match self
            .run(CommandKind::MetricsQuery, &device, &handler, Map::new())
            .await
        {
            Ok(response) => MetricsSnapshot {
                device_id: device.id,
                cpu_usage: f64_field(&response, KEY_CPU_USAGE),
                memory_usage: i64_field(&response, KEY_MEMORY_USAGE),
                network_latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                response_time_ms: u64_field(&response, KEY_RESPONSE_TIME),
                error_rate: f64_field(&response, KEY_ERROR_RATE),
                updated_at: Utc::now(),
            },
            Err(err) => {
                warn!(device_id = %device.id, kind = err.kind(), error = %err, "Metrics query failed");
                let mut snapshot = MetricsSnapshot::zeroed(device.id);
                snapshot.network_latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                snapshot
            }
        }
    }

    /// Record a device heartbeat.
    ///
    /// Optimistic: the directory's `last_online` is stamped before anything
    /// else, and the device itself is never contacted. The only failures
    /// are an unknown device id and a directory that refuses the write.
    pub async fn process_heartbeat(&self, device_id: &str) -> HeartbeatAck {
        let now = Utc::now();
        let Some(mut device) = self.directory.find_by_id(device_id).await else {
            warn!(device_id = %device_id, kind = "device_not_found", "Heartbeat from unknown device");
            return HeartbeatAck {
                device_id: device_id.to_string(),
                accepted: false,
                received_at: now,
                message: Error::DeviceNotFound(device_id.to_string()).to_string(),
            };
        };

        device.last_online = Some(now);
        let accepted = self.directory.update(&device).await;
        if !accepted {
            warn!(device_id = %device.id, "Directory refused the last-online update");
        }
        debug!(device_id = %device.id, accepted, "Heartbeat processed");

        HeartbeatAck {
            device_id: device.id,
            accepted,
            received_at: now,
            message: if accepted {
                "heartbeat recorded".to_string()
            } else {
                "directory refused the last-online update".to_string()
            },
        }
    }

    // Pipeline internals. Everything below returns Result; the public
    // operations above are the only place errors become degraded values.

    async fn resolve(&self, device_id: &str) -> Result<(Device, Arc<dyn ProtocolHandler>)> {
        let device = self
            .directory
            .find_by_id(device_id)
            .await
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
        let handler = self.handler_for(&device)?;
        Ok((device, handler))
    }

    fn handler_for(&self, device: &Device) -> Result<Arc<dyn ProtocolHandler>> {
        self.registry
            .handler_for(&device.device_type, &device.manufacturer)
            .ok_or_else(|| Error::ProtocolUnsupported {
                device_type: device.device_type.clone(),
                manufacturer: device.manufacturer.clone(),
            })
    }

    /// Build, exchange, decode. One transport call at most.
    async fn run(
        &self,
        kind: CommandKind,
        device: &Device,
        handler: &Arc<dyn ProtocolHandler>,
        data: Map<String, Value>,
    ) -> Result<ProtocolMessage> {
        let command = build_command(kind, device, handler.protocol_type(), data);
        debug!(
            device_id = %device.id,
            verb = %command.message_type,
            protocol = %command.protocol_type,
            "Dispatching device command"
        );
        let raw = self.transport.exchange(device, &command, handler.as_ref()).await?;
        decode_response(handler.as_ref(), &raw)
    }

    async fn query_user_list(&self, device: &Device) -> Result<Vec<String>> {
        let handler = self.handler_for(device)?;
        let response = self
            .run(CommandKind::QueryUsers, device, &handler, Map::new())
            .await?;
        Ok(user_list(&response))
    }

    /// Full pipeline for a boolean operation, reduced to its success bit.
    async fn command_succeeded(
        &self,
        kind: CommandKind,
        device_id: &str,
        data: Map<String, Value>,
    ) -> bool {
        let outcome = async {
            let (device, handler) = self.resolve(device_id).await?;
            let response = self.run(kind, &device, &handler, data).await?;
            require_success(response)
        }
        .await;

        match outcome {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    device_id = %device_id,
                    command = ?kind,
                    kind = err.kind(),
                    error = %err,
                    "Device command degraded to failure"
                );
                false
            }
        }
    }
}

/// Lift a device-reported failure into the error taxonomy so it shows up
/// in logs as `business_failure` rather than blending into transport noise.
fn require_success(response: ProtocolMessage) -> Result<()> {
    if is_success(&response) {
        return Ok(());
    }
    let message = response
        .error_message
        .clone()
        .unwrap_or_else(|| str_field(&response, KEY_MESSAGE));
    Err(Error::BusinessFailure {
        code: response.error_code.unwrap_or_default(),
        message,
    })
}
