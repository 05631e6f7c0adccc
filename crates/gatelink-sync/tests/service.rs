//! Integration tests for the sync orchestrator.
//!
//! These run [`DeviceSyncService`] against an in-memory directory, a real
//! handler registry holding the JSON mock handler, and a scripted transport
//! double that counts exchanges and records the command verbs it was handed.
//! Together they cover the degradation table, the cache-aside behavior, and
//! the verb-table routing without any real socket.

use gatelink_core::{Device, Error, HealthStatus, Result};
use gatelink_protocol::mock::MockHandler;
use gatelink_protocol::{InMemoryRegistry, MessageStatus, ProtocolHandler, ProtocolMessage};
use gatelink_sync::{DeviceDirectory, DeviceSyncService, InMemoryDirectory};
use gatelink_transport::DeviceTransport;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const ACCESS_TAG: &str = "ACCESS_ENTROPY_V4_8";
const CONSUME_TAG: &str = "CONSUME_ZKTECO_V1_0";

/// What the scripted transport does with each exchange.
#[derive(Clone)]
enum Mode {
    /// Answer with canned response bytes.
    Reply(Vec<u8>),
    /// Device accepted the connection but closed without a byte.
    Empty,
    /// Hold the caller for the duration, then time out.
    Delay(Duration),
    /// Answer with bytes no handler can parse.
    Garbage,
}

/// Transport double: counts calls, records verbs, never touches a socket.
#[derive(Clone)]
struct StubTransport {
    mode: Arc<Mutex<Mode>>,
    calls: Arc<AtomicUsize>,
    verbs: Arc<Mutex<Vec<String>>>,
}

impl StubTransport {
    fn new(mode: Mode) -> Self {
        StubTransport {
            mode: Arc::new(Mutex::new(mode)),
            calls: Arc::new(AtomicUsize::new(0)),
            verbs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn verbs(&self) -> Vec<String> {
        self.verbs.lock().clone()
    }
}

impl DeviceTransport for StubTransport {
    async fn exchange(
        &self,
        _device: &Device,
        command: &ProtocolMessage,
        _handler: &dyn ProtocolHandler,
    ) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verbs.lock().push(command.message_type.clone());

        let mode = self.mode.lock().clone();
        match mode {
            Mode::Reply(bytes) => Ok(bytes),
            Mode::Empty => Err(Error::ResponseEmpty),
            Mode::Delay(wait) => {
                tokio::time::sleep(wait).await;
                Err(Error::ReadTimeout(wait.as_millis() as u64))
            }
            Mode::Garbage => Ok(b"\x02not a message\x03".to_vec()),
        }
    }
}

fn device(id: &str, device_type: &str, manufacturer: &str) -> Device {
    Device {
        id: id.into(),
        code: format!("GL-{id}"),
        name: "Test terminal".into(),
        ip_address: "10.0.0.9".into(),
        port: 4370,
        device_type: device_type.into(),
        manufacturer: manufacturer.into(),
        last_online: None,
    }
}

fn response_bytes(tag: &str, status: MessageStatus, data: Map<String, Value>) -> Vec<u8> {
    let mut msg = ProtocolMessage::command("d-1", "GL-d-1", tag, "ACK", data);
    msg.status = status;
    serde_json::to_vec(&msg).unwrap()
}

fn ok_bytes(tag: &str) -> Vec<u8> {
    let mut data = Map::new();
    data.insert("success".into(), json!(true));
    response_bytes(tag, MessageStatus::Processed, data)
}

fn registry_with(device_type: &str, manufacturer: &str, tag: &str) -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    registry.register(device_type, manufacturer, Arc::new(MockHandler::new(tag)));
    registry
}

/// Service over one registered ACCESS/zkteco device.
fn access_service(
    mode: Mode,
) -> (
    DeviceSyncService<Arc<InMemoryDirectory>, InMemoryRegistry, StubTransport>,
    StubTransport,
    Arc<InMemoryDirectory>,
) {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert(device("d-1", "ACCESS", "zkteco"));
    let transport = StubTransport::new(mode);
    let service = DeviceSyncService::new(
        directory.clone(),
        registry_with("ACCESS", "zkteco", ACCESS_TAG),
        transport.clone(),
    );
    (service, transport, directory)
}

// ---------------------------------------------------------------------------
// Degradation: unsupported protocol means zero transport calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unsupported_protocol_degrades_all_operations_without_dialing() {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert(device("d-1", "ELEVATOR", "acme"));
    let transport = StubTransport::new(Mode::Empty);
    // Registry is empty: no (type, manufacturer) pair is supported.
    let service = DeviceSyncService::new(
        directory.clone(),
        InMemoryRegistry::new(),
        transport.clone(),
    );

    assert!(!service.sync_user("d-1", "u-7", Map::new()).await);
    assert!(!service.revoke_user("d-1", "u-7").await);
    assert!(service.device_users("d-1").await.is_empty());
    assert!(!service.sync_attributes("d-1", Map::new()).await);
    assert_eq!(
        service.check_health("d-1").await.status,
        HealthStatus::Unknown
    );

    let snapshot = service.device_metrics("d-1").await;
    assert_eq!(snapshot.cpu_usage, 0.0);
    assert_eq!(snapshot.memory_usage, 0);
    assert_eq!(snapshot.network_latency_ms, 0.0);
    assert_eq!(snapshot.response_time_ms, 0);
    assert_eq!(snapshot.error_rate, 0.0);

    assert_eq!(transport.calls(), 0, "no handler must mean no transport");
}

#[tokio::test]
async fn test_unknown_device_degrades_without_dialing() {
    let directory = Arc::new(InMemoryDirectory::new());
    let transport = StubTransport::new(Mode::Empty);
    let service = DeviceSyncService::new(
        directory,
        registry_with("ACCESS", "zkteco", ACCESS_TAG),
        transport.clone(),
    );

    assert!(!service.sync_user("ghost", "u-7", Map::new()).await);
    assert!(service.device_users("ghost").await.is_empty());
    assert_eq!(
        service.check_health("ghost").await.status,
        HealthStatus::Unknown,
        "a device that cannot be resolved is unknown, not broken"
    );
    let snapshot = service.device_metrics("ghost").await;
    assert_eq!(snapshot.device_id, "ghost");
    assert_eq!(snapshot.network_latency_ms, 0.0);

    assert_eq!(transport.calls(), 0);
}

// ---------------------------------------------------------------------------
// Verb-table routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_access_family_verbs_reach_the_wire() {
    let (service, transport, _) = access_service(Mode::Reply(ok_bytes(ACCESS_TAG)));

    assert!(service.sync_user("d-1", "u-7", Map::new()).await);
    assert!(service.revoke_user("d-1", "u-7").await);
    let report = service.check_health("d-1").await;
    assert_eq!(report.status, HealthStatus::Healthy);

    assert_eq!(transport.verbs(), vec!["ADD_USER", "DELETE_USER", "PING"]);
}

#[tokio::test]
async fn test_consume_family_verbs_reach_the_wire() {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert(device("d-1", "CONSUME", "zkteco"));
    let transport = StubTransport::new(Mode::Reply(ok_bytes(CONSUME_TAG)));
    let service = DeviceSyncService::new(
        directory,
        registry_with("CONSUME", "zkteco", CONSUME_TAG),
        transport.clone(),
    );

    assert!(service.sync_user("d-1", "u-7", Map::new()).await);
    service.device_metrics("d-1").await;

    assert_eq!(transport.verbs(), vec!["ADD_ACCOUNT", "QUERY_RUNTIME_STATUS"]);
}

#[tokio::test]
async fn test_sync_attributes_uses_config_verb() {
    let (service, transport, _) = access_service(Mode::Reply(ok_bytes(ACCESS_TAG)));

    let mut attributes = Map::new();
    attributes.insert("openDurationSecs".into(), json!(5));
    assert!(service.sync_attributes("d-1", attributes).await);

    assert_eq!(transport.verbs(), vec!["CONFIG_ACCESS_PARAMS"]);
}

// ---------------------------------------------------------------------------
// User list: cache-aside, invalidation, not caching failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_user_list_served_from_cache_within_ttl() {
    let mut data = Map::new();
    data.insert("userList".into(), json!(["7", "19", "23"]));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, transport, _) = access_service(Mode::Reply(bytes));

    let first = service.device_users("d-1").await;
    let second = service.device_users("d-1").await;

    assert_eq!(first, vec!["7", "19", "23"]);
    assert_eq!(second, first);
    assert_eq!(transport.calls(), 1, "second read must be a cache hit");
}

#[tokio::test]
async fn test_user_mutation_invalidates_cached_list() {
    let mut data = Map::new();
    data.insert("userList".into(), json!(["7", "19"]));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, transport, _) = access_service(Mode::Reply(bytes));

    service.device_users("d-1").await;
    assert!(service.sync_user("d-1", "u-23", Map::new()).await);
    service.device_users("d-1").await;

    // Query, mutation, re-query: the list was not served from cache after
    // the sync touched the device.
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        transport.verbs(),
        vec!["QUERY_USER_LIST", "ADD_USER", "QUERY_USER_LIST"]
    );
}

#[tokio::test]
async fn test_failed_mutation_still_invalidates_cached_list() {
    let mut data = Map::new();
    data.insert("userList".into(), json!(["7"]));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, transport, _) = access_service(Mode::Reply(bytes));

    service.device_users("d-1").await;

    // The revoke never gets an answer, but it may still have reached the
    // device, so the cached list is stale either way.
    transport.set_mode(Mode::Empty);
    assert!(!service.revoke_user("d-1", "u-7").await);

    service.device_users("d-1").await;
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_degraded_user_list_is_not_cached() {
    let (service, transport, _) = access_service(Mode::Empty);

    assert!(service.device_users("d-1").await.is_empty());
    assert!(service.device_users("d-1").await.is_empty());

    // Both reads reached the transport: a failed load never populates the
    // cache, so a recovering device is re-queried immediately.
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_account_list_responses_feed_the_same_path() {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert(device("d-1", "CONSUME", "zkteco"));
    let mut data = Map::new();
    data.insert("accountList".into(), json!([7, "19"]));
    let transport = StubTransport::new(Mode::Reply(response_bytes(
        CONSUME_TAG,
        MessageStatus::Processed,
        data,
    )));
    let service = DeviceSyncService::new(
        directory,
        registry_with("CONSUME", "zkteco", CONSUME_TAG),
        transport.clone(),
    );

    assert_eq!(service.device_users("d-1").await, vec!["7", "19"]);
    assert_eq!(transport.verbs(), vec!["QUERY_ACCOUNT_LIST"]);
}

// ---------------------------------------------------------------------------
// Business failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_device_reported_failure_degrades_to_false() {
    let mut data = Map::new();
    data.insert("success".into(), json!(false));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, transport, _) = access_service(Mode::Reply(bytes));

    assert!(!service.sync_user("d-1", "u-7", Map::new()).await);
    assert_eq!(transport.calls(), 1, "the command was still attempted");
}

#[tokio::test]
async fn test_truthy_string_success_is_accepted() {
    let mut data = Map::new();
    data.insert("success".into(), json!("TRUE"));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Failed, data);
    let (service, _, _) = access_service(Mode::Reply(bytes));

    // The explicit flag wins over the failed envelope status.
    assert!(service.sync_user("d-1", "u-7", Map::new()).await);
}

// ---------------------------------------------------------------------------
// Health checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reflects_device_reported_status() {
    let mut data = Map::new();
    data.insert("healthStatus".into(), json!("UNHEALTHY"));
    data.insert("message".into(), json!("door sensor fault"));
    data.insert("success".into(), json!(true));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, _, _) = access_service(Mode::Reply(bytes));

    let report = service.check_health("d-1").await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.message, "door sensor fault");
}

#[tokio::test]
async fn test_health_derives_from_success_bit_when_status_absent() {
    let (service, _, _) = access_service(Mode::Reply(ok_bytes(ACCESS_TAG)));
    assert_eq!(
        service.check_health("d-1").await.status,
        HealthStatus::Healthy
    );

    let mut data = Map::new();
    data.insert("success".into(), json!(false));
    let (service, _, _) = access_service(Mode::Reply(response_bytes(
        ACCESS_TAG,
        MessageStatus::Processed,
        data,
    )));
    assert_eq!(
        service.check_health("d-1").await.status,
        HealthStatus::Unhealthy
    );
}

#[tokio::test]
async fn test_health_transport_failure_is_unhealthy() {
    let (service, _, _) = access_service(Mode::Empty);

    let report = service.check_health("d-1").await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(!report.message.is_empty());
}

#[tokio::test]
async fn test_health_unparseable_response_is_error() {
    let (service, _, _) = access_service(Mode::Garbage);

    let report = service.check_health("d-1").await;
    assert_eq!(report.status, HealthStatus::Error);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_fields_are_coerced_from_the_response() {
    let mut data = Map::new();
    data.insert("cpuUsage".into(), json!(42.5));
    data.insert("memoryUsage".into(), json!("1048576"));
    data.insert("responseTime".into(), json!(12));
    data.insert("errorRate".into(), json!("0.25"));
    let bytes = response_bytes(ACCESS_TAG, MessageStatus::Processed, data);
    let (service, _, _) = access_service(Mode::Reply(bytes));

    let snapshot = service.device_metrics("d-1").await;
    assert_eq!(snapshot.device_id, "d-1");
    assert_eq!(snapshot.cpu_usage, 42.5);
    assert_eq!(snapshot.memory_usage, 1_048_576);
    assert_eq!(snapshot.response_time_ms, 12);
    assert_eq!(snapshot.error_rate, 0.25);
}

#[tokio::test]
async fn test_metrics_timeout_records_the_elapsed_wait() {
    let wait = Duration::from_millis(80);
    let (service, _, _) = access_service(Mode::Delay(wait));

    let snapshot = service.device_metrics("d-1").await;

    // All numeric fields present and zeroed, except the latency, which
    // reflects how long the device was given before the timeout.
    assert_eq!(snapshot.cpu_usage, 0.0);
    assert_eq!(snapshot.memory_usage, 0);
    assert_eq!(snapshot.response_time_ms, 0);
    assert_eq!(snapshot.error_rate, 0.0);
    assert!(
        snapshot.network_latency_ms >= 80.0,
        "latency {} should cover the {}ms wait",
        snapshot.network_latency_ms,
        wait.as_millis()
    );
    assert!(snapshot.network_latency_ms < 5_000.0);
}

// ---------------------------------------------------------------------------
// Heartbeats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_heartbeat_updates_last_online_without_any_transport_call() {
    let (service, transport, directory) = access_service(Mode::Empty);

    let ack = service.process_heartbeat("d-1").await;
    assert!(ack.accepted);

    let refreshed = directory.find_by_id("d-1").await.unwrap();
    assert!(refreshed.last_online.is_some());
    assert_eq!(transport.calls(), 0, "heartbeats never contact the device");
}

#[tokio::test]
async fn test_heartbeat_for_unknown_device_is_rejected() {
    let (service, transport, _) = access_service(Mode::Empty);

    let ack = service.process_heartbeat("ghost").await;
    assert!(!ack.accepted);
    assert!(ack.message.contains("ghost"));
    assert_eq!(transport.calls(), 0);
}
