//! Protocol-level constants shared across the dispatcher.
//!
//! Three groups live here:
//!
//! - timing and sizing limits of the single-shot transport contract,
//! - the command verb vocabulary, one column per device family plus the
//!   generic fallback column,
//! - the well-known keys of the loosely-typed `data` map exchanged with
//!   protocol handlers.
//!
//! Changing a verb or a key breaks compatibility with deployed handler
//! implementations, so additions are fine but renames are not.

// ============================================================================
// Transport contract
// ============================================================================

/// Timeout applied separately to the TCP connect and to the single read,
/// in milliseconds. Hardware terminals that have not answered within 10
/// seconds will not answer at all.
pub const EXCHANGE_TIMEOUT_MS: u64 = 10_000;

/// Size of the fixed buffer used for the one response read. Device
/// responses are small; anything past this is silently truncated by the
/// single-read contract.
pub const RESPONSE_BUFFER_SIZE: usize = 4096;

// ============================================================================
// User-list cache
// ============================================================================

/// Age at which a cached device user list stops being served, in seconds.
/// Expiry is checked lazily on read; there is no background eviction.
pub const USER_LIST_TTL_SECS: u64 = 300;

// ============================================================================
// Command verbs — access family
// ============================================================================

pub const VERB_ADD_USER: &str = "ADD_USER";
pub const VERB_DELETE_USER: &str = "DELETE_USER";
pub const VERB_QUERY_USER_LIST: &str = "QUERY_USER_LIST";
pub const VERB_CONFIG_ACCESS_PARAMS: &str = "CONFIG_ACCESS_PARAMS";
pub const VERB_PING: &str = "PING";
pub const VERB_QUERY_PERFORMANCE: &str = "QUERY_PERFORMANCE";

// ============================================================================
// Command verbs — attendance family
// ============================================================================

pub const VERB_CONFIG_ATTENDANCE_RULES: &str = "CONFIG_ATTENDANCE_RULES";
pub const VERB_QUERY_STATUS: &str = "QUERY_STATUS";
pub const VERB_QUERY_STATISTICS: &str = "QUERY_STATISTICS";

// ============================================================================
// Command verbs — consume family
// ============================================================================

pub const VERB_ADD_ACCOUNT: &str = "ADD_ACCOUNT";
pub const VERB_DISABLE_ACCOUNT: &str = "DISABLE_ACCOUNT";
pub const VERB_QUERY_ACCOUNT_LIST: &str = "QUERY_ACCOUNT_LIST";
pub const VERB_CONFIG_CONSUME_PARAMS: &str = "CONFIG_CONSUME_PARAMS";
pub const VERB_TEST_CONNECTION: &str = "TEST_CONNECTION";
pub const VERB_QUERY_RUNTIME_STATUS: &str = "QUERY_RUNTIME_STATUS";

// ============================================================================
// Command verbs — generic fallback
// ============================================================================

pub const VERB_SYNC_USER: &str = "SYNC_USER";
pub const VERB_REVOKE_USER: &str = "REVOKE_USER";
pub const VERB_CONFIG_DEVICE_PARAMS: &str = "CONFIG_DEVICE_PARAMS";
pub const VERB_HEALTH_CHECK: &str = "HEALTH_CHECK";
pub const VERB_QUERY_METRICS: &str = "QUERY_METRICS";

// ============================================================================
// Data-map keys
// ============================================================================

/// Success flag of a response. Boolean, or a truthy string.
pub const KEY_SUCCESS: &str = "success";

/// Primary key for list-bearing responses.
pub const KEY_USER_LIST: &str = "userList";

/// Fallback list key used by consumption terminals.
pub const KEY_ACCOUNT_LIST: &str = "accountList";

/// Identifier of the user a provisioning command targets.
pub const KEY_USER_ID: &str = "userId";

pub const KEY_CPU_USAGE: &str = "cpuUsage";
pub const KEY_MEMORY_USAGE: &str = "memoryUsage";
pub const KEY_RESPONSE_TIME: &str = "responseTime";
pub const KEY_ERROR_RATE: &str = "errorRate";
pub const KEY_HEALTH_STATUS: &str = "healthStatus";
pub const KEY_MESSAGE: &str = "message";
