//! Application-wide constants
//!
//! This module contains all constant values used throughout the worker.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// BROKER
// =============================================================================

/// Queue the submission producer publishes judge requests to
pub const JUDGE_QUEUE: &str = "judge_queue";

/// Consumer tag announced to the broker
pub const CONSUMER_TAG: &str = "icejudge-worker";

/// Lower bound of the randomized reconnect delay in seconds
pub const RECONNECT_DELAY_MIN_SECS: f64 = 1.0;

/// Upper bound of the randomized reconnect delay in seconds
pub const RECONNECT_DELAY_MAX_SECS: f64 = 5.0;

// =============================================================================
// SANDBOX
// =============================================================================

/// Memory limit for the compile sandbox in MiB
pub const COMPILE_MEMORY_LIMIT_MIB: u32 = 1024;

/// Compile time cap in seconds, enforced by the agent
pub const COMPILE_TIME_LIMIT_SECS: u32 = 60;

/// Output limit announced to the test agent in MiB
pub const OUTPUT_LIMIT_MIB: u32 = 16;

/// PID limit for the test sandbox; sized for multi-threaded runtimes
pub const SANDBOX_PIDS_LIMIT: i64 = 20;

/// Upper bound on a single agent frame payload
pub const MAX_AGENT_FRAME_BYTES: usize = 64 * 1024 * 1024;

// =============================================================================
// HEARTBEAT
// =============================================================================

/// Nominal heartbeat interval in seconds
pub const HEARTBEAT_INTERVAL_SECS: f64 = 60.0;

/// Uniform jitter applied to each heartbeat interval in seconds
pub const HEARTBEAT_JITTER_SECS: f64 = 1.0;

/// Probability of sweeping stale worker rows on a given tick
pub const WORKER_SWEEP_PROBABILITY: f64 = 0.01;

/// A worker row older than this many heartbeat intervals is stale
pub const STALE_WORKER_INTERVALS: u32 = 10;

// =============================================================================
// DATABASE
// =============================================================================

/// Lower bound of the schema-creation retry delay in milliseconds
pub const SCHEMA_RETRY_MIN_MS: u64 = 50;

/// Upper bound of the schema-creation retry delay in milliseconds
pub const SCHEMA_RETRY_MAX_MS: u64 = 100;

/// Pool connections kept beyond the judge slots (work loop + heartbeat)
pub const EXTRA_DB_CONNECTIONS: u32 = 2;
