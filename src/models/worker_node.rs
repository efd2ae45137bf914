//! Worker liveness model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Liveness row for one worker process, keyed by (hostname, pid)
///
/// Refreshed by the heartbeat; a row that stops being refreshed is
/// eventually reaped by any live peer.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerNode {
    pub hostname: String,
    pub pid: i32,
    pub max_processes: i32,
    pub startup_time: DateTime<Utc>,
    pub last_contact: DateTime<Utc>,
    pub processed: i64,
    pub errors: i64,
}
