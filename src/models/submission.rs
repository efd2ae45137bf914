//! Submission model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Verdict;

/// Submission database model
///
/// `code` stays zstandard-compressed at rest; the judge controller
/// decompresses it in memory before talking to the agent.
#[derive(Debug, Clone, FromRow)]
pub struct Submission {
    pub contest_id: String,
    pub problem_id: String,
    pub id: i64,
    pub user_id: String,
    pub code: Vec<u8>,
    pub environment_id: i32,
    pub status: Verdict,
    pub compile_time_ms: Option<f64>,
    pub max_time_ms: Option<f64>,
    pub max_memory_kb: Option<i64>,
    pub created: DateTime<Utc>,
}
