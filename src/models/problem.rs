//! Problem model

use sqlx::FromRow;

/// Problem database model
#[derive(Debug, Clone, FromRow)]
pub struct Problem {
    pub contest_id: String,
    pub id: String,
    pub title: String,
    /// Per-test wall clock limit in seconds
    pub time_limit: i32,
    /// Per-test memory limit in MiB
    pub memory_limit: i32,
    pub description: String,
}
