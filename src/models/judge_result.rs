//! Per-test judge result model

use sqlx::FromRow;

use super::Verdict;

/// One row per (submission, test case)
///
/// Created with status Waiting when the submission is claimed; afterwards
/// mutated only by the judge controller that owns the submission.
#[derive(Debug, Clone, FromRow)]
pub struct JudgeResult {
    pub contest_id: String,
    pub problem_id: String,
    pub submission_id: i64,
    pub test_id: String,
    pub status: Verdict,
    pub time_ms: Option<f64>,
    pub memory_kb: Option<i64>,
}
