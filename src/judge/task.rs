//! In-memory judge task
//!
//! The bundle the work loop builds from a claimed submission and hands to
//! the controller. Code and test payloads arrive still compressed; the
//! controller decompresses them before the first container is started.

use crate::models::{TestCase, Verdict};

/// Everything needed to judge one submission
#[derive(Debug, Clone)]
pub struct JudgeTask {
    pub contest_id: String,
    pub problem_id: String,
    pub id: i64,
    pub user_id: String,
    pub code: Vec<u8>,
    pub compile_image_name: Option<String>,
    pub test_image_name: String,
    /// Per-test wall clock limit in seconds
    pub time_limit: u32,
    /// Per-test memory limit in MiB
    pub memory_limit: u32,
    /// Set by the controller when a compile phase succeeds
    pub compile_time_ms: Option<f64>,
    /// Tests to execute this round, already filtered for resumption
    pub tests: Vec<TestItem>,
    /// Results kept from an interrupted earlier round; they take part in
    /// the final aggregation but are never re-executed
    pub prior_records: Vec<TestRecord>,
}

/// Verdict and measurements of one executed test
#[derive(Debug, Clone, Copy)]
pub struct TestRecord {
    pub status: Verdict,
    pub time_ms: Option<f64>,
    pub memory_kb: Option<i64>,
}

/// One test case carried inside a judge task
#[derive(Debug, Clone)]
pub struct TestItem {
    pub id: String,
    pub input: Vec<u8>,
    pub output: Vec<u8>,
}

impl From<TestCase> for TestItem {
    fn from(case: TestCase) -> Self {
        Self {
            id: case.id,
            input: case.input,
            output: case.output,
        }
    }
}
