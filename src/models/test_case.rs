//! Test case model

use sqlx::FromRow;

/// Test case database model
///
/// `input` and `output` stay zstandard-compressed at rest. Rows are
/// immutable while their problem is being judged.
#[derive(Debug, Clone, FromRow)]
pub struct TestCase {
    pub contest_id: String,
    pub problem_id: String,
    pub id: String,
    pub input: Vec<u8>,
    pub output: Vec<u8>,
}
