//! Test case repository

use sqlx::PgExecutor;

use crate::{error::WorkerResult, models::TestCase};

/// Repository for test case rows
pub struct TestCaseRepository;

impl TestCaseRepository {
    /// List all test cases of a problem
    pub async fn list_for_problem(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
    ) -> WorkerResult<Vec<TestCase>> {
        let cases = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT * FROM test_cases
            WHERE contest_id = $1 AND problem_id = $2
            ORDER BY id
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .fetch_all(ex)
        .await?;

        Ok(cases)
    }
}
