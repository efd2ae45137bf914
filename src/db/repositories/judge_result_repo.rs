//! Judge result repository

use sqlx::PgExecutor;

use crate::{
    error::WorkerResult,
    models::{JudgeResult, Verdict},
};

/// Repository for per-test judge result rows
pub struct JudgeResultRepository;

impl JudgeResultRepository {
    /// List every result row of a submission
    pub async fn list_for_submission(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        submission_id: i64,
    ) -> WorkerResult<Vec<JudgeResult>> {
        let results = sqlx::query_as::<_, JudgeResult>(
            r#"
            SELECT * FROM judge_results
            WHERE contest_id = $1 AND problem_id = $2 AND submission_id = $3
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(submission_id)
        .fetch_all(ex)
        .await?;

        Ok(results)
    }

    /// Insert a fresh Waiting row for one test of a claimed submission
    pub async fn insert_waiting(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        submission_id: i64,
        test_id: &str,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO judge_results (contest_id, problem_id, submission_id, test_id, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(submission_id)
        .bind(test_id)
        .bind(Verdict::Waiting)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Mark one test as running; single-row write, no submission lock
    pub async fn mark_running(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        submission_id: i64,
        test_id: &str,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE judge_results
            SET status = $5
            WHERE contest_id = $1 AND problem_id = $2
              AND submission_id = $3 AND test_id = $4
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(submission_id)
        .bind(test_id)
        .bind(Verdict::Running)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Record the verdict and measurements of one finished test
    pub async fn record(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        submission_id: i64,
        test_id: &str,
        status: Verdict,
        time_ms: Option<f64>,
        memory_kb: Option<i64>,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE judge_results
            SET status = $5, time_ms = $6, memory_kb = $7
            WHERE contest_id = $1 AND problem_id = $2
              AND submission_id = $3 AND test_id = $4
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(submission_id)
        .bind(test_id)
        .bind(status)
        .bind(time_ms)
        .bind(memory_kb)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Set every result row of a submission to the same verdict.
    /// Used when compilation fails before any test runs.
    pub async fn set_all_status(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        submission_id: i64,
        status: Verdict,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE judge_results
            SET status = $4
            WHERE contest_id = $1 AND problem_id = $2 AND submission_id = $3
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(submission_id)
        .bind(status)
        .execute(ex)
        .await?;

        Ok(())
    }
}
