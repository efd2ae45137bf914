//! Submission repository

use sqlx::PgExecutor;

use crate::{
    error::WorkerResult,
    models::{Submission, Verdict},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Select a submission under row lock for claiming
    pub async fn find_for_update(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        id: i64,
    ) -> WorkerResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE contest_id = $1 AND problem_id = $2 AND id = $3
            FOR UPDATE
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(id)
        .fetch_optional(ex)
        .await?;

        Ok(submission)
    }

    /// Update submission status only
    pub async fn set_status(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        id: i64,
        status: Verdict,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE submissions
            SET status = $4
            WHERE contest_id = $1 AND problem_id = $2 AND id = $3
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(id)
        .bind(status)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Record the final verdict and observed resource maxima
    pub async fn finish(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        problem_id: &str,
        id: i64,
        status: Verdict,
        compile_time_ms: Option<f64>,
        max_time_ms: Option<f64>,
        max_memory_kb: Option<i64>,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE submissions
            SET status = $4,
                compile_time_ms = $5,
                max_time_ms = $6,
                max_memory_kb = $7
            WHERE contest_id = $1 AND problem_id = $2 AND id = $3
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(id)
        .bind(status)
        .bind(compile_time_ms)
        .bind(max_time_ms)
        .bind(max_memory_kb)
        .execute(ex)
        .await?;

        Ok(())
    }
}
