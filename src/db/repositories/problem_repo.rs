//! Problem repository

use sqlx::PgExecutor;

use crate::{error::WorkerResult, models::Problem};

/// Repository for problem rows
pub struct ProblemRepository;

impl ProblemRepository {
    /// Find problem by its composite key
    pub async fn find_by_id(
        ex: impl PgExecutor<'_>,
        contest_id: &str,
        id: &str,
    ) -> WorkerResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"SELECT * FROM problems WHERE contest_id = $1 AND id = $2"#,
        )
        .bind(contest_id)
        .bind(id)
        .fetch_optional(ex)
        .await?;

        Ok(problem)
    }
}
