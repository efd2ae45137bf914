//! Environment repository

use sqlx::PgExecutor;

use crate::{error::WorkerResult, models::Environment};

/// Repository for language environment rows
pub struct EnvironmentRepository;

impl EnvironmentRepository {
    /// Find environment by ID
    pub async fn find_by_id(
        ex: impl PgExecutor<'_>,
        id: i32,
    ) -> WorkerResult<Option<Environment>> {
        let environment =
            sqlx::query_as::<_, Environment>(r#"SELECT * FROM environments WHERE id = $1"#)
                .bind(id)
                .fetch_optional(ex)
                .await?;

        Ok(environment)
    }
}
