//! Worker liveness repository

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::error::WorkerResult;

/// Repository for worker liveness rows
pub struct WorkerNodeRepository;

impl WorkerNodeRepository {
    /// Register this worker process, resetting its counters.
    /// An upsert so a restarted process with a recycled pid takes over
    /// its old row.
    pub async fn register(
        ex: impl PgExecutor<'_>,
        hostname: &str,
        pid: i32,
        max_processes: i32,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO worker_nodes
                (hostname, pid, max_processes, startup_time, last_contact, processed, errors)
            VALUES ($1, $2, $3, now(), now(), 0, 0)
            ON CONFLICT (hostname, pid) DO UPDATE
            SET max_processes = EXCLUDED.max_processes,
                startup_time = EXCLUDED.startup_time,
                last_contact = EXCLUDED.last_contact,
                processed = 0,
                errors = 0
            "#,
        )
        .bind(hostname)
        .bind(pid)
        .bind(max_processes)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Refresh last_contact and publish the current counters
    pub async fn beat(
        ex: impl PgExecutor<'_>,
        hostname: &str,
        pid: i32,
        processed: i64,
        errors: i64,
    ) -> WorkerResult<()> {
        sqlx::query(
            r#"
            UPDATE worker_nodes
            SET last_contact = now(), processed = $3, errors = $4
            WHERE hostname = $1 AND pid = $2
            "#,
        )
        .bind(hostname)
        .bind(pid)
        .bind(processed)
        .bind(errors)
        .execute(ex)
        .await?;

        Ok(())
    }

    /// Delete rows whose last contact is older than the cutoff.
    /// Returns the number of reaped peers.
    pub async fn reap_stale(
        ex: impl PgExecutor<'_>,
        cutoff: DateTime<Utc>,
    ) -> WorkerResult<u64> {
        let result = sqlx::query(r#"DELETE FROM worker_nodes WHERE last_contact < $1"#)
            .bind(cutoff)
            .execute(ex)
            .await?;

        Ok(result.rows_affected())
    }
}
