//! Database connection management and schema bootstrap

use std::time::Duration;

use rand::Rng;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    config::DatabaseConfig,
    constants::{SCHEMA_RETRY_MAX_MS, SCHEMA_RETRY_MIN_MS},
    error::WorkerResult,
};

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Statements creating every table the worker touches
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS environments (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        published BOOLEAN NOT NULL DEFAULT FALSE,
        compile_image_name TEXT,
        test_image_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS problems (
        contest_id TEXT NOT NULL,
        id TEXT NOT NULL,
        title TEXT NOT NULL,
        time_limit INTEGER NOT NULL,
        memory_limit INTEGER NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (contest_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS test_cases (
        contest_id TEXT NOT NULL,
        problem_id TEXT NOT NULL,
        id TEXT NOT NULL,
        input BYTEA NOT NULL,
        output BYTEA NOT NULL,
        PRIMARY KEY (contest_id, problem_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS submissions (
        contest_id TEXT NOT NULL,
        problem_id TEXT NOT NULL,
        id BIGSERIAL,
        user_id TEXT NOT NULL,
        code BYTEA NOT NULL,
        environment_id INTEGER NOT NULL,
        status SMALLINT NOT NULL DEFAULT 0,
        compile_time_ms DOUBLE PRECISION,
        max_time_ms DOUBLE PRECISION,
        max_memory_kb BIGINT,
        created TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (contest_id, problem_id, id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS submissions_contest_problem_idx
        ON submissions (contest_id, problem_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS judge_results (
        contest_id TEXT NOT NULL,
        problem_id TEXT NOT NULL,
        submission_id BIGINT NOT NULL,
        test_id TEXT NOT NULL,
        status SMALLINT NOT NULL DEFAULT 0,
        time_ms DOUBLE PRECISION,
        memory_kb BIGINT,
        PRIMARY KEY (contest_id, problem_id, submission_id, test_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS worker_nodes (
        hostname TEXT NOT NULL,
        pid INTEGER NOT NULL,
        max_processes INTEGER NOT NULL,
        startup_time TIMESTAMPTZ NOT NULL,
        last_contact TIMESTAMPTZ NOT NULL,
        processed BIGINT NOT NULL DEFAULT 0,
        errors BIGINT NOT NULL DEFAULT 0,
        PRIMARY KEY (hostname, pid)
    )
    "#,
];

/// Create all tables on first start.
///
/// Co-starting worker processes race on the DDL; duplicate-object errors
/// are retried with jitter until this process succeeds or a peer finishes
/// the creation.
pub async fn ensure_schema(pool: &PgPool) -> WorkerResult<()> {
    loop {
        match create_tables(pool).await {
            Ok(()) => return Ok(()),
            Err(sqlx::Error::Database(e)) => {
                tracing::warn!("schema creation raced, retrying: {}", e);
                let delay = {
                    let mut rng = rand::rng();
                    rng.random_range(SCHEMA_RETRY_MIN_MS..=SCHEMA_RETRY_MAX_MS)
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
