//! IceJudge - Worker Entry Point
//!
//! Boots one judge worker: storage, Docker, heartbeat, then the broker
//! consume loop, which runs until the process is killed.

use bollard::Docker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icejudge::{
    broker::BrokerClient,
    config::Config,
    db,
    worker::{Executor, Heartbeat, WorkerContext},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "icejudge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting IceJudge worker ({} judge slots)...",
        config.judge.max_processes
    );

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;
    db::test_connection(&pool).await?;
    db::ensure_schema(&pool).await?;

    // Initialize Docker client
    tracing::info!("Connecting to Docker...");
    let docker = Docker::connect_with_socket_defaults()?;
    let docker_info = docker.version().await?;
    tracing::info!(
        "Connected to Docker version: {}",
        docker_info.version.unwrap_or_default()
    );

    let executor = Executor::new(config.judge.max_processes);

    // Liveness row and heartbeat
    let heartbeat = Heartbeat::new(pool.clone(), executor.clone(), config.judge.max_processes);
    heartbeat.register().await?;
    tokio::spawn(heartbeat.run());

    // Consume the judge queue until killed
    let context = WorkerContext {
        pool,
        docker,
        executor,
    };
    let prefetch = u16::try_from(config.judge.max_processes).unwrap_or(u16::MAX);
    let client = BrokerClient::new(config.broker.url.clone(), prefetch);
    client.run(context).await;

    Ok(())
}
