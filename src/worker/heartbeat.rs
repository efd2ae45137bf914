//! Worker liveness heartbeat
//!
//! Refreshes this process's liveness row on a jittered interval and
//! occasionally reaps rows of peers that stopped beating. The sweep is
//! pure garbage collection; nothing else reads the reaped rows.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;

use crate::{
    constants::{
        HEARTBEAT_INTERVAL_SECS, HEARTBEAT_JITTER_SECS, STALE_WORKER_INTERVALS,
        WORKER_SWEEP_PROBABILITY,
    },
    db::repositories::WorkerNodeRepository,
    error::WorkerResult,
    worker::Executor,
};

/// Periodic liveness updater for one worker process
pub struct Heartbeat {
    pool: PgPool,
    executor: Executor,
    hostname: String,
    pid: i32,
    max_processes: i32,
}

impl Heartbeat {
    pub fn new(pool: PgPool, executor: Executor, max_processes: usize) -> Self {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            pool,
            executor,
            hostname,
            pid: std::process::id() as i32,
            max_processes: max_processes as i32,
        }
    }

    /// Insert this worker's liveness row before consuming starts
    pub async fn register(&self) -> WorkerResult<()> {
        WorkerNodeRepository::register(&self.pool, &self.hostname, self.pid, self.max_processes)
            .await?;
        tracing::info!(
            hostname = %self.hostname,
            pid = self.pid,
            max_processes = self.max_processes,
            "worker registered"
        );
        Ok(())
    }

    /// Beat forever; spawned alongside the broker client
    pub async fn run(self) {
        let mut first_tick = true;
        loop {
            tokio::time::sleep(jittered_interval()).await;

            if let Err(e) = WorkerNodeRepository::beat(
                &self.pool,
                &self.hostname,
                self.pid,
                self.executor.processed() as i64,
                self.executor.errors() as i64,
            )
            .await
            {
                tracing::warn!("heartbeat update failed: {}", e);
            }

            let sweep = first_tick || rand::rng().random_range(0.0..1.0) < WORKER_SWEEP_PROBABILITY;
            first_tick = false;
            if sweep {
                let cutoff = Utc::now()
                    - chrono::Duration::seconds(
                        (HEARTBEAT_INTERVAL_SECS * f64::from(STALE_WORKER_INTERVALS)) as i64,
                    );
                match WorkerNodeRepository::reap_stale(&self.pool, cutoff).await {
                    Ok(0) => {}
                    Ok(reaped) => tracing::info!("reaped {} stale worker rows", reaped),
                    Err(e) => tracing::warn!("stale worker sweep failed: {}", e),
                }
            }
        }
    }
}

/// One heartbeat interval with uniform jitter applied
fn jittered_interval() -> Duration {
    let secs = rand::rng().random_range(
        HEARTBEAT_INTERVAL_SECS - HEARTBEAT_JITTER_SECS
            ..=HEARTBEAT_INTERVAL_SECS + HEARTBEAT_JITTER_SECS,
    );
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_interval_stays_in_bounds() {
        for _ in 0..1000 {
            let interval = jittered_interval();
            assert!(interval >= Duration::from_secs_f64(59.0));
            assert!(interval <= Duration::from_secs_f64(61.0));
        }
    }
}
