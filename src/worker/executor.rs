//! Bounded judge task executor
//!
//! A fixed number of slots run judge tasks concurrently; each slot gets
//! its own driver instance and draws its database connection from the
//! pool sized to the slot count. The broker delivery is acknowledged only
//! from a task's completion, which is what makes redelivery-after-crash
//! work.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use bollard::Docker;
use lapin::{message::Delivery, options::BasicAckOptions};
use sqlx::PgPool;
use tokio::sync::Semaphore;

use crate::{
    judge::{DockerJudgeDriver, JudgeTask, controller},
    models::Verdict,
};

/// Fixed-size pool of judge slots
#[derive(Clone)]
pub struct Executor {
    slots: Arc<Semaphore>,
    processed: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl Executor {
    /// Create an executor with the given number of slots
    pub fn new(slots: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(slots)),
            processed: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Tasks completed since startup, successful or not
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Tasks that errored or finished as InternalError
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Run the task on a free slot, waiting for one if all are busy.
    ///
    /// The spawned task judges to completion, updates the counters, and
    /// acks the delivery last.
    pub async fn submit(&self, pool: PgPool, docker: Docker, task: JudgeTask, delivery: Delivery) {
        let Ok(permit) = self.slots.clone().acquire_owned().await else {
            // Only possible if the semaphore is closed, which never happens
            tracing::error!("executor slot acquisition failed");
            return;
        };
        let processed = self.processed.clone();
        let errors = self.errors.clone();

        tokio::spawn(async move {
            let _permit = permit;

            let mut driver = DockerJudgeDriver::new(docker);
            let outcome = controller::run(&pool, &mut driver, task).await;

            processed.fetch_add(1, Ordering::Relaxed);
            match &outcome {
                Ok(verdict) if *verdict != Verdict::InternalError => {}
                _ => {
                    errors.fetch_add(1, Ordering::Relaxed);
                }
            }

            if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                tracing::error!("failed to ack delivery: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let executor = Executor::new(4);
        assert_eq!(executor.processed(), 0);
        assert_eq!(executor.errors(), 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let executor = Executor::new(1);
        let clone = executor.clone();
        executor.processed.fetch_add(3, Ordering::Relaxed);
        executor.errors.fetch_add(1, Ordering::Relaxed);
        assert_eq!(clone.processed(), 3);
        assert_eq!(clone.errors(), 1);
    }
}
