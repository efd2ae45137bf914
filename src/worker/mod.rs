//! Worker process plumbing
//!
//! The work loop claims submissions delivered by the broker, the executor
//! bounds how many judge tasks run at once, and the heartbeat keeps this
//! process's liveness row fresh.

pub mod executor;
pub mod heartbeat;
pub mod work_loop;

use bollard::Docker;
use sqlx::PgPool;

pub use executor::Executor;
pub use heartbeat::Heartbeat;

/// Shared handles passed to every component of the worker process
#[derive(Clone)]
pub struct WorkerContext {
    pub pool: PgPool,
    pub docker: Docker,
    pub executor: Executor,
}
