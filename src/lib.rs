//! IceJudge - Contest Judging Worker
//!
//! This library provides the judging pipeline of the IceJudge platform,
//! a competitive programming judge system.
//!
//! # Architecture
//!
//! One worker process consumes submission notifications from a message
//! broker, claims each submission in the database, and judges it inside
//! isolated Docker containers:
//!
//! - **Broker**: durable queue connection with bounded prefetch
//! - **Worker**: claim loop, bounded executor, liveness heartbeat
//! - **Judge**: sandbox drivers, agent wire protocol, verdict policy
//! - **Repositories**: database access
//! - **Models**: domain rows and the verdict enumeration

pub mod broker;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod judge;
pub mod models;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use error::{WorkerError, WorkerResult};
