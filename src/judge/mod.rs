//! Sandbox judging engine
//!
//! Orchestrates compile and test phases inside isolated containers and
//! turns agent replies into persisted verdicts.

pub mod compare;
pub mod controller;
pub mod docker;
pub mod driver;
pub mod protocol;
pub mod task;

pub use docker::DockerJudgeDriver;
pub use driver::{AgentReply, CompileOutcome, JudgeDriver, TestObserver};
pub use task::{JudgeTask, TestItem, TestRecord};
