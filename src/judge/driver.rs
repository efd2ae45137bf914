//! Sandbox driver interface
//!
//! A driver owns the sandbox lifecycle for one judge task: one container
//! per phase, started by `prepare` and killed by `teardown` whether or not
//! a phase succeeded. The Docker driver is the reference implementation;
//! the controller only sees this interface, which keeps it testable with
//! scripted drivers.

use async_trait::async_trait;

use crate::{
    error::WorkerResult,
    judge::{
        protocol::{AgentCompilationResult, AgentError, AgentTestResult},
        task::{JudgeTask, TestItem},
    },
    models::Verdict,
};

/// Outcome of the compile phase
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    /// The agent produced a binary; judging proceeds with it
    Compiled(AgentCompilationResult),
    /// The agent rejected the code; the verdict applies to the submission
    Rejected(Verdict),
}

/// One agent reply for a single test, with error kinds already resolved
#[derive(Debug, Clone)]
pub enum AgentReply {
    /// The program ran; correctness is decided by the controller
    Completed(AgentTestResult),
    /// The agent reported a terminal failure for this test
    Failed {
        verdict: Verdict,
        time: Option<f64>,
        memory_bytes: Option<u64>,
    },
}

impl From<AgentError> for AgentReply {
    fn from(err: AgentError) -> Self {
        // An unrecognized kind means the agent and worker disagree on the
        // protocol; the test is charged to the system, not the contestant.
        let verdict = Verdict::from_kind(&err.kind).unwrap_or(Verdict::InternalError);
        AgentReply::Failed {
            verdict,
            time: err.time,
            memory_bytes: err.memory_bytes,
        }
    }
}

/// Callbacks invoked by the driver while tests run
#[async_trait]
pub trait TestObserver: Send {
    /// A test is about to be streamed to the agent
    async fn on_start(&mut self, test_id: &str) -> WorkerResult<()>;

    /// The agent answered for one test
    async fn on_result(&mut self, test: &TestItem, reply: AgentReply) -> WorkerResult<()>;
}

/// Driver for one judge task's sandboxes
#[async_trait]
pub trait JudgeDriver: Send {
    /// Start one sandbox per phase the task needs
    async fn prepare(&mut self, task: &JudgeTask) -> WorkerResult<()>;

    /// Run the compile phase; only called when the task has a compile image
    async fn compile(&mut self, task: &JudgeTask) -> WorkerResult<CompileOutcome>;

    /// Stream the task's tests to the agent in order, reporting each reply
    async fn run_tests(
        &mut self,
        task: &JudgeTask,
        observer: &mut dyn TestObserver,
    ) -> WorkerResult<()>;

    /// Kill every sandbox this driver started
    async fn teardown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_kinds_resolve_case_insensitively() {
        let reply = AgentReply::from(AgentError {
            kind: "timelimitexceeded".to_string(),
            time: Some(2.0),
            memory_bytes: None,
        });
        match reply {
            AgentReply::Failed { verdict, time, .. } => {
                assert_eq!(verdict, Verdict::TimeLimitExceeded);
                assert_eq!(time, Some(2.0));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_agent_kind_becomes_internal_error() {
        let reply = AgentReply::from(AgentError {
            kind: "SegmentationFault".to_string(),
            time: None,
            memory_bytes: Some(1024),
        });
        match reply {
            AgentReply::Failed {
                verdict,
                memory_bytes,
                ..
            } => {
                assert_eq!(verdict, Verdict::InternalError);
                assert_eq!(memory_bytes, Some(1024));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
