//! Docker sandbox driver
//!
//! Runs the compile and test agents in locked-down containers and speaks
//! the framed protocol over the containers' stdin/stdout. The attach
//! stream arrives pre-demultiplexed from the daemon's 8-byte chunk
//! framing; only stdout chunks feed the agent frame decoder.

use std::pin::Pin;

use async_trait::async_trait;
use bollard::{
    Docker,
    container::{AttachContainerResults, LogOutput},
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        AttachContainerOptionsBuilder, CreateContainerOptions, KillContainerOptions,
        StartContainerOptions,
    },
};
use futures::{Stream, StreamExt};
use tokio::io::AsyncWrite;

use crate::{
    constants::{
        COMPILE_MEMORY_LIMIT_MIB, COMPILE_TIME_LIMIT_SECS, OUTPUT_LIMIT_MIB, SANDBOX_PIDS_LIMIT,
    },
    error::{WorkerError, WorkerResult},
    judge::{
        driver::{AgentReply, CompileOutcome, JudgeDriver, TestObserver},
        protocol::{self, AgentRequest, AgentResponse, FrameBuffer},
        task::JudgeTask,
    },
    models::Verdict,
};

const MIB: i64 = 1024 * 1024;

/// Docker-backed judge driver; one instance per executor slot
pub struct DockerJudgeDriver {
    docker: Docker,
    compile_container: Option<String>,
    test_container: Option<String>,
}

impl DockerJudgeDriver {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            compile_container: None,
            test_container: None,
        }
    }

    /// Create and start one locked-down sandbox container
    async fn start_sandbox(
        &self,
        image: &str,
        memory_bytes: i64,
        pids_limit: Option<i64>,
    ) -> WorkerResult<String> {
        let host_config = HostConfig {
            memory: Some(memory_bytes),
            // Swap limit matches the memory limit, so no swap headroom
            memory_swap: Some(memory_bytes),
            pids_limit,
            cap_drop: Some(vec!["ALL".to_string()]),
            auto_remove: Some(true),
            ..Default::default()
        };

        let config = ContainerCreateBody {
            image: Some(image.to_string()),
            open_stdin: Some(true),
            network_disabled: Some(true),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container = self
            .docker
            .create_container(None::<CreateContainerOptions>, config)
            .await?;
        self.docker
            .start_container(&container.id, None::<StartContainerOptions>)
            .await?;

        Ok(container.id)
    }

    /// Attach to a sandbox and wrap the raw streams into a framed channel
    async fn attach(&self, container_id: &str) -> WorkerResult<AgentChannel> {
        let options = AttachContainerOptionsBuilder::default()
            .stdin(true)
            .stdout(true)
            .stream(true)
            .build();
        let attached = self
            .docker
            .attach_container(container_id, Some(options))
            .await?;
        Ok(AgentChannel::new(attached))
    }
}

#[async_trait]
impl JudgeDriver for DockerJudgeDriver {
    async fn prepare(&mut self, task: &JudgeTask) -> WorkerResult<()> {
        if let Some(image) = &task.compile_image_name {
            let id = self
                .start_sandbox(image, i64::from(COMPILE_MEMORY_LIMIT_MIB) * MIB, None)
                .await?;
            self.compile_container = Some(id);
        }

        let id = self
            .start_sandbox(
                &task.test_image_name,
                i64::from(task.memory_limit) * MIB,
                Some(SANDBOX_PIDS_LIMIT),
            )
            .await?;
        self.test_container = Some(id);

        Ok(())
    }

    async fn compile(&mut self, task: &JudgeTask) -> WorkerResult<CompileOutcome> {
        let container_id = self
            .compile_container
            .clone()
            .ok_or_else(|| WorkerError::Protocol("compile sandbox not prepared".to_string()))?;

        let mut channel = self.attach(&container_id).await?;
        channel
            .send(&AgentRequest::Compilation {
                code: task.code.clone(),
                time_limit: COMPILE_TIME_LIMIT_SECS,
                memory_limit: COMPILE_MEMORY_LIMIT_MIB,
            })
            .await?;

        // Anything other than a well-formed Compilation reply, including
        // the agent closing stdout, rejects the submission.
        match channel.recv().await {
            Ok(AgentResponse::Compilation(result)) => Ok(CompileOutcome::Compiled(result)),
            Ok(other) => {
                tracing::warn!("unexpected compile reply: {:?}", other);
                Ok(CompileOutcome::Rejected(Verdict::CompilationError))
            }
            Err(e) => {
                tracing::warn!("compile agent failed: {}", e);
                Ok(CompileOutcome::Rejected(Verdict::CompilationError))
            }
        }
    }

    async fn run_tests(
        &mut self,
        task: &JudgeTask,
        observer: &mut dyn TestObserver,
    ) -> WorkerResult<()> {
        let container_id = self
            .test_container
            .clone()
            .ok_or_else(|| WorkerError::Protocol("test sandbox not prepared".to_string()))?;

        let mut channel = self.attach(&container_id).await?;
        channel
            .send(&AgentRequest::Preparation {
                code: task.code.clone(),
                time_limit: task.time_limit,
                memory_limit: task.memory_limit,
                output_limit: OUTPUT_LIMIT_MIB,
            })
            .await?;

        for test in &task.tests {
            observer.on_start(&test.id).await?;
            channel
                .send(&AgentRequest::Test {
                    input: test.input.clone(),
                })
                .await?;
            let reply = match channel.recv().await? {
                AgentResponse::Test(result) => AgentReply::Completed(result),
                AgentResponse::Error(err) => AgentReply::from(err),
                AgentResponse::Compilation(_) => {
                    return Err(WorkerError::Protocol(
                        "unexpected Compilation frame during tests".to_string(),
                    ));
                }
            };
            observer.on_result(test, reply).await?;
        }

        Ok(())
    }

    async fn teardown(&mut self) {
        for container_id in [self.compile_container.take(), self.test_container.take()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = self
                .docker
                .kill_container(&container_id, None::<KillContainerOptions>)
                .await
            {
                // Normal when the container already exited and auto-removed
                tracing::debug!("kill of sandbox {} failed: {}", container_id, e);
            }
        }
    }
}

/// Framed bidirectional channel to one in-container agent
struct AgentChannel {
    input: Pin<Box<dyn AsyncWrite + Send>>,
    output: Pin<Box<dyn Stream<Item = Result<LogOutput, bollard::errors::Error>> + Send>>,
    frames: FrameBuffer,
}

impl AgentChannel {
    fn new(attached: AttachContainerResults) -> Self {
        Self {
            input: attached.input,
            output: attached.output,
            frames: FrameBuffer::new(),
        }
    }

    async fn send(&mut self, message: &AgentRequest) -> WorkerResult<()> {
        protocol::write_frame(&mut self.input, message).await
    }

    async fn recv(&mut self) -> WorkerResult<AgentResponse> {
        loop {
            if let Some(frame) = self.frames.next_frame()? {
                return Ok(frame);
            }
            match self.output.next().await {
                Some(Ok(LogOutput::StdOut { message })) => self.frames.extend(&message),
                // Stderr and console chunks are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(WorkerError::AgentClosed),
            }
        }
    }
}
