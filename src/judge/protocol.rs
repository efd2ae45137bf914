//! Agent wire protocol
//!
//! The driver talks to the in-container agent over the container's
//! stdin/stdout. Each message is one frame: a 32-bit little-endian length
//! followed by that many bytes of a MessagePack-encoded map with string
//! keys (`type` selects the message) and binary-safe values.
//!
//! Requests flow driver → agent (`Compilation`, `Preparation`, `Test`),
//! responses flow agent → driver (`Compilation`, `Test`, `Error`). A
//! `Test` response means the program ran to completion; whether its output
//! is correct is decided by the controller, not the agent.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    constants::MAX_AGENT_FRAME_BYTES,
    error::{WorkerError, WorkerResult},
};

/// Message sent from the driver to the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentRequest {
    /// Compile the submitted source; limits are enforced agent-side
    Compilation {
        #[serde(with = "serde_bytes")]
        code: Vec<u8>,
        time_limit: u32,
        memory_limit: u32,
    },
    /// Announce the program and limits before the first test
    Preparation {
        #[serde(with = "serde_bytes")]
        code: Vec<u8>,
        time_limit: u32,
        memory_limit: u32,
        output_limit: u32,
    },
    /// Execute the program against one test input
    Test {
        #[serde(with = "serde_bytes")]
        input: Vec<u8>,
    },
}

/// Message received from the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentResponse {
    Compilation(AgentCompilationResult),
    Test(AgentTestResult),
    Error(AgentError),
}

/// Successful compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCompilationResult {
    #[serde(with = "serde_bytes")]
    pub binary: Vec<u8>,
    /// Compile time in seconds
    pub time: f64,
}

/// Normal execution of one test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTestResult {
    #[serde(with = "serde_bytes")]
    pub output: Vec<u8>,
    /// Execution time in seconds
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory_bytes: Option<u64>,
}

/// Terminal failure reported by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentError {
    /// Verdict name, matched case-insensitively
    pub kind: String,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory_bytes: Option<u64>,
}

/// Write one length-prefixed frame
pub async fn write_frame<W>(writer: &mut W, message: &AgentRequest) -> WorkerResult<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = rmp_serde::to_vec_named(message)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| WorkerError::Protocol("frame payload exceeds u32 length".to_string()))?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Incremental decoder for length-prefixed agent frames
///
/// The attach stream delivers stdout in arbitrary chunks; bytes are
/// accumulated here until a whole frame is available.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw stdout bytes
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Decode the next complete frame, if one is buffered
    pub fn next_frame(&mut self) -> WorkerResult<Option<AgentResponse>> {
        if self.buf.len() < 4 {
            return Ok(None);
        }
        let len = u32::from_le_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]) as usize;
        if len > MAX_AGENT_FRAME_BYTES {
            return Err(WorkerError::Protocol(format!(
                "agent frame of {} bytes exceeds the {} byte limit",
                len, MAX_AGENT_FRAME_BYTES
            )));
        }
        if self.buf.len() < 4 + len {
            return Ok(None);
        }
        let frame: Vec<u8> = self.buf.drain(..4 + len).skip(4).collect();
        Ok(Some(rmp_serde::from_slice(&frame)?))
    }
}
