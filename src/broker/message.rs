//! Queue message codec
//!
//! The submission producer and the worker must agree byte-for-byte on the
//! body format of `judge_queue` messages. The body is a JSON object with
//! exactly the submission's composite key; anything else is treated as
//! malformed and dropped by the work loop.

use serde::{Deserialize, Serialize};

/// Notification that a submission is ready to be judged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub contest_id: String,
    pub problem_id: String,
    pub submission_id: i64,
}

impl JudgeRequest {
    /// Encode the request as a queue message body
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode a queue message body
    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let request = JudgeRequest {
            contest_id: "abc000".to_string(),
            problem_id: "A".to_string(),
            submission_id: 42,
        };
        let body = request.encode().unwrap();
        assert_eq!(JudgeRequest::decode(&body).unwrap(), request);
    }

    #[test]
    fn test_malformed_bodies_are_rejected() {
        assert!(JudgeRequest::decode(b"").is_err());
        assert!(JudgeRequest::decode(b"not json").is_err());
        assert!(JudgeRequest::decode(b"{\"contest_id\":\"c\"}").is_err());
        assert!(
            JudgeRequest::decode(b"{\"contest_id\":\"c\",\"problem_id\":\"p\",\"submission_id\":\"x\"}")
                .is_err()
        );
    }
}
