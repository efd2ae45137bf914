//! Judge verdicts
//!
//! The verdict of a submission and of every single test execution share one
//! enumeration. The discriminants are the values carried on the wire and
//! stored in the database, so they must never be reordered or renumbered.

use serde::{Deserialize, Serialize};

/// Verdict of a submission or a single test execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum Verdict {
    Waiting = 0x00,
    Running = 0x01,
    Accepted = 0x10,
    CompilationError = 0x20,
    RuntimeError = 0x21,
    WrongAnswer = 0x22,
    MemoryLimitExceeded = 0x30,
    TimeLimitExceeded = 0x31,
    OutputLimitExceeded = 0x32,
    InternalError = 0xFF,
}

impl Verdict {
    /// All verdicts, used for name lookup
    pub const ALL: &'static [Verdict] = &[
        Self::Waiting,
        Self::Running,
        Self::Accepted,
        Self::CompilationError,
        Self::RuntimeError,
        Self::WrongAnswer,
        Self::MemoryLimitExceeded,
        Self::TimeLimitExceeded,
        Self::OutputLimitExceeded,
        Self::InternalError,
    ];

    /// Aggregation priority when the tests of a submission disagree.
    /// Accepted never wins a mixed set; CompilationError is a pre-test
    /// verdict and cannot appear here.
    pub const PRIORITY: &'static [Verdict] = &[
        Self::InternalError,
        Self::RuntimeError,
        Self::WrongAnswer,
        Self::MemoryLimitExceeded,
        Self::TimeLimitExceeded,
        Self::OutputLimitExceeded,
    ];

    /// Get the verdict name as used in agent error frames
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Running => "Running",
            Self::Accepted => "Accepted",
            Self::CompilationError => "CompilationError",
            Self::RuntimeError => "RuntimeError",
            Self::WrongAnswer => "WrongAnswer",
            Self::MemoryLimitExceeded => "MemoryLimitExceeded",
            Self::TimeLimitExceeded => "TimeLimitExceeded",
            Self::OutputLimitExceeded => "OutputLimitExceeded",
            Self::InternalError => "InternalError",
        }
    }

    /// Look up a verdict by name, case-insensitively
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(kind))
    }

    /// Check if this is a final verdict (judging complete)
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Waiting | Self::Running)
    }

    /// Whether a submission or test with this status must be (re-)judged
    pub fn needs_judging(&self) -> bool {
        matches!(self, Self::Waiting | Self::Running | Self::InternalError)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ordinals() {
        assert_eq!(Verdict::Waiting as i16, 0x00);
        assert_eq!(Verdict::Running as i16, 0x01);
        assert_eq!(Verdict::Accepted as i16, 0x10);
        assert_eq!(Verdict::CompilationError as i16, 0x20);
        assert_eq!(Verdict::RuntimeError as i16, 0x21);
        assert_eq!(Verdict::WrongAnswer as i16, 0x22);
        assert_eq!(Verdict::MemoryLimitExceeded as i16, 0x30);
        assert_eq!(Verdict::TimeLimitExceeded as i16, 0x31);
        assert_eq!(Verdict::OutputLimitExceeded as i16, 0x32);
        assert_eq!(Verdict::InternalError as i16, 0xFF);
    }

    #[test]
    fn test_from_kind_is_case_insensitive() {
        assert_eq!(
            Verdict::from_kind("timelimitexceeded"),
            Some(Verdict::TimeLimitExceeded)
        );
        assert_eq!(
            Verdict::from_kind("TimeLimitExceeded"),
            Some(Verdict::TimeLimitExceeded)
        );
        assert_eq!(Verdict::from_kind("ACCEPTED"), Some(Verdict::Accepted));
        assert_eq!(Verdict::from_kind("NoSuchVerdict"), None);
    }

    #[test]
    fn test_needs_judging() {
        assert!(Verdict::Waiting.needs_judging());
        assert!(Verdict::Running.needs_judging());
        assert!(Verdict::InternalError.needs_judging());
        assert!(!Verdict::Accepted.needs_judging());
        assert!(!Verdict::WrongAnswer.needs_judging());
        assert!(!Verdict::CompilationError.needs_judging());
    }

    #[test]
    fn test_accepted_never_in_priority() {
        assert!(!Verdict::PRIORITY.contains(&Verdict::Accepted));
        assert!(!Verdict::PRIORITY.contains(&Verdict::CompilationError));
    }
}
