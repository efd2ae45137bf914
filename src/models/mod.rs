//! Domain models
//!
//! This module contains all domain models used throughout the worker.

pub mod environment;
pub mod judge_result;
pub mod problem;
pub mod submission;
pub mod test_case;
pub mod verdict;
pub mod worker_node;

pub use environment::*;
pub use judge_result::*;
pub use problem::*;
pub use submission::*;
pub use test_case::*;
pub use verdict::*;
pub use worker_node::*;
