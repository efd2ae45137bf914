//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod environment_repo;
pub mod judge_result_repo;
pub mod problem_repo;
pub mod submission_repo;
pub mod test_case_repo;
pub mod worker_node_repo;

pub use environment_repo::EnvironmentRepository;
pub use judge_result_repo::JudgeResultRepository;
pub use problem_repo::ProblemRepository;
pub use submission_repo::SubmissionRepository;
pub use test_case_repo::TestCaseRepository;
pub use worker_node_repo::WorkerNodeRepository;
