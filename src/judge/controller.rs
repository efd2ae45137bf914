//! Judging of one claimed submission
//!
//! Drives the phases in order: decompress, prepare, compile (when the
//! environment has one), tests, aggregate, persist. Every early exit
//! leaves the submission row in a terminal state, and the driver's
//! sandboxes are torn down on all paths.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::{
    db::repositories::{JudgeResultRepository, SubmissionRepository},
    error::WorkerResult,
    judge::{
        compare::outputs_equal,
        driver::{AgentReply, CompileOutcome, JudgeDriver, TestObserver},
        task::{JudgeTask, TestItem, TestRecord},
    },
    models::Verdict,
};

/// Judge one claimed task to completion and return the submission verdict
pub async fn run(
    pool: &PgPool,
    driver: &mut dyn JudgeDriver,
    mut task: JudgeTask,
) -> WorkerResult<Verdict> {
    tracing::info!(
        contest_id = %task.contest_id,
        problem_id = %task.problem_id,
        submission_id = task.id,
        user_id = %task.user_id,
        "judge start"
    );
    let verdict = judge(pool, driver, &mut task).await;
    driver.teardown().await;
    match &verdict {
        Ok(v) => tracing::info!(submission_id = task.id, verdict = %v, "judge finished"),
        Err(e) => tracing::error!(submission_id = task.id, "judge aborted: {}", e),
    }
    verdict
}

async fn judge(
    pool: &PgPool,
    driver: &mut dyn JudgeDriver,
    task: &mut JudgeTask,
) -> WorkerResult<Verdict> {
    if let Err(e) = decompress(task) {
        tracing::warn!(submission_id = task.id, "decompress failed: {}", e);
        return fail(pool, task, Verdict::InternalError).await;
    }

    if let Err(e) = driver.prepare(task).await {
        tracing::warn!(submission_id = task.id, "sandbox prepare failed: {}", e);
        return fail(pool, task, Verdict::InternalError).await;
    }

    if task.compile_image_name.is_some() {
        match driver.compile(task).await {
            Ok(CompileOutcome::Compiled(result)) => {
                task.code = result.binary;
                task.compile_time_ms = Some(result.time * 1000.0);
            }
            Ok(CompileOutcome::Rejected(verdict)) => {
                SubmissionRepository::set_status(
                    pool,
                    &task.contest_id,
                    &task.problem_id,
                    task.id,
                    verdict,
                )
                .await?;
                JudgeResultRepository::set_all_status(
                    pool,
                    &task.contest_id,
                    &task.problem_id,
                    task.id,
                    verdict,
                )
                .await?;
                tracing::info!(submission_id = task.id, verdict = %verdict, "compile rejected");
                return Ok(verdict);
            }
            Err(e) => {
                tracing::warn!(submission_id = task.id, "compile phase failed: {}", e);
                return fail(pool, task, Verdict::InternalError).await;
            }
        }
    }

    // Results kept from an interrupted earlier round count toward the
    // aggregate exactly as if they had run in this one.
    let mut recorder = ResultRecorder {
        pool,
        contest_id: task.contest_id.clone(),
        problem_id: task.problem_id.clone(),
        submission_id: task.id,
        records: task.prior_records.clone(),
    };
    if let Err(e) = driver.run_tests(task, &mut recorder).await {
        // Remaining tests keep whatever status they had; the aggregate
        // charges the interruption to the system.
        tracing::warn!(submission_id = task.id, "test phase failed: {}", e);
        recorder.records.push(TestRecord {
            status: Verdict::InternalError,
            time_ms: None,
            memory_kb: None,
        });
    }

    let status = aggregate(&recorder.records);
    let max_time_ms = fold_max_f64(recorder.records.iter().map(|r| r.time_ms));
    let max_memory_kb = recorder.records.iter().filter_map(|r| r.memory_kb).max();

    SubmissionRepository::finish(
        pool,
        &task.contest_id,
        &task.problem_id,
        task.id,
        status,
        task.compile_time_ms,
        max_time_ms,
        max_memory_kb,
    )
    .await?;

    Ok(status)
}

/// Put the submission into a terminal state with no per-test changes
async fn fail(pool: &PgPool, task: &JudgeTask, verdict: Verdict) -> WorkerResult<Verdict> {
    SubmissionRepository::set_status(pool, &task.contest_id, &task.problem_id, task.id, verdict)
        .await?;
    Ok(verdict)
}

fn decompress(task: &mut JudgeTask) -> std::io::Result<()> {
    task.code = zstd::stream::decode_all(task.code.as_slice())?;
    for test in &mut task.tests {
        test.input = zstd::stream::decode_all(test.input.as_slice())?;
        test.output = zstd::stream::decode_all(test.output.as_slice())?;
    }
    Ok(())
}

/// Fold a submission's test records into one verdict.
///
/// A uniform set is its own answer; a mixed set picks the first verdict
/// present in the priority order, so Accepted never wins a mixed set.
pub fn aggregate(records: &[TestRecord]) -> Verdict {
    let statuses: HashSet<Verdict> = records.iter().map(|r| r.status).collect();
    if statuses.len() == 1 {
        return records[0].status;
    }
    Verdict::PRIORITY
        .iter()
        .copied()
        .find(|v| statuses.contains(v))
        .unwrap_or(Verdict::InternalError)
}

fn fold_max_f64(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, v| match acc {
        Some(max) if max >= v => Some(max),
        _ => Some(v),
    })
}

/// Persists per-test state as the driver streams tests to the agent
struct ResultRecorder<'a> {
    pool: &'a PgPool,
    contest_id: String,
    problem_id: String,
    submission_id: i64,
    records: Vec<TestRecord>,
}

#[async_trait::async_trait]
impl TestObserver for ResultRecorder<'_> {
    async fn on_start(&mut self, test_id: &str) -> WorkerResult<()> {
        JudgeResultRepository::mark_running(
            self.pool,
            &self.contest_id,
            &self.problem_id,
            self.submission_id,
            test_id,
        )
        .await
    }

    async fn on_result(&mut self, test: &TestItem, reply: AgentReply) -> WorkerResult<()> {
        let record = match reply {
            AgentReply::Completed(result) => {
                let status = if outputs_equal(&test.output, &result.output) {
                    Verdict::Accepted
                } else {
                    Verdict::WrongAnswer
                };
                TestRecord {
                    status,
                    time_ms: result.time.map(|t| t * 1000.0),
                    memory_kb: result.memory_bytes.map(|b| (b / 1024) as i64),
                }
            }
            AgentReply::Failed {
                verdict,
                time,
                memory_bytes,
            } => TestRecord {
                status: verdict,
                time_ms: time.map(|t| t * 1000.0),
                memory_kb: memory_bytes.map(|b| (b / 1024) as i64),
            },
        };

        JudgeResultRepository::record(
            self.pool,
            &self.contest_id,
            &self.problem_id,
            self.submission_id,
            &test.id,
            record.status,
            record.time_ms,
            record.memory_kb,
        )
        .await?;
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: Verdict) -> TestRecord {
        TestRecord {
            status,
            time_ms: None,
            memory_kb: None,
        }
    }

    #[test]
    fn test_uniform_accepted_aggregates_to_accepted() {
        let records = [record(Verdict::Accepted), record(Verdict::Accepted)];
        assert_eq!(aggregate(&records), Verdict::Accepted);
    }

    #[test]
    fn test_mixed_set_never_aggregates_to_accepted() {
        let records = [record(Verdict::Accepted), record(Verdict::WrongAnswer)];
        assert_eq!(aggregate(&records), Verdict::WrongAnswer);

        let records = [record(Verdict::Accepted), record(Verdict::TimeLimitExceeded)];
        assert_eq!(aggregate(&records), Verdict::TimeLimitExceeded);
    }

    #[test]
    fn test_priority_order_decides_mixed_sets() {
        let records = [
            record(Verdict::TimeLimitExceeded),
            record(Verdict::RuntimeError),
            record(Verdict::WrongAnswer),
        ];
        assert_eq!(aggregate(&records), Verdict::RuntimeError);

        let records = [
            record(Verdict::OutputLimitExceeded),
            record(Verdict::MemoryLimitExceeded),
            record(Verdict::Accepted),
        ];
        assert_eq!(aggregate(&records), Verdict::MemoryLimitExceeded);
    }

    #[test]
    fn test_internal_error_dominates() {
        let records = [
            record(Verdict::Accepted),
            record(Verdict::WrongAnswer),
            record(Verdict::InternalError),
        ];
        assert_eq!(aggregate(&records), Verdict::InternalError);
    }

    #[test]
    fn test_no_records_is_a_system_fault() {
        assert_eq!(aggregate(&[]), Verdict::InternalError);
    }

    #[test]
    fn test_uniform_single_test() {
        assert_eq!(
            aggregate(&[record(Verdict::WrongAnswer)]),
            Verdict::WrongAnswer
        );
    }

    #[test]
    fn test_max_folding_skips_missing_measurements() {
        let records = [
            TestRecord {
                status: Verdict::Accepted,
                time_ms: Some(10.0),
                memory_kb: Some(1024),
            },
            TestRecord {
                status: Verdict::TimeLimitExceeded,
                time_ms: Some(2000.0),
                memory_kb: None,
            },
            TestRecord {
                status: Verdict::InternalError,
                time_ms: None,
                memory_kb: None,
            },
        ];
        let max_time = fold_max_f64(records.iter().map(|r| r.time_ms));
        let max_memory = records.iter().filter_map(|r| r.memory_kb).max();
        assert_eq!(max_time, Some(2000.0));
        assert_eq!(max_memory, Some(1024));
    }

    #[test]
    fn test_max_folding_with_no_measurements() {
        let records = [record(Verdict::InternalError)];
        assert_eq!(fold_max_f64(records.iter().map(|r| r.time_ms)), None);
        assert_eq!(records.iter().filter_map(|r| r.memory_kb).max(), None);
    }
}
