//! Claiming and dispatching judge work
//!
//! For every broker delivery: decode the request, claim the submission in
//! one serializable transaction, materialize a judge task, and hand it to
//! the executor. Redeliveries of already-judged submissions and malformed
//! bodies are acknowledged and dropped, which keeps the queue draining.

use std::collections::HashMap;

use lapin::{
    message::Delivery,
    options::{BasicAckOptions, BasicNackOptions},
};
use rand::seq::SliceRandom;
use sqlx::PgPool;

use crate::{
    broker::message::JudgeRequest,
    db::repositories::{
        EnvironmentRepository, JudgeResultRepository, ProblemRepository, SubmissionRepository,
        TestCaseRepository,
    },
    error::WorkerResult,
    judge::{JudgeTask, TestItem, TestRecord},
    models::{JudgeResult, TestCase, Verdict},
    worker::WorkerContext,
};

/// Handle one broker delivery end to end
pub async fn handle_delivery(ctx: &WorkerContext, delivery: Delivery) {
    let request = match JudgeRequest::decode(&delivery.data) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("dropping malformed queue message: {}", e);
            ack(delivery).await;
            return;
        }
    };

    match claim(&ctx.pool, &request).await {
        Ok(Some(task)) => {
            ctx.executor
                .submit(ctx.pool.clone(), ctx.docker.clone(), task, delivery)
                .await;
        }
        Ok(None) => ack(delivery).await,
        Err(e) => {
            // Transient storage trouble; leave the message to the broker
            tracing::warn!(
                submission_id = request.submission_id,
                "claim failed, requeueing: {}",
                e
            );
            if let Err(e) = delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..Default::default()
                })
                .await
            {
                tracing::error!("failed to nack delivery: {}", e);
            }
        }
    }
}

async fn ack(delivery: Delivery) {
    if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
        tracing::error!("failed to ack delivery: {}", e);
    }
}

/// Claim the submission under row lock and build its judge task.
///
/// Returns `None` when there is nothing to do: unknown submission, a
/// submission already in a non-resumable state, or missing referents.
/// Tests that already carry a final verdict from an interrupted run are
/// left out of the task; their rows are reused as-is.
pub async fn claim(pool: &PgPool, request: &JudgeRequest) -> WorkerResult<Option<JudgeTask>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;

    let Some(submission) = SubmissionRepository::find_for_update(
        &mut *tx,
        &request.contest_id,
        &request.problem_id,
        request.submission_id,
    )
    .await?
    else {
        tracing::warn!(
            submission_id = request.submission_id,
            "dropping request for unknown submission"
        );
        return Ok(None);
    };

    if !submission.status.needs_judging() {
        tracing::debug!(
            submission_id = submission.id,
            status = %submission.status,
            "submission already judged"
        );
        return Ok(None);
    }

    let Some(environment) =
        EnvironmentRepository::find_by_id(&mut *tx, submission.environment_id).await?
    else {
        tracing::warn!(
            submission_id = submission.id,
            environment_id = submission.environment_id,
            "dropping submission with unknown environment"
        );
        return Ok(None);
    };

    let Some(problem) =
        ProblemRepository::find_by_id(&mut *tx, &request.contest_id, &request.problem_id).await?
    else {
        tracing::warn!(
            submission_id = submission.id,
            "dropping submission with unknown problem"
        );
        return Ok(None);
    };

    let prior: HashMap<String, JudgeResult> = JudgeResultRepository::list_for_submission(
        &mut *tx,
        &request.contest_id,
        &request.problem_id,
        submission.id,
    )
    .await?
    .into_iter()
    .map(|r| (r.test_id.clone(), r))
    .collect();

    let cases =
        TestCaseRepository::list_for_problem(&mut *tx, &request.contest_id, &request.problem_id)
            .await?;

    let (mut tests, fresh) = select_tests(&prior, cases);
    for test_id in &fresh {
        JudgeResultRepository::insert_waiting(
            &mut *tx,
            &request.contest_id,
            &request.problem_id,
            submission.id,
            test_id,
        )
        .await?;
    }

    SubmissionRepository::set_status(
        &mut *tx,
        &request.contest_id,
        &request.problem_id,
        submission.id,
        Verdict::Running,
    )
    .await?;
    tx.commit().await?;

    // Randomized order prevents adversarial inputs from clustering the
    // expensive tests and evens resource use across heterogeneous machines.
    tests.shuffle(&mut rand::rng());

    // Finished rows from an interrupted run still count in the aggregate
    let prior_records: Vec<TestRecord> = prior
        .values()
        .filter(|r| !r.status.needs_judging())
        .map(|r| TestRecord {
            status: r.status,
            time_ms: r.time_ms,
            memory_kb: r.memory_kb,
        })
        .collect();

    Ok(Some(JudgeTask {
        contest_id: submission.contest_id,
        problem_id: submission.problem_id,
        id: submission.id,
        user_id: submission.user_id,
        code: submission.code,
        compile_image_name: environment.compile_image_name,
        test_image_name: environment.test_image_name,
        time_limit: problem.time_limit.max(0) as u32,
        memory_limit: problem.memory_limit.max(0) as u32,
        compile_time_ms: None,
        tests,
        prior_records,
    }))
}

/// Decide which test cases run in this round.
///
/// Returns the tests to execute plus the IDs needing a fresh Waiting row.
/// A prior row with a final verdict is kept and its test skipped, which is
/// what makes a resumed judge cheap.
pub(crate) fn select_tests(
    prior: &HashMap<String, JudgeResult>,
    cases: Vec<TestCase>,
) -> (Vec<TestItem>, Vec<String>) {
    let mut tests = Vec::new();
    let mut fresh = Vec::new();
    for case in cases {
        match prior.get(&case.id) {
            None => {
                fresh.push(case.id.clone());
                tests.push(TestItem::from(case));
            }
            Some(result) if result.status.needs_judging() => tests.push(TestItem::from(case)),
            Some(_) => {}
        }
    }
    (tests, fresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str) -> TestCase {
        TestCase {
            contest_id: "c".to_string(),
            problem_id: "p".to_string(),
            id: id.to_string(),
            input: vec![],
            output: vec![],
        }
    }

    fn prior_result(test_id: &str, status: Verdict) -> (String, JudgeResult) {
        (
            test_id.to_string(),
            JudgeResult {
                contest_id: "c".to_string(),
                problem_id: "p".to_string(),
                submission_id: 1,
                test_id: test_id.to_string(),
                status,
                time_ms: None,
                memory_kb: None,
            },
        )
    }

    #[test]
    fn test_unseen_tests_get_fresh_rows() {
        let prior = HashMap::new();
        let (tests, fresh) = select_tests(&prior, vec![case("1"), case("2")]);
        assert_eq!(tests.len(), 2);
        assert_eq!(fresh, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_finished_tests_are_never_reexecuted() {
        let prior = HashMap::from([
            prior_result("1", Verdict::Accepted),
            prior_result("2", Verdict::WrongAnswer),
            prior_result("3", Verdict::Running),
        ]);
        let (tests, fresh) = select_tests(&prior, vec![case("1"), case("2"), case("3")]);
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, "3");
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_interrupted_statuses_are_rejudged() {
        for status in [Verdict::Waiting, Verdict::Running, Verdict::InternalError] {
            let prior = HashMap::from([prior_result("1", status)]);
            let (tests, fresh) = select_tests(&prior, vec![case("1")]);
            assert_eq!(tests.len(), 1, "{:?} must be rejudged", status);
            assert!(fresh.is_empty());
        }
    }

    #[test]
    fn test_new_test_case_added_after_partial_run() {
        let prior = HashMap::from([prior_result("1", Verdict::Accepted)]);
        let (tests, fresh) = select_tests(&prior, vec![case("1"), case("2")]);
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, "2");
        assert_eq!(fresh, vec!["2".to_string()]);
    }
}
