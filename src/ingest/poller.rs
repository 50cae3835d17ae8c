//! Polling asynchronous indexing tasks until they settle.

use crate::index::{SearchIndex, Task, TaskStatus};
use crate::ingest::types::PollError;
use std::time::Duration;
use tokio::time::Instant;

/// Roughly thirty years; stands in for "no deadline".
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Polls task status at a fixed interval, bounded by a deadline.
///
/// The first status query is issued immediately. A failed query ends polling at once; there is
/// no retry and no backoff.
#[derive(Debug, Clone, Copy)]
pub struct TaskPoller {
    interval: Duration,
    timeout: Duration,
}

impl Default for TaskPoller {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(300))
    }
}

impl TaskPoller {
    /// Poller with the given interval and overall timeout.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Wait for a single task to succeed.
    pub async fn wait_for<I>(&self, index: &I, uid: u64) -> Result<Task, PollError>
    where
        I: SearchIndex + ?Sized,
    {
        self.wait_until(index, uid, self.deadline()).await
    }

    /// Wait for every task in order, sharing one deadline. Stops at the first error.
    pub async fn wait_for_all<I>(&self, index: &I, uids: &[u64]) -> Result<Vec<Task>, PollError>
    where
        I: SearchIndex + ?Sized,
    {
        let deadline = self.deadline();
        let mut settled = Vec::with_capacity(uids.len());
        for &uid in uids {
            settled.push(self.wait_until(index, uid, deadline).await?);
        }
        Ok(settled)
    }

    /// `now + timeout`, saturating to a far-future instant when the sum overflows.
    fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE)
    }

    async fn wait_until<I>(&self, index: &I, uid: u64, deadline: Instant) -> Result<Task, PollError>
    where
        I: SearchIndex + ?Sized,
    {
        let started = Instant::now();
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            let task = index.get_task(uid).await.map_err(|source| {
                tracing::warn!(task_uid = uid, attempts, error = %source, "Task status query failed");
                PollError::Query { uid, source }
            })?;

            match task.status {
                TaskStatus::Succeeded => {
                    tracing::info!(task_uid = uid, attempts, "Task succeeded");
                    return Ok(task);
                }
                TaskStatus::Failed | TaskStatus::Canceled => {
                    tracing::error!(
                        task_uid = uid,
                        status = %task.status,
                        error = ?task.error,
                        "Task did not succeed"
                    );
                    return Err(PollError::TaskFailed {
                        uid,
                        status: task.status,
                        detail: task.error,
                    });
                }
                TaskStatus::Enqueued | TaskStatus::Processing => {
                    tracing::debug!(task_uid = uid, status = %task.status, attempts, "Task pending");
                }
            }

            let next_query = Instant::now().checked_add(self.interval);
            if next_query.is_none_or(|next| next > deadline) {
                let waited = started.elapsed();
                tracing::error!(task_uid = uid, ?waited, "Gave up waiting for task");
                return Err(PollError::TimedOut { uid, waited });
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIndex;

    fn poller() -> TaskPoller {
        TaskPoller::new(Duration::from_millis(500), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn processing_twice_then_succeeded_takes_three_queries() {
        let index = FakeIndex::new();
        index.script_tasks([
            TaskStatus::Processing,
            TaskStatus::Processing,
            TaskStatus::Succeeded,
        ]);
        let started = Instant::now();

        let task = poller().wait_for(&index, 42).await.expect("success");

        assert_eq!(task.uid, 42);
        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(index.state().task_queries, vec![42, 42, 42]);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_stops_immediately_with_detail() {
        let index = FakeIndex::new();
        index.script_tasks([TaskStatus::Enqueued, TaskStatus::Failed]);

        let err = poller().wait_for(&index, 7).await.expect_err("failed task");

        match err {
            PollError::TaskFailed {
                uid,
                status,
                detail,
            } => {
                assert_eq!(uid, 7);
                assert_eq!(status, TaskStatus::Failed);
                assert_eq!(
                    detail.map(|d| d.code).as_deref(),
                    Some("invalid_document_fields")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(index.state().task_queries.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_is_terminal() {
        let index = FakeIndex::new();
        index.script_tasks([TaskStatus::Canceled]);
        let err = poller().wait_for(&index, 1).await.expect_err("canceled");
        assert!(matches!(
            err,
            PollError::TaskFailed {
                status: TaskStatus::Canceled,
                ..
            }
        ));
        assert_eq!(index.state().task_queries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn query_error_is_not_retried() {
        let index = FakeIndex::new();
        index.state().task_script.push_back(Ok(TaskStatus::Processing));
        index
            .state()
            .task_script
            .push_back(Err("connection reset".into()));

        let err = poller().wait_for(&index, 3).await.expect_err("query error");

        assert!(matches!(err, PollError::Query { uid: 3, .. }));
        assert_eq!(index.state().task_queries.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_task_times_out() {
        let index = FakeIndex::new();
        index.state().steady_status = TaskStatus::Processing;
        let poller = TaskPoller::new(Duration::from_millis(500), Duration::from_millis(2250));

        let err = poller.wait_for(&index, 5).await.expect_err("timeout");

        assert!(matches!(err, PollError::TimedOut { uid: 5, .. }));
        // queries at 0, 500, 1000, 1500 and 2000 ms; a sixth would land past the deadline
        assert_eq!(index.state().task_queries.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_timeout_waits_instead_of_overflowing() {
        let index = FakeIndex::new();
        index.script_tasks([TaskStatus::Processing, TaskStatus::Succeeded]);
        let poller = TaskPoller::new(Duration::from_millis(500), Duration::from_secs(u64::MAX));

        let task = poller.wait_for(&index, 1).await.expect("success");
        assert_eq!(task.status, TaskStatus::Succeeded);

        let tasks = poller
            .wait_for_all(&index, &[2, 3])
            .await
            .expect("steady success");
        assert_eq!(tasks.len(), 2);
        assert_eq!(index.state().task_queries, vec![1, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_interval_times_out_after_first_query() {
        let index = FakeIndex::new();
        index.state().steady_status = TaskStatus::Processing;
        let poller = TaskPoller::new(Duration::from_secs(u64::MAX), Duration::from_secs(60));

        let err = poller.wait_for(&index, 9).await.expect_err("timeout");

        assert!(matches!(err, PollError::TimedOut { uid: 9, .. }));
        assert_eq!(index.state().task_queries, vec![9]);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_all_shares_one_deadline() {
        let index = FakeIndex::new();
        index.state().steady_status = TaskStatus::Processing;
        // task 1 settles at 2000 ms, leaving 250 ms of the 2250 ms budget for task 2
        index.script_tasks([
            TaskStatus::Processing,
            TaskStatus::Processing,
            TaskStatus::Processing,
            TaskStatus::Processing,
            TaskStatus::Succeeded,
        ]);
        let poller = TaskPoller::new(Duration::from_millis(500), Duration::from_millis(2250));
        let started = Instant::now();

        let err = poller
            .wait_for_all(&index, &[1, 2])
            .await
            .expect_err("second task runs out of time");

        match err {
            PollError::TimedOut { uid, waited } => {
                assert_eq!(uid, 2);
                assert!(waited < Duration::from_millis(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(index.state().task_queries, vec![1, 1, 1, 1, 1, 2]);
        assert!(started.elapsed() < Duration::from_millis(2250));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_all_polls_every_task_in_order() {
        let index = FakeIndex::new();
        index.script_tasks([
            TaskStatus::Processing,
            TaskStatus::Succeeded,
            TaskStatus::Succeeded,
            TaskStatus::Succeeded,
        ]);

        let tasks = poller()
            .wait_for_all(&index, &[1, 2, 3])
            .await
            .expect("all succeed");

        assert_eq!(tasks.len(), 3);
        assert_eq!(index.state().task_queries, vec![1, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_all_stops_at_first_failure() {
        let index = FakeIndex::new();
        index.script_tasks([TaskStatus::Succeeded, TaskStatus::Failed]);

        let err = poller()
            .wait_for_all(&index, &[10, 11, 12])
            .await
            .expect_err("second fails");

        assert!(matches!(err, PollError::TaskFailed { uid: 11, .. }));
        assert_eq!(index.state().task_queries, vec![10, 11]);
    }
}
