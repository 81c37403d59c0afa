//! Polls a quiz-generation task until it reaches a terminal state.
//!
//! Requests are strictly sequential: the next poll is only scheduled after
//! the previous answer was handled. A [`CancelToken`] stops the loop before a
//! request, after a response and while sleeping between polls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use quiz_api::QuizApi;
use quiz_core::model::{TaskId, TaskReport, TaskVerdict};
use tokio::sync::Notify;

use crate::config::DEFAULT_POLL_INTERVAL;

/// Shared cancellation flag for one polling run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Receives progress and exactly one terminal callback per run.
///
/// Cancelled runs get no terminal callback.
pub trait TaskObserver: Send {
    /// Questions generated so far; `0` after any terminal transition.
    fn on_progress(&mut self, completed: u32, total: u32);
    fn on_success(&mut self, report: &TaskReport);
    fn on_failure(&mut self, message: &str);
    /// Task finished without a recognizable success or failure payload.
    fn on_close(&mut self);
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded(TaskReport),
    Failed(String),
    Closed,
    Cancelled,
}

/// Percentage of `completed` over `total` for progress bars, clamped to 100.
#[must_use]
pub fn progress_percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(completed.min(total)) * 100 / u64::from(total);
    u8::try_from(pct).unwrap_or(100)
}

pub struct TaskPoller {
    api: Arc<dyn QuizApi>,
    interval: Duration,
    token: CancelToken,
}

impl TaskPoller {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
            token: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Handle for stopping this poller from elsewhere (e.g. a closed dialog).
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Poll `task_id` until it succeeds, fails, closes or is cancelled.
    ///
    /// `total_questions` is only forwarded to progress callbacks.
    pub async fn run(
        &self,
        task_id: &TaskId,
        total_questions: u32,
        observer: &mut dyn TaskObserver,
    ) -> PollOutcome {
        loop {
            if self.token.is_cancelled() {
                return finish(observer, total_questions, PollOutcome::Cancelled);
            }

            tracing::debug!(task = %task_id, "polling task status");
            let status = match self.api.task_status(task_id).await {
                Ok(status) => status,
                Err(err) => {
                    if self.token.is_cancelled() {
                        return finish(observer, total_questions, PollOutcome::Cancelled);
                    }
                    tracing::warn!(task = %task_id, error = %err, "task status request failed");
                    let message = err.to_string();
                    observer.on_failure(&message);
                    return finish(observer, total_questions, PollOutcome::Failed(message));
                }
            };

            if self.token.is_cancelled() {
                return finish(observer, total_questions, PollOutcome::Cancelled);
            }

            if let Some(progress) = status.progress {
                tracing::debug!(task = %task_id, completed = progress.current, "task progress");
                observer.on_progress(progress.current, total_questions);
            }

            match status.verdict() {
                TaskVerdict::Pending => {
                    tokio::select! {
                        () = tokio::time::sleep(self.interval) => {}
                        () = self.token.cancelled() => {}
                    }
                }
                TaskVerdict::Succeeded(report) => {
                    tracing::info!(task = %task_id, quiz_id = ?report.quiz_id, "task succeeded");
                    observer.on_success(&report);
                    return finish(observer, total_questions, PollOutcome::Succeeded(report));
                }
                TaskVerdict::Failed { message } => {
                    tracing::info!(task = %task_id, %message, "task failed");
                    observer.on_failure(&message);
                    return finish(observer, total_questions, PollOutcome::Failed(message));
                }
                TaskVerdict::Unclassified => {
                    tracing::info!(task = %task_id, "task finished without a usable payload");
                    observer.on_close();
                    return finish(observer, total_questions, PollOutcome::Closed);
                }
            }
        }
    }
}

fn finish(observer: &mut dyn TaskObserver, total: u32, outcome: PollOutcome) -> PollOutcome {
    observer.on_progress(0, total);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_is_clamped() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 4), 25);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(9, 5), 100);
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        token.cancel();
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
