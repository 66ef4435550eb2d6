use std::time::Duration;

use chrono::Utc;

use homework_common::error::{AppError, Result};
use homework_common::types::Homework;
use homework_notifier::Notifier;

use crate::client::StatusSource;
use crate::message::{NO_NEW_STATUS, format_failure, format_status_changed};
use crate::validator::extract_homework;

/// Result of a single poll iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A homework status was reported and a notification was attempted.
    StatusChanged(Homework),
    /// The API reported no new statuses.
    NoNewStatus,
    /// The iteration failed; the failure was logged and reported to the chat.
    Failed,
}

/// Poller that periodically checks homework statuses and reports them to a chat.
pub struct HomeworkPoller<S, N> {
    source: S,
    notifier: N,
    chat_id: String,
    retry_interval: Duration,
    /// Unix timestamp the next request asks for updates since.
    cursor: i64,
}

impl<S, N> HomeworkPoller<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, chat_id: String, retry_interval: Duration) -> Self {
        Self {
            source,
            notifier,
            chat_id,
            retry_interval,
            cursor: Utc::now().timestamp(),
        }
    }

    /// Start polling from `cursor` instead of the current time.
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Start the polling loop. Runs indefinitely until the task is cancelled.
    pub async fn run(&mut self) {
        tracing::info!(
            cursor = self.cursor,
            retry_interval_secs = self.retry_interval.as_secs(),
            "Homework poller started"
        );

        loop {
            let outcome = self.poll_once().await;
            tracing::debug!(?outcome, cursor = self.cursor, "Poll iteration finished");
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Run one fetch, validate, format and notify pass.
    ///
    /// Never fails: every error is logged and forwarded to the chat, and the
    /// cursor only moves on success.
    pub async fn poll_once(&mut self) -> PollOutcome {
        match self.check().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    detail = ?e,
                    cursor = self.cursor,
                    "Homework check failed"
                );
                self.deliver(&format_failure(&e)).await;
                PollOutcome::Failed
            }
        }
    }

    async fn check(&mut self) -> Result<PollOutcome> {
        let response = self.source.fetch_status(self.cursor).await?;

        let outcome = match extract_homework(&response) {
            Ok(homework) => {
                tracing::info!(
                    homework = %homework.homework_name,
                    status = %homework.status,
                    "Homework status received"
                );
                self.deliver(&format_status_changed(&homework)).await;
                PollOutcome::StatusChanged(homework)
            }
            Err(AppError::NoNewStatus) => {
                tracing::info!(cursor = self.cursor, "No new homework statuses");
                self.deliver(NO_NEW_STATUS).await;
                PollOutcome::NoNewStatus
            }
            Err(e) => return Err(e),
        };

        self.cursor = response
            .current_date()
            .unwrap_or_else(|| Utc::now().timestamp());

        Ok(outcome)
    }

    /// Send a message, logging and swallowing delivery failures.
    async fn deliver(&self, text: &str) {
        if let Err(e) = self.notifier.notify(&self.chat_id, text).await {
            tracing::error!(error = %e, "Failed to deliver notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use homework_common::types::{HomeworkStatus, RequestInfo, StatusResponse};

    use super::*;

    /// Status source replaying scripted replies and recording requested cursors.
    #[derive(Default)]
    struct ScriptedSource {
        replies: Mutex<VecDeque<Result<StatusResponse>>>,
        requested: Mutex<Vec<i64>>,
    }

    impl ScriptedSource {
        fn push_ok(self, body: serde_json::Value) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(StatusResponse::new(body)));
            self
        }

        fn push_err(self, err: AppError) -> Self {
            self.replies.lock().unwrap().push_back(Err(err));
            self
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, since: i64) -> Result<StatusResponse> {
            self.requested.lock().unwrap().push(since);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, chat_id: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            if self.fail {
                return Err(AppError::Delivery("chat unreachable".to_string()));
            }
            Ok(())
        }
    }

    const START: i64 = 1700000000;

    fn poller(
        source: ScriptedSource,
        notifier: RecordingNotifier,
    ) -> HomeworkPoller<ScriptedSource, RecordingNotifier> {
        HomeworkPoller::new(source, notifier, "42".to_string(), Duration::from_secs(600))
            .with_cursor(START)
    }

    fn sent(poller: &HomeworkPoller<ScriptedSource, RecordingNotifier>) -> Vec<String> {
        poller
            .notifier
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_status_change_is_notified_and_cursor_advances() {
        let source = ScriptedSource::default().push_ok(json!({
            "homeworks": [{ "status": "approved", "homework_name": "hw1" }],
            "current_date": 1700000100
        }));
        let mut poller = poller(source, RecordingNotifier::default());

        let outcome = poller.poll_once().await;

        assert_eq!(
            outcome,
            PollOutcome::StatusChanged(Homework {
                homework_name: "hw1".to_string(),
                status: HomeworkStatus::Approved,
            })
        );
        assert_eq!(
            sent(&poller),
            vec![
                "Status of check for work \"hw1\" changed. Работа проверена: ревьюеру всё понравилось. Ура!"
                    .to_string()
            ]
        );
        assert_eq!(poller.notifier.sent.lock().unwrap()[0].0, "42");
        assert_eq!(poller.cursor(), 1700000100);
    }

    #[tokio::test]
    async fn test_next_request_uses_server_current_date() {
        let source = ScriptedSource::default()
            .push_ok(json!({
                "homeworks": [{ "status": "reviewing", "homework_name": "hw1" }],
                "current_date": 1700000500
            }))
            .push_ok(json!({ "homeworks": [], "current_date": 1700001100 }));
        let mut poller = poller(source, RecordingNotifier::default());

        poller.poll_once().await;
        poller.poll_once().await;

        assert_eq!(
            *poller.source.requested.lock().unwrap(),
            vec![START, 1700000500]
        );
        assert_eq!(poller.cursor(), 1700001100);
    }

    #[tokio::test]
    async fn test_empty_homeworks_sends_no_new_status() {
        let source = ScriptedSource::default().push_ok(json!({ "homeworks": [] }));
        let mut poller = poller(source, RecordingNotifier::default());

        let before = Utc::now().timestamp();
        let outcome = poller.poll_once().await;

        assert_eq!(outcome, PollOutcome::NoNewStatus);
        assert_eq!(sent(&poller), vec![NO_NEW_STATUS.to_string()]);
        // No current_date: falls back to wall-clock time.
        assert!(poller.cursor() >= before);
    }

    #[tokio::test]
    async fn test_denial_of_service_is_reported_and_cursor_kept() {
        let source = ScriptedSource::default().push_err(AppError::DenialOfService {
            code: "not_authenticated".to_string(),
            error: "Invalid token".to_string(),
            request: RequestInfo::new("https://example.test/", START),
        });
        let mut poller = poller(source, RecordingNotifier::default());

        let outcome = poller.poll_once().await;

        assert_eq!(outcome, PollOutcome::Failed);
        let messages = sent(&poller);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Program failure: "));
        assert!(messages[0].contains("not_authenticated"));
        assert!(messages[0].contains("Invalid token"));
        assert_eq!(poller.cursor(), START);
    }

    #[tokio::test]
    async fn test_unknown_status_never_reaches_formatter() {
        let source = ScriptedSource::default().push_ok(json!({
            "homeworks": [{ "status": "lost", "homework_name": "hw1" }],
            "current_date": 1700000100
        }));
        let mut poller = poller(source, RecordingNotifier::default());

        let outcome = poller.poll_once().await;

        assert_eq!(outcome, PollOutcome::Failed);
        let messages = sent(&poller);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Unknown homework status: lost"));
        assert!(!messages[0].contains("Status of check"));
        assert_eq!(poller.cursor(), START);
    }

    #[tokio::test]
    async fn test_missing_homeworks_is_a_failure() {
        let source = ScriptedSource::default().push_ok(json!({ "current_date": 1700000100 }));
        let mut poller = poller(source, RecordingNotifier::default());

        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        assert!(sent(&poller)[0].contains("homeworks"));
        assert_eq!(poller.cursor(), START);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_abort_iteration() {
        let source = ScriptedSource::default().push_ok(json!({
            "homeworks": [{ "status": "rejected", "homework_name": "hw2" }],
            "current_date": 1700000200
        }));
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let mut poller = poller(source, notifier);

        let outcome = poller.poll_once().await;

        assert!(matches!(outcome, PollOutcome::StatusChanged(_)));
        assert_eq!(poller.cursor(), 1700000200);
        // Only the status message was attempted; no failure message for the failed send.
        assert_eq!(sent(&poller).len(), 1);
    }

    #[tokio::test]
    async fn test_failure_with_broken_chat_keeps_polling() {
        let source = ScriptedSource::default()
            .push_err(AppError::UnexpectedStatus {
                status: 500,
                request: RequestInfo::new("https://example.test/", START),
            })
            .push_ok(json!({ "homeworks": [], "current_date": 1700000900 }));
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let mut poller = poller(source, notifier);

        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        assert_eq!(poller.poll_once().await, PollOutcome::NoNewStatus);
        assert_eq!(poller.cursor(), 1700000900);
    }
}
