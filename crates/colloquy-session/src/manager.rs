//! The query session manager.
//!
//! Single-flight by design: one request in flight per session, guarded by
//! the `pending` flag. The network call is the only suspension point, and
//! its resumption is the only place `log`, `draft` and `pending` mutate.

use std::sync::Arc;

use colloquy_client::{ClientError, QueryBackend, QueryReply};

use crate::clipboard;
use crate::record::{QueryRecord, ResultLog, SessionConfig};

/// What a `submit()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A record was appended to the log (answer or refusal).
    Recorded,
    /// Transport failed; the error is in the transient slot, the draft and
    /// log are untouched.
    TransportFailed,
    /// Whitespace-only draft; nothing happened.
    EmptyDraft,
    /// A submission is already in flight; no request was dispatched.
    Busy,
}

pub struct SessionManager {
    backend: Arc<dyn QueryBackend>,
    config: SessionConfig,
    draft: String,
    log: ResultLog,
    pending: bool,
    transient_error: Option<ClientError>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn QueryBackend>, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            draft: String::new(),
            log: ResultLog::default(),
            pending: false,
            transient_error: None,
        }
    }

    /// Replace the draft unconditionally. No validation, no side effects.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The transport failure from the most recent submission attempt, if
    /// any. Cleared when the next attempt begins.
    pub fn transient_error(&self) -> Option<&ClientError> {
        self.transient_error.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Submit the current draft. Exactly one request is sent; the retry
    /// budget lives below the backend seam and is invisible here.
    pub async fn submit(&mut self) -> Submission {
        let question = match self.begin() {
            Ok(q) => q,
            Err(rejected) => return rejected,
        };
        let result = self.backend.query(&question).await;
        self.finish(question, result)
    }

    fn begin(&mut self) -> Result<String, Submission> {
        let question = self.draft.trim();
        if question.is_empty() {
            return Err(Submission::EmptyDraft);
        }
        if self.pending {
            return Err(Submission::Busy);
        }
        self.transient_error = None;
        self.pending = true;
        Ok(question.to_string())
    }

    fn finish(&mut self, question: String, result: Result<QueryReply, ClientError>) -> Submission {
        self.pending = false;
        match result {
            Ok(reply) => {
                let record = QueryRecord::new(question, reply.into_outcome());
                tracing::info!(
                    record_id = %record.id,
                    endpoint = %record.endpoint_name,
                    response_time = record.response_time_secs,
                    refusal = record.is_refusal(),
                    "exchange recorded"
                );
                self.log.push(record);
                self.draft.clear();
                Submission::Recorded
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed, draft preserved");
                self.transient_error = Some(err);
                Submission::TransportFailed
            }
        }
    }

    /// Copy a record's response text to the system clipboard. Clipboard
    /// failures are logged for diagnostics and otherwise swallowed; a
    /// refusal has nothing to copy.
    pub fn copy_response(&self, record: &QueryRecord) {
        match record.display_response() {
            Some(text) => clipboard::copy_text(text),
            None => tracing::debug!(record_id = %record.id, "no response text to copy"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use colloquy_client::QueryMetadata;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted backend: pops one canned result per call and records the
    /// question it was asked.
    struct FakeBackend {
        replies: Mutex<VecDeque<Result<QueryReply, ClientError>>>,
        questions: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(replies: Vec<Result<QueryReply, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                questions: Mutex::new(Vec::new()),
            })
        }

        fn questions(&self) -> Vec<String> {
            self.questions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryBackend for FakeBackend {
        async fn query(&self, question: &str) -> Result<QueryReply, ClientError> {
            self.questions.lock().unwrap().push(question.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ClientError::Status { status: 500 }))
        }
    }

    fn answer(text: &str) -> Result<QueryReply, ClientError> {
        Ok(QueryReply {
            response: text.to_string(),
            metadata: QueryMetadata {
                response_time: 1.23,
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                endpoint: "copilot-v1".to_string(),
            },
            tools_used: vec![],
            error: None,
        })
    }

    fn refusal(error: &str) -> Result<QueryReply, ClientError> {
        let mut reply = answer("").unwrap();
        reply.error = Some(error.to_string());
        Ok(reply)
    }

    fn session(backend: Arc<FakeBackend>) -> SessionManager {
        SessionManager::new(backend, SessionConfig::default())
    }

    #[tokio::test]
    async fn test_submit_sends_trimmed_text_exactly_once() {
        let backend = FakeBackend::new(vec![answer("Usage is up 12%")]);
        let mut s = session(backend.clone());
        s.update_draft("  What's Affirm's usage been like?  ");

        assert_eq!(s.submit().await, Submission::Recorded);

        assert_eq!(backend.questions(), vec!["What's Affirm's usage been like?"]);
        let record = s.log().last().unwrap();
        assert_eq!(record.query, "What's Affirm's usage been like?");
        assert_eq!(record.display_response(), Some("Usage is up 12%"));
        assert_eq!(s.draft(), "");
    }

    #[tokio::test]
    async fn test_empty_draft_is_a_noop() {
        let backend = FakeBackend::new(vec![]);
        let mut s = session(backend.clone());

        assert_eq!(s.submit().await, Submission::EmptyDraft);
        s.update_draft("   \t ");
        assert_eq!(s.submit().await, Submission::EmptyDraft);

        assert!(backend.questions().is_empty());
        assert!(s.log().is_empty());
        assert_eq!(s.draft(), "   \t ");
        assert!(!s.is_pending());
    }

    #[tokio::test]
    async fn test_transport_failure_preserves_draft_and_log() {
        let backend = FakeBackend::new(vec![Err(ClientError::Status { status: 500 })]);
        let mut s = session(backend);
        s.update_draft("a question");

        assert_eq!(s.submit().await, Submission::TransportFailed);

        assert!(s.log().is_empty());
        assert_eq!(s.draft(), "a question");
        assert!(!s.is_pending());
        let banner = s.transient_error().unwrap().to_string();
        assert!(banner.contains("500"), "banner should mention the status: {banner}");
    }

    #[tokio::test]
    async fn test_success_appends_and_clears_transient_error() {
        let backend = FakeBackend::new(vec![
            Err(ClientError::Status { status: 500 }),
            answer("fine now"),
        ]);
        let mut s = session(backend);

        s.update_draft("q");
        assert_eq!(s.submit().await, Submission::TransportFailed);
        assert!(s.transient_error().is_some());

        assert_eq!(s.submit().await, Submission::Recorded);
        assert!(s.transient_error().is_none());
        assert_eq!(s.log().len(), 1);
    }

    #[tokio::test]
    async fn test_logical_failure_is_recorded_with_error_text() {
        let backend = FakeBackend::new(vec![refusal("model unavailable")]);
        let mut s = session(backend);
        s.update_draft("q");

        assert_eq!(s.submit().await, Submission::Recorded);

        assert_eq!(s.log().len(), 1);
        let record = s.log().last().unwrap();
        assert_eq!(record.error_text.as_deref(), Some("model unavailable"));
        assert_eq!(record.display_response(), None);
        assert_eq!(s.draft(), "");
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_rejected() {
        let backend = FakeBackend::new(vec![answer("a")]);
        let mut s = session(backend.clone());
        s.update_draft("q");

        // Hold the session in its in-flight state without completing it.
        let question = s.begin().unwrap();
        assert!(s.is_pending());

        assert_eq!(s.submit().await, Submission::Busy);
        assert!(backend.questions().is_empty(), "no request may be dispatched while pending");
        assert!(s.log().is_empty());

        // Resuming completes the original submission normally.
        let result = backend.query(&question).await;
        assert_eq!(s.finish(question, result), Submission::Recorded);
        assert!(!s.is_pending());
        assert_eq!(s.log().len(), 1);
    }

    #[tokio::test]
    async fn test_log_orders_by_submission() {
        let backend = FakeBackend::new(vec![answer("one"), answer("two")]);
        let mut s = session(backend);

        s.update_draft("first");
        s.submit().await;
        s.update_draft("second");
        s.submit().await;

        let queries: Vec<&str> = s.log().records().iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["first", "second"]);
    }
}
