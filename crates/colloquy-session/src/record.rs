//! Completed exchanges and the append-only session log.

use std::time::Duration;

use chrono::{DateTime, Utc};
use colloquy_client::Outcome;
use serde::Serialize;
use uuid::Uuid;

/// Session-level knobs, passed in at construction so tests can override
/// them deterministically.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Age past which a record is flagged stale for display.
    pub stale_after: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { stale_after: Duration::from_secs(300) }
    }
}

/// One submitted query and its outcome. Immutable after creation.
///
/// `error_text` is set only for logical failures the endpoint reported
/// inside a 2xx body; transport failures never become records.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    /// Stable list identity only; no semantic meaning.
    pub id: Uuid,
    /// The exact trimmed text that was submitted.
    pub query: String,
    pub response_text: Option<String>,
    pub error_text: Option<String>,
    /// Server-reported duration in seconds; client timing is never
    /// authoritative.
    pub response_time_secs: f64,
    /// Server-reported ISO timestamp, echoed verbatim.
    pub timestamp: String,
    pub endpoint_name: String,
    pub tools_used: Vec<String>,
    /// Client arrival time, used only for staleness display.
    pub received_at: DateTime<Utc>,
}

impl QueryRecord {
    pub fn new(query: String, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Answer { response, metadata, tools_used } => Self {
                id: Uuid::new_v4(),
                query,
                response_text: Some(response),
                error_text: None,
                response_time_secs: metadata.response_time,
                timestamp: metadata.timestamp,
                endpoint_name: metadata.endpoint,
                tools_used,
                received_at: Utc::now(),
            },
            Outcome::Refusal { error, response, metadata, tools_used } => Self {
                id: Uuid::new_v4(),
                query,
                response_text: response,
                error_text: Some(error),
                response_time_secs: metadata.response_time,
                timestamp: metadata.timestamp,
                endpoint_name: metadata.endpoint,
                tools_used,
                received_at: Utc::now(),
            },
        }
    }

    pub fn is_refusal(&self) -> bool {
        self.error_text.is_some()
    }

    /// The response for primary display: absent on refusals even when the
    /// server sent a partial response alongside the error.
    pub fn display_response(&self) -> Option<&str> {
        if self.is_refusal() {
            None
        } else {
            self.response_text.as_deref()
        }
    }

    pub fn is_stale(&self, stale_after: Duration) -> bool {
        Utc::now()
            .signed_duration_since(self.received_at)
            .to_std()
            .map_or(false, |age| age >= stale_after)
    }
}

/// Append-only, insertion order = submission order. In-memory only;
/// discarded with the session.
#[derive(Debug, Default)]
pub struct ResultLog {
    records: Vec<QueryRecord>,
}

impl ResultLog {
    /// Append a record, returning its zero-based position in the log.
    pub fn push(&mut self, record: QueryRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&QueryRecord> {
        self.records.get(index)
    }

    pub fn last(&self) -> Option<&QueryRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
