//! HTTP client for the copilot query endpoint.
//!
//! Transport failures (network error, non-2xx status, unparsable body) are
//! all [`ClientError`]; a non-2xx body is never interpreted beyond its
//! status code. Logical failures travel inside a parsed [`QueryReply`] and
//! are not this module's concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::retry::{with_retry, RetryConfig};
use crate::wire::{QueryReply, QueryRequest};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {status}")]
    Status { status: u16 },
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether a retry could plausibly succeed. Contract errors (4xx other
    /// than 429, unparsable bodies) fail immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Status { status } => *status == 429 || *status >= 500,
            ClientError::Malformed(_) => false,
        }
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Seam between the session manager and the transport. The session only
/// ever sees the final success or final failure; the retry budget lives
/// behind this trait.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, question: &str) -> Result<QueryReply, ClientError>;
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token for the endpoint, when it requires one.
    pub bearer_token: Option<String>,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            bearer_token: None,
            timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct QueryClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl QueryClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    fn query_url(&self) -> String {
        format!("{}/api/query", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, question: &str) -> Result<QueryReply, ClientError> {
        let body = QueryRequest { query: question.to_string() };
        let mut req = self.http.post(self.query_url()).json(&body);
        if let Some(token) = &self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16() });
        }

        let text = resp.text().await?;
        let reply: QueryReply = serde_json::from_str(&text)?;
        tracing::debug!(
            endpoint = %reply.metadata.endpoint,
            response_time = reply.metadata.response_time,
            logical_error = reply.error.is_some(),
            "query reply received"
        );
        Ok(reply)
    }
}

#[async_trait]
impl QueryBackend for QueryClient {
    async fn query(&self, question: &str) -> Result<QueryReply, ClientError> {
        with_retry(&self.config.retry, "query", || self.send_once(question)).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
