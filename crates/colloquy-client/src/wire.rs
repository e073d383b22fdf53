//! JSON types exchanged with the copilot serving endpoint.
//!
//! The endpoint reports an error in two different ways and they must stay
//! distinguishable: a non-2xx status (transport failure, handled in
//! `client`) and a populated `error` field inside a 2xx body (logical
//! failure, decided here via [`QueryReply::into_outcome`]).

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Server-reported metadata attached to every reply.
///
/// `timestamp` is echoed verbatim; the server's clock is authoritative and
/// the string may be zone-less, so it is never round-tripped through a
/// typed datetime on this side of the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetadata {
    pub response_time: f64,
    pub timestamp: String,
    pub endpoint: String,
}

/// Full reply envelope from the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReply {
    pub response: String,
    pub metadata: QueryMetadata,
    #[serde(rename = "toolsUsed", default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A reply, decided once into answer or refusal.
///
/// A refusal keeps any partial `response` the server sent alongside the
/// error; callers treat it as absent for primary display.
#[derive(Debug, Clone)]
pub enum Outcome {
    Answer {
        response: String,
        metadata: QueryMetadata,
        tools_used: Vec<String>,
    },
    Refusal {
        error: String,
        response: Option<String>,
        metadata: QueryMetadata,
        tools_used: Vec<String>,
    },
}

impl QueryReply {
    /// Decide between answer and refusal. A populated `error` field selects
    /// the refusal arm; an absent or empty one is an answer.
    pub fn into_outcome(self) -> Outcome {
        match self.error {
            Some(error) if !error.is_empty() => Outcome::Refusal {
                error,
                response: if self.response.is_empty() { None } else { Some(self.response) },
                metadata: self.metadata,
                tools_used: self.tools_used,
            },
            _ => Outcome::Answer {
                response: self.response,
                metadata: self.metadata,
                tools_used: self.tools_used,
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> QueryReply {
        serde_json::from_str(body).expect("valid reply body")
    }

    #[test]
    fn test_reply_parses_camel_case_metadata() {
        let reply = parse(
            r#"{
                "response": "Usage is up 12%",
                "metadata": {
                    "responseTime": 1.23,
                    "timestamp": "2024-01-01T00:00:00Z",
                    "endpoint": "copilot-v1"
                }
            }"#,
        );
        assert_eq!(reply.response, "Usage is up 12%");
        assert_eq!(reply.metadata.response_time, 1.23);
        assert_eq!(reply.metadata.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(reply.metadata.endpoint, "copilot-v1");
        assert!(reply.tools_used.is_empty());
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_tools_used_round_trip() {
        let reply = parse(
            r#"{
                "response": "ok",
                "metadata": {"responseTime": 0.5, "timestamp": "t", "endpoint": "e"},
                "toolsUsed": ["sql", "vector_search"]
            }"#,
        );
        assert_eq!(reply.tools_used, vec!["sql", "vector_search"]);
    }

    #[test]
    fn test_request_serializes_query_field() {
        let req = QueryRequest { query: "What's Affirm's usage been like?".to_string() };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "What's Affirm's usage been like?");
    }

    #[test]
    fn test_outcome_answer_when_error_absent() {
        let reply = parse(
            r#"{
                "response": "fine",
                "metadata": {"responseTime": 0.1, "timestamp": "t", "endpoint": "e"}
            }"#,
        );
        match reply.into_outcome() {
            Outcome::Answer { response, .. } => assert_eq!(response, "fine"),
            Outcome::Refusal { .. } => panic!("expected answer"),
        }
    }

    #[test]
    fn test_outcome_refusal_when_error_populated() {
        let reply = parse(
            r#"{
                "response": "",
                "error": "model unavailable",
                "metadata": {"responseTime": 0.1, "timestamp": "t", "endpoint": "e"}
            }"#,
        );
        match reply.into_outcome() {
            Outcome::Refusal { error, response, .. } => {
                assert_eq!(error, "model unavailable");
                assert!(response.is_none());
            }
            Outcome::Answer { .. } => panic!("expected refusal"),
        }
    }

    #[test]
    fn test_outcome_refusal_keeps_partial_response() {
        let reply = parse(
            r#"{
                "response": "partial answer",
                "error": "truncated by cost guard",
                "metadata": {"responseTime": 0.1, "timestamp": "t", "endpoint": "e"}
            }"#,
        );
        match reply.into_outcome() {
            Outcome::Refusal { response, .. } => {
                assert_eq!(response.as_deref(), Some("partial answer"));
            }
            Outcome::Answer { .. } => panic!("expected refusal"),
        }
    }

    #[test]
    fn test_outcome_empty_error_string_is_answer() {
        let reply = parse(
            r#"{
                "response": "ok",
                "error": "",
                "metadata": {"responseTime": 0.1, "timestamp": "t", "endpoint": "e"}
            }"#,
        );
        assert!(matches!(reply.into_outcome(), Outcome::Answer { .. }));
    }
}
