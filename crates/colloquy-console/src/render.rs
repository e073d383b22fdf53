//! Terminal rendering for exchange records and the transport-error banner.

use chrono::{DateTime, NaiveDateTime};
use colloquy_client::ClientError;
use colloquy_session::QueryRecord;

pub fn format_response_time(secs: f64) -> String {
    format!("{secs:.2}s")
}

/// Pretty-print the server timestamp when it parses; the server may emit a
/// zone-less isoformat() string, and anything else is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

/// One record as a terminal block. `position` is the 1-based log position
/// shown to the user (and accepted by `:copy N`).
pub fn render_record(position: usize, record: &QueryRecord, stale: bool) -> String {
    let mut out = format!("#{} {}\n", position, record.query);

    match record.display_response() {
        Some(text) => {
            for line in text.lines() {
                out.push_str("   ");
                out.push_str(line);
                out.push('\n');
            }
        }
        // refusal: the error is shown inline with this record, never as a
        // session-level banner
        None => {
            let error = record.error_text.as_deref().unwrap_or("no response");
            out.push_str("   ! ");
            out.push_str(error);
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "   [{}] {} via {}{}\n",
        format_response_time(record.response_time_secs),
        format_timestamp(&record.timestamp),
        record.endpoint_name,
        if stale { " (stale)" } else { "" },
    ));

    if !record.tools_used.is_empty() {
        out.push_str(&format!("   tools: {}\n", record.tools_used.join(", ")));
    }

    out
}

pub fn render_transport_error(err: &ClientError) -> String {
    format!("submission failed: {err} — draft preserved, press enter to retry or type to edit")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
