//! Clipboard side effect. Failures here are diagnostics-only: they never
//! reach the result log and never surface to the user.

use tracing::debug;

pub fn copy_text(text: &str) {
    let result = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string()));
    match result {
        Ok(()) => debug!(chars = text.len(), "response copied to clipboard"),
        Err(err) => debug!(error = %err, "clipboard unavailable, copy skipped"),
    }
}
