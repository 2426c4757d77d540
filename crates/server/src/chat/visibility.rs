//! Message visibility
//!
//! Decides which messages a participant may read. Works on a materialized
//! snapshot of the whole log; an indexed store-side query would replace the
//! scan if the log ever grows large.

use crate::core::error::{Error, Result};
use crate::core::models::{Message, MessageKind, BROADCAST_RECIPIENT};

/// Whether `message` is visible to `participant`
pub fn is_visible_to(message: &Message, participant: &str) -> bool {
    message.to == BROADCAST_RECIPIENT
        || message.from == participant
        || message.to == participant
        || message.kind == MessageKind::Status
}

/// Messages visible to `participant`, in log order, optionally keeping only
/// the most recent `limit` of them (still oldest first).
pub fn visible_messages(
    log: &[Message],
    participant: &str,
    limit: Option<usize>,
) -> Vec<Message> {
    let mut visible: Vec<Message> = log
        .iter()
        .filter(|m| is_visible_to(m, participant))
        .cloned()
        .collect();

    if let Some(limit) = limit {
        let skip = visible.len().saturating_sub(limit);
        visible.drain(..skip);
    }

    visible
}

/// Parse the raw `limit` query value. It must be a positive integer.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<usize>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
        _ => Err(Error::validation(format!(
            "limit must be a positive integer, got {:?}",
            raw
        ))),
    }
}
