use crate::types::{ChatMessage, HistoryEntry};

const DEFAULT_MAX_HISTORY_MESSAGES: usize = 32;

/// Serialize the log for the outbound request: chronological order, capped
/// to the newest entries. Callers snapshot before appending the new turn's
/// messages, so a turn never sees itself in its own history.
pub(super) fn snapshot(messages: &[ChatMessage]) -> Vec<HistoryEntry> {
    let limit = resolve_history_limit();
    let start = messages.len().saturating_sub(limit);
    messages[start..]
        .iter()
        .map(|message| HistoryEntry {
            role: message.role,
            content: message.content.clone(),
        })
        .collect()
}

pub(super) fn resolve_history_limit() -> usize {
    std::env::var("SLASHCHAT_MAX_HISTORY_MESSAGES")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .map(|v| v.clamp(4, 128))
        .unwrap_or(DEFAULT_MAX_HISTORY_MESSAGES)
}
