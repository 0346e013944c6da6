//! Reply shaping before text leaves the bot
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// Platform message content limit (characters)
pub const MESSAGE_LIMIT: usize = 4096;

/// Strip control characters (newlines and tabs survive) and fit the message limit
pub fn sanitize_reply(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    truncate_for_message(cleaned.trim())
}

/// Truncate text to fit message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text.to_string();
    }

    // Room for "..."
    let kept: String = text.chars().take(MESSAGE_LIMIT - 3).collect();
    format!("{kept}...")
}
