// Discord message size limits and helpers for staying under them.
//
// Discord rejects the whole message when any part is over its limit, so
// user-supplied text (hashes, report reasons) is cut before it is sent.

/// Max characters in an embed field value.
pub const EMBED_FIELD_LIMIT: usize = 1024;

/// Max characters in an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// How much of a user-supplied value to echo back in a plain reply.
pub const MESSAGE_SNIPPET_LIMIT: usize = 200;

/// Cut `text` to at most `max_chars` characters, ending with an ellipsis when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
