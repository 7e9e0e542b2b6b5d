//! Byte-budget truncation of outbound message text.
//!
//! The server stores message text in a fixed-width field, so the client
//! shrinks anything longer before sending it. Cutting must never split a
//! multi-byte UTF-8 sequence.

use std::borrow::Cow;

/// Default byte budget for a published message.
pub const DEFAULT_MESSAGE_LIMIT: usize = 254;

/// Widest UTF-8 code point minus one: the most bytes a cut can land inside.
pub const MAX_BOUNDARY_RETRIES: usize = 3;

/// Returns the longest prefix of `text` that encodes to at most `limit`
/// bytes and ends on a character boundary.
///
/// Text that already fits is returned borrowed and unchanged.
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    if text.len() <= limit {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    for offset in 0..=MAX_BOUNDARY_RETRIES {
        let Some(window) = limit.checked_sub(offset) else {
            break;
        };
        match std::str::from_utf8(&bytes[..window]) {
            Ok(prefix) => return Cow::Owned(prefix.to_owned()),
            // Only an incomplete trailing sequence can fail here since
            // the input is valid UTF-8; shrink the window and retry.
            Err(err) if err.error_len().is_none() => continue,
            Err(_) => break,
        }
    }

    Cow::Owned(String::new())
}

/// Whether [`truncate`] changed the text, judged by content.
pub fn was_truncated(original: &str, sent: &str) -> bool {
    original != sent
}
