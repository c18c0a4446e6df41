//! UTF-8-safe truncation for human-readable output

use std::borrow::Cow;

/// Shorten `s` to at most `max_chars` characters for display.
///
/// Cuts at the last whitespace inside the limit when there is one and
/// appends `...`. Never splits a multi-byte character.
#[must_use]
pub fn truncate_for_display(s: &str, max_chars: usize) -> Cow<'_, str> {
    let Some((limit, _)) = s.char_indices().nth(max_chars) else {
        return Cow::Borrowed(s);
    };

    let cut = s[..limit]
        .rfind(char::is_whitespace)
        .filter(|&idx| idx > 0)
        .unwrap_or(limit);

    Cow::Owned(format!("{}...", s[..cut].trim_end()))
}
