//! Text helpers shared by renderers and reporters.

use std::borrow::Cow;

/// Appended when [`clip`] shortens its input
pub const CLIPPED_SUFFIX: &str = "\n[truncated]";

/// Largest char boundary of `s` at or below `index`
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Clip `text` to at most `max_bytes`, marking the cut with [`CLIPPED_SUFFIX`].
///
/// Text that already fits is borrowed unchanged. The suffix counts toward the
/// limit, and the cut never splits a UTF-8 character.
pub fn clip(text: &str, max_bytes: usize) -> Cow<'_, str> {
    if text.len() <= max_bytes {
        return Cow::Borrowed(text);
    }
    let keep = floor_char_boundary(text, max_bytes.saturating_sub(CLIPPED_SUFFIX.len()));
    Cow::Owned(format!("{}{}", &text[..keep], CLIPPED_SUFFIX))
}
