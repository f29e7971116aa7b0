use xi_rope::Rope;

use super::span::Span;

/// Copies the text under a span out of the rope.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    rope.slice_to_cow(sp.start..sp.end).into_owned()
}

/// Text under a span, cut to at most `max` bytes (on a char boundary) with a
/// `...` suffix when shortened. Used for outlines and snapshots.
pub fn preview(source: &str, sp: Span, max: usize) -> String {
    let end = sp.end.min(source.len());
    let text = source.get(sp.start.min(end)..end).unwrap_or_default();
    if text.len() <= max {
        return text.to_string();
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
