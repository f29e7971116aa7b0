use std::borrow::Cow;

use super::span::Span;

/// One logical line of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef<'a> {
    /// Byte span of the line content in the source, excluding the terminator.
    pub span: Span,
    /// Line content with NUL replaced by U+FFFD. Tabs are left in place;
    /// their expansion is tracked as columns by the block engine.
    pub text: Cow<'a, str>,
    /// Offsets in `text` of each U+FFFD that replaced a NUL.
    pub replaced: Vec<usize>,
}

impl LineRef<'_> {
    /// Source offset of byte `at` of `text`.
    #[must_use]
    pub fn source_offset(&self, at: usize) -> usize {
        source_offset(self.span.start, &self.replaced, at)
    }
}

/// Source offset of byte `at` of a line's text, given where the line starts
/// and where NULs were widened to U+FFFD. Offsets inside a replacement land
/// just past its NUL.
#[must_use]
pub fn source_offset(line_start: usize, replaced: &[usize], at: usize) -> usize {
    let widened: usize = replaced
        .iter()
        .take_while(|&&r| r < at)
        .map(|&r| (at - r - 1).min(REPLACEMENT_WIDENING))
        .sum();
    line_start + at - widened
}

/// Extra bytes U+FFFD takes in the text over the NUL it replaces.
const REPLACEMENT_WIDENING: usize = '\u{fffd}'.len_utf8() - 1;

/// Splits `source` into lines terminated by `\n`, `\r\n` or `\r`.
///
/// A terminator at the very end does not start an extra empty line.
pub fn lines_with_spans(source: &str) -> Lines<'_> {
    Lines { source, offset: 0 }
}

pub struct Lines<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = LineRef<'a>;

    fn next(&mut self) -> Option<LineRef<'a>> {
        let start = self.offset;
        if start >= self.source.len() {
            return None;
        }
        let rest = &self.source[start..];
        let (len, terminator) = match rest.find(['\n', '\r']) {
            Some(i) if rest[i..].starts_with("\r\n") => (i, 2),
            Some(i) => (i, 1),
            None => (rest.len(), 0),
        };
        self.offset = start + len + terminator;

        let raw = &rest[..len];
        let mut replaced = Vec::new();
        let text = if raw.contains('\0') {
            let mut text = String::with_capacity(raw.len() + 2);
            for c in raw.chars() {
                if c == '\0' {
                    replaced.push(text.len());
                    text.push('\u{fffd}');
                } else {
                    text.push(c);
                }
            }
            Cow::Owned(text)
        } else {
            Cow::Borrowed(raw)
        };
        Some(LineRef {
            span: Span {
                start,
                end: start + len,
            },
            text,
            replaced,
        })
    }
}
