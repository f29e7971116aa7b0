//! Link reference definitions and the per-document reference map.

use std::collections::HashMap;

use crate::parsing::scanners;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub title: String,
}

/// Normalized label → definition. The first definition of a label wins.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    entries: HashMap<String, LinkReference>,
}

impl ReferenceMap {
    /// Inserts unless the normalized label is already defined. Returns
    /// whether the definition was kept.
    pub fn insert(&mut self, label: &str, reference: LinkReference) -> bool {
        let key = normalize_label(label);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, reference);
        true
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&LinkReference> {
        self.entries.get(&normalize_label(label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trims the label (and surrounding brackets, if given), collapses inner
/// whitespace runs to one space, and case-folds it.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    let inner = label
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .unwrap_or(label);
    inner
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
}

/// A reference definition parsed from the front of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// The label as written, brackets included.
    pub label: String,
    pub reference: LinkReference,
    /// Bytes of paragraph content the definition occupied, up to and
    /// including its line ending.
    pub consumed: usize,
}

fn skip_spaces(s: &str, i: usize) -> usize {
    i + s[i..]
        .bytes()
        .take_while(|&b| b == b' ' || b == b'\t')
        .count()
}

/// Skips spaces and at most one line ending.
fn skip_spaces_newline(s: &str, i: usize) -> usize {
    let i = skip_spaces(s, i);
    if s[i..].starts_with('\n') {
        skip_spaces(s, i + 1)
    } else {
        i
    }
}

/// Parses one link reference definition at the start of `s`.
pub fn parse_reference_definition(s: &str) -> Option<Definition> {
    let label_len = scanners::link_label(s)?;
    let label = &s[..label_len];
    if label[1..label_len - 1].trim().is_empty() {
        return None;
    }
    if !s[label_len..].starts_with(':') {
        return None;
    }

    let dest_start = skip_spaces_newline(s, label_len + 1);
    let (dest_len, url) = scanners::link_destination(&s[dest_start..])?;
    if dest_len == 0 {
        return None;
    }
    let after_dest = dest_start + dest_len;

    let before_title = after_dest;
    let title_start = skip_spaces_newline(s, before_title);
    let title = if title_start != before_title {
        scanners::link_title(&s[title_start..])
            .map(|(len, title)| (title_start + len, title))
    } else {
        None
    };

    let line_end = |from: usize| -> Option<usize> {
        let end = skip_spaces(s, from);
        match s[end..].bytes().next() {
            None => Some(end),
            Some(b'\n') => Some(end + 1),
            _ => None,
        }
    };

    // The title must be followed by the end of its line; otherwise it is not
    // part of the definition and the destination must end its own line.
    let (consumed, title) = match title.and_then(|(end, t)| line_end(end).map(|e| (e, t))) {
        Some((end, title)) => (end, title),
        None => (line_end(after_dest)?, String::new()),
    };

    Some(Definition {
        label: label.to_string(),
        reference: LinkReference { url, title },
        consumed,
    })
}
