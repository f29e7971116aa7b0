//! Stateless recognizers for block starts and inline constructs.
//!
//! Every scanner looks at the start of the given text and reports how much of
//! it matched. A non-match is `None`; nothing here allocates unless it has to
//! return a decoded value.

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;

use crate::parsing::tree::HtmlBlockKind;

const TAGNAME: &str = "[A-Za-z][A-Za-z0-9-]*";
const ATTRIBUTE: &str = r#"(?:\s+[a-zA-Z_:][a-zA-Z0-9:._-]*(?:\s*=\s*(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*"))?)"#;

const BLOCK_TAGS: &str = "address|article|aside|base|basefont|blockquote|body|caption|center|col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame|frameset|h[123456]|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody|td|tfoot|th|thead|title|tr|track|ul";

fn open_tag() -> String {
    format!("<{TAGNAME}{ATTRIBUTE}*\\s*/?>")
}

fn close_tag() -> String {
    format!("</{TAGNAME}\\s*>")
}

fn html_block_starts() -> &'static [(Regex, HtmlBlockKind); 7] {
    static STARTS: OnceLock<[(Regex, HtmlBlockKind); 7]> = OnceLock::new();
    STARTS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("Invalid HTML block start regex");
        [
            (
                re(r"(?i)^<(?:script|pre|textarea|style)(?:\s|>|$)"),
                HtmlBlockKind::Raw,
            ),
            (re(r"^<!--"), HtmlBlockKind::Comment),
            (re(r"^<[?]"), HtmlBlockKind::ProcessingInstruction),
            (re(r"^<![A-Za-z]"), HtmlBlockKind::Declaration),
            (re(r"^<!\[CDATA\["), HtmlBlockKind::Cdata),
            (
                re(&format!(r"(?i)^</?(?:{BLOCK_TAGS})(?:\s|/?>|$)")),
                HtmlBlockKind::Block,
            ),
            (
                re(&format!(r"(?i)^(?:{}|{})\s*$", open_tag(), close_tag())),
                HtmlBlockKind::Tag,
            ),
        ]
    })
}

/// Which HTML block start condition, if any, `line` (from the first
/// non-space character) satisfies.
#[must_use]
pub fn html_block_start(line: &str) -> Option<HtmlBlockKind> {
    if !line.starts_with('<') {
        return None;
    }
    html_block_starts()
        .iter()
        .find(|(re, _)| re.is_match(line))
        .map(|(_, kind)| *kind)
}

/// Whether `line` contains the end marker of an HTML block of `kind`.
/// Blocks of kind 6 and 7 end at a blank line instead and never match here.
#[must_use]
pub fn html_block_end(kind: HtmlBlockKind, line: &str) -> bool {
    static RAW_END: OnceLock<Regex> = OnceLock::new();
    match kind {
        HtmlBlockKind::Raw => RAW_END
            .get_or_init(|| {
                Regex::new(r"(?i)</(?:script|pre|textarea|style)>")
                    .expect("Invalid HTML block end regex")
            })
            .is_match(line),
        HtmlBlockKind::Comment => line.contains("-->"),
        HtmlBlockKind::ProcessingInstruction => line.contains("?>"),
        HtmlBlockKind::Declaration => line.contains('>'),
        HtmlBlockKind::Cdata => line.contains("]]>"),
        HtmlBlockKind::Block | HtmlBlockKind::Tag => false,
    }
}

/// Length of an inline raw HTML construct at the start of `s`: open or
/// closing tag, comment, processing instruction, declaration or CDATA.
#[must_use]
pub fn html_tag(s: &str) -> Option<usize> {
    static HTML_TAG: OnceLock<Regex> = OnceLock::new();
    HTML_TAG
        .get_or_init(|| {
            let pattern = format!(
                r"^(?:{}|{}|<!-->|<!--->|(?s:<!--.*?-->)|(?s:<\?.*?\?>)|<![A-Za-z]+[^>]*>|(?s:<!\[CDATA\[.*?\]\]>))",
                open_tag(),
                close_tag()
            );
            Regex::new(&pattern).expect("Invalid inline HTML regex")
        })
        .find(s)
        .map(|m| m.end())
}

/// The terminator an inline comment, processing instruction, CDATA section
/// or declaration at the start of `s` has to reach. Tags have none.
#[must_use]
pub fn html_closer(s: &str) -> Option<&'static str> {
    let b = s.as_bytes();
    if b.starts_with(b"<!--") {
        Some("-->")
    } else if b.starts_with(b"<?") {
        Some("?>")
    } else if b.starts_with(b"<![CDATA[") {
        Some("]]>")
    } else if b.starts_with(b"<!") && b.get(2).is_some_and(u8::is_ascii_alphabetic) {
        Some(">")
    } else {
        None
    }
}

/// Length of a URI autolink (`<scheme:rest>`) at the start of `s`.
#[must_use]
pub fn autolink_uri(s: &str) -> Option<usize> {
    static URI: OnceLock<Regex> = OnceLock::new();
    URI.get_or_init(|| {
        Regex::new(r"^<[A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*>")
            .expect("Invalid autolink regex")
    })
    .find(s)
    .map(|m| m.end())
}

/// Length of an e-mail autolink (`<user@host>`) at the start of `s`.
#[must_use]
pub fn autolink_email(s: &str) -> Option<usize> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(
                r"^<[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*>",
            )
            .expect("Invalid email autolink regex")
        })
        .find(s)
        .map(|m| m.end())
}

/// Thematic break: three or more of one of `*`, `-`, `_`, optionally
/// separated by spaces or tabs, and nothing else on the line.
#[must_use]
pub fn thematic_break(line: &str) -> Option<usize> {
    let marker = match line.bytes().next()? {
        b @ (b'*' | b'-' | b'_') => b,
        _ => return None,
    };
    let mut count = 0;
    for b in line.bytes() {
        match b {
            _ if b == marker => count += 1,
            b' ' | b'\t' => {}
            _ => return None,
        }
    }
    (count >= 3).then_some(line.len())
}

/// Opening code fence: returns the fence character and run length.
/// Backtick fences may not have a backtick anywhere in their info string.
#[must_use]
pub fn code_fence_open(line: &str) -> Option<(char, usize)> {
    let fence = match line.bytes().next()? {
        b @ (b'`' | b'~') => b,
        _ => return None,
    };
    let len = line.bytes().take_while(|&b| b == fence).count();
    if len < 3 {
        return None;
    }
    if fence == b'`' && line[len..].contains('`') {
        return None;
    }
    Some((fence as char, len))
}

/// Closing code fence of at least `min_len` characters followed only by
/// spaces or tabs.
#[must_use]
pub fn code_fence_close(line: &str, fence: char, min_len: usize) -> bool {
    let len = line.chars().take_while(|&c| c == fence).count();
    len >= 3 && len >= min_len && line[len..].bytes().all(|b| b == b' ' || b == b'\t')
}

/// ATX heading opener: returns the level and the length of the marker plus
/// the whitespace after it.
#[must_use]
pub fn atx_heading(line: &str) -> Option<(u8, usize)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    match rest.bytes().next() {
        None => Some((level as u8, level)),
        Some(b' ' | b'\t') => {
            let ws = rest.bytes().take_while(|&b| b == b' ' || b == b'\t').count();
            Some((level as u8, level + ws))
        }
        _ => None,
    }
}

/// Removes an optional closing `#` sequence (preceded by a space or tab, or
/// making up the whole content) and surrounding whitespace from ATX heading
/// content.
#[must_use]
pub fn strip_atx_closing(content: &str) -> &str {
    let trimmed = content.trim_end_matches([' ', '\t']);
    let without_hashes = trimmed.trim_end_matches('#');
    if without_hashes.len() == trimmed.len() {
        return trimmed;
    }
    if without_hashes.is_empty() {
        return "";
    }
    if without_hashes.ends_with([' ', '\t']) {
        return without_hashes.trim_end_matches([' ', '\t']);
    }
    trimmed
}

/// Setext underline: a run of `=` (level 1) or `-` (level 2), optionally
/// followed by spaces or tabs.
#[must_use]
pub fn setext_underline(line: &str) -> Option<u8> {
    let level = match line.bytes().next()? {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    let marker = line.as_bytes()[0];
    let run = line.bytes().take_while(|&b| b == marker).count();
    line[run..]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
        .then_some(level)
}

/// An entity or numeric character reference at the start of `s`: returns
/// the consumed length and the decoded text.
#[must_use]
pub fn entity(s: &str) -> Option<(usize, String)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }
    // `&`, at most 32 name characters, `;`.
    let end = s.bytes().take(34).position(|b| b == b';')?;
    let body = &s[1..end];
    let len = end + 1;

    if let Some(num) = body.strip_prefix('#') {
        let (digits, radix, max) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 6),
            None => (num, 10, 7),
        };
        if digits.is_empty()
            || digits.len() > max
            || !digits.chars().all(|c| c.is_digit(radix))
        {
            return None;
        }
        let value = u32::from_str_radix(digits, radix).ok()?;
        let c = match value {
            0 => char::REPLACEMENT_CHARACTER,
            v => char::from_u32(v).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        return Some((len, c.to_string()));
    }

    let mut chars = body.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !first_ok || body.len() < 2 || body.len() > 32 || !chars.all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    named_entities()
        .get(&s[..len])
        .map(|decoded| (len, (*decoded).to_string()))
}

/// The HTML5 named character references, keyed by `&name;`. Legacy forms
/// without the semicolon are left out.
fn named_entities() -> &'static HashMap<&'static str, &'static str> {
    static NAMED: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    NAMED.get_or_init(|| {
        entities::ENTITIES
            .iter()
            .filter(|e| e.entity.ends_with(';'))
            .map(|e| (e.entity, e.characters))
            .collect()
    })
}

/// Resolves backslash escapes and entity references.
#[must_use]
pub fn unescape_string(s: &str) -> String {
    if !s.contains(['\\', '&']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        let c = rest.chars().next().unwrap_or_default();
        if c == '\\'
            && let Some(next) = rest[1..].chars().next()
            && next.is_ascii_punctuation()
        {
            out.push(next);
            i += 2;
            continue;
        }
        if c == '&'
            && let Some((len, decoded)) = entity(rest)
        {
            out.push_str(&decoded);
            i += len;
            continue;
        }
        out.push(c);
        i += c.len_utf8();
    }
    out
}

/// Link label `[...]` at the start of `s`: at most 999 characters inside, no
/// unescaped brackets. Returns the length including both brackets.
#[must_use]
pub fn link_label(s: &str) -> Option<usize> {
    if !s.starts_with('[') {
        return None;
    }
    let mut chars = s.char_indices().skip(1);
    let mut count = 0;
    while let Some((i, c)) = chars.next() {
        match c {
            ']' => return (count <= 999).then_some(i + 1),
            '[' => return None,
            '\\' => {
                if chars.next().is_some() {
                    count += 1;
                }
            }
            _ => {}
        }
        count += 1;
        if count > 999 {
            return None;
        }
    }
    None
}

/// Unescaped parentheses a bare link destination may nest.
pub const MAX_DESTINATION_NESTING: usize = 32;

/// Link destination at the start of `s`, either `<...>` or a run without
/// spaces or control characters and with balanced parentheses nested at most
/// [`MAX_DESTINATION_NESTING`] deep. Returns the consumed length and the
/// unescaped destination.
#[must_use]
pub fn link_destination(s: &str) -> Option<(usize, String)> {
    if let Some(rest) = s.strip_prefix('<') {
        let mut chars = rest.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '>' => return Some((i + 2, unescape_string(&rest[..i]))),
                '<' | '\n' => return None,
                '\\' => {
                    if let Some((_, '\n')) | None = chars.next() {
                        return None;
                    }
                }
                _ => {}
            }
        }
        return None;
    }

    let bytes = s.as_bytes();
    let mut i = 0;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
            b'(' => {
                if depth == MAX_DESTINATION_NESTING {
                    return None;
                }
                depth += 1;
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                i += 1;
            }
            b if b == b' ' || b.is_ascii_control() => break,
            _ => i += 1,
        }
    }
    if i == 0 && bytes.first() != Some(&b')') {
        return None;
    }
    if depth != 0 {
        return None;
    }
    Some((i, unescape_string(&s[..i])))
}

/// Link title at the start of `s` in `"..."`, `'...'` or `(...)` form.
/// Returns the consumed length and the unescaped title.
#[must_use]
pub fn link_title(s: &str) -> Option<(usize, String)> {
    let open = s.chars().next()?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut chars = s.char_indices().skip(1);
    let mut last_newline = None;
    while let Some((i, c)) = chars.next() {
        match c {
            _ if c == close => return Some((i + 1, unescape_string(&s[1..i]))),
            '(' if open == '(' => return None,
            '\\' => {
                chars.next();
            }
            '\n' => {
                // A blank line cannot sit inside a title.
                if let Some(prev) = last_newline
                    && s[prev + 1..i].trim().is_empty()
                {
                    return None;
                }
                last_newline = Some(i);
            }
            _ => {}
        }
    }
    None
}
