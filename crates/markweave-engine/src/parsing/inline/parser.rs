use crate::parsing::{
    blocks::PositionLedger,
    chars::Flanking,
    refs::ReferenceMap,
    registry::{RESERVED_INLINE_CHARS, Registry},
    rope::Span,
    scanners,
    tree::{Arena, Inline, InlineId, InlineTag, LinkData},
};

use super::{
    cursor::Cursor,
    delimiters::{Delimiter, DelimiterStack},
    kinds::CodeSpan,
};

/// Parses the text of one leaf block into a chain of inline nodes under a
/// fresh `Root`.
///
/// The subject is the block content with surrounding whitespace trimmed.
/// Everything the parser recognizes is dispatched on its first byte;
/// anything else is collected into literal text runs.
pub struct InlineParser<'a> {
    pub(super) registry: &'a Registry,
    pub(super) refs: &'a ReferenceMap,
    pub(super) arena: &'a mut Arena<Inline>,
    ledger: Option<&'a PositionLedger>,
    pub(super) cur: Cursor<'a>,
    pub(super) root: InlineId,
    pub(super) stack: DelimiterStack,
    /// HTML closers with no occurrence left in the subject.
    missing_closers: Vec<&'static str>,
}

impl<'a> InlineParser<'a> {
    pub fn new(
        registry: &'a Registry,
        refs: &'a ReferenceMap,
        arena: &'a mut Arena<Inline>,
        ledger: Option<&'a PositionLedger>,
        content: &'a str,
    ) -> Self {
        let trimmed = content.trim_start();
        let base = content.len() - trimmed.len();
        let subject = trimmed.trim_end();
        let root = arena.alloc(Inline::new(InlineTag::Root, None));
        let parser = Self {
            registry,
            refs,
            arena,
            ledger,
            cur: Cursor::new(subject, base),
            root,
            stack: DelimiterStack::default(),
            missing_closers: Vec::new(),
        };
        parser.arena[root].span = parser.span(0, subject.len());
        parser
    }

    /// Consumes the whole subject and returns the root node.
    pub fn run(mut self) -> InlineId {
        while let Some(b) = self.cur.peek() {
            let handled = match b {
                b'\n' => {
                    self.newline();
                    true
                }
                b'\\' => {
                    self.backslash();
                    true
                }
                CodeSpan::TICK => {
                    self.backticks();
                    true
                }
                b'[' => {
                    self.open_bracket(false);
                    true
                }
                b'!' => self.bang(),
                b']' => {
                    self.close_bracket();
                    true
                }
                b'<' => self.autolink() || self.inline_html(),
                b'&' => self.entity(),
                _ if self.registry.is_delimiter(b) => self.delimiter_run(b),
                _ => false,
            };
            if !handled {
                self.literal_run();
            }
        }

        // Unmatched brackets stay as the literal text they already are.
        self.stack.remove_brackets();
        self.process_emphasis(None);
        merge_text(self.arena, self.root);
        self.root
    }

    /// Source span for subject range `start..end`, when positions are tracked.
    pub(super) fn span(&self, start: usize, end: usize) -> Option<Span> {
        let ledger = self.ledger?;
        let base = self.cur.base;
        let from = ledger.map(base + start);
        let to = if end > start {
            ledger.map_end(base + end)
        } else {
            from
        };
        Some(Span::new(from, to.max(from)))
    }

    /// Appends a node to the root chain.
    pub(super) fn append(&mut self, tag: InlineTag, start: usize, end: usize) -> InlineId {
        let span = self.span(start, end);
        let id = self.arena.alloc(Inline::new(tag, span));
        self.arena.append_child(self.root, id);
        id
    }

    pub(super) fn text(&mut self, text: impl Into<String>, start: usize, end: usize) -> InlineId {
        self.append(InlineTag::Text(text.into()), start, end)
    }

    pub(super) fn set_text(&mut self, id: InlineId, text: String, start: usize, end: usize) {
        let span = self.span(start, end);
        let node = &mut self.arena[id];
        node.tag = InlineTag::Text(text);
        node.span = span;
    }

    /// Text up to the next byte some handler might claim. The first
    /// character is always taken, since its handler already declined it.
    fn literal_run(&mut self) {
        let start = self.cur.i;
        let first = self.cur.char_at(start).map_or(1, char::len_utf8);
        self.cur.bump_n(first);
        let registry = self.registry;
        self.cur.skip_while(|b| !is_special(registry, b));
        let text = self.cur.s[start..self.cur.i].to_string();
        self.text(text, start, self.cur.i);
    }

    /// Soft break, or hard break after two or more spaces. Trailing spaces
    /// of the line and leading spaces of the next are dropped.
    fn newline(&mut self) {
        let at = self.cur.i;
        self.cur.bump();

        let mut spaces = 0;
        if let Some(last) = self.arena.last_child(self.root)
            && let InlineTag::Text(text) = &mut self.arena[last].tag
        {
            let kept = text.trim_end_matches(' ').len();
            spaces = text.len() - kept;
            text.truncate(kept);
            if let Some(span) = &mut self.arena[last].span {
                span.end = span.end.saturating_sub(spaces).max(span.start);
            }
        }
        let tag = if spaces >= 2 {
            InlineTag::HardBreak
        } else {
            InlineTag::SoftBreak
        };
        self.append(tag, at - spaces, self.cur.i);
        self.cur.skip_while(|b| b == b' ');
    }

    fn backslash(&mut self) {
        let start = self.cur.i;
        self.cur.bump();
        match self.cur.peek() {
            Some(b'\n') => {
                self.cur.bump();
                self.append(InlineTag::HardBreak, start, self.cur.i);
            }
            Some(b) if b.is_ascii_punctuation() => {
                self.cur.bump();
                self.text(char::from(b), start, self.cur.i);
            }
            _ => {
                self.text("\\", start, self.cur.i);
            }
        }
    }

    fn backticks(&mut self) {
        let start = self.cur.i;
        let ticks = self.cur.skip_while(|b| b == CodeSpan::TICK);
        let after = self.cur.i;
        match CodeSpan::find_closer(self.cur.rest(), ticks) {
            Some(offset) => {
                let code = CodeSpan::normalize(&self.cur.s[after..after + offset]);
                self.cur.i = after + offset + ticks;
                self.append(InlineTag::Code(code), start, self.cur.i);
            }
            None => {
                self.text("`".repeat(ticks), start, after);
            }
        }
    }

    fn entity(&mut self) -> bool {
        let Some((len, decoded)) = scanners::entity(self.cur.rest()) else {
            return false;
        };
        let start = self.cur.i;
        self.cur.bump_n(len);
        self.text(decoded, start, self.cur.i);
        true
    }

    fn autolink(&mut self) -> bool {
        let rest = self.cur.rest();
        let (len, mailto) = match scanners::autolink_uri(rest) {
            Some(len) => (len, false),
            None => match scanners::autolink_email(rest) {
                Some(len) => (len, true),
                None => return false,
            },
        };
        let start = self.cur.i;
        let dest = rest[1..len - 1].to_string();
        let url = if mailto {
            format!("mailto:{dest}")
        } else {
            dest.clone()
        };
        self.cur.bump_n(len);
        let link = self.append(
            InlineTag::Link(LinkData {
                url,
                title: String::new(),
            }),
            start,
            self.cur.i,
        );
        let label_span = self.span(start + 1, self.cur.i - 1);
        let label = self
            .arena
            .alloc(Inline::new(InlineTag::Text(dest), label_span));
        self.arena.append_child(link, label);
        true
    }

    fn inline_html(&mut self) -> bool {
        let rest = self.cur.rest();
        let closer = scanners::html_closer(rest);
        if closer.is_some_and(|c| self.missing_closers.contains(&c)) {
            return false;
        }
        let Some(len) = scanners::html_tag(rest) else {
            // The cursor only moves forward, so a closer missing now stays
            // missing for every later `<`.
            if let Some(c) = closer
                && !rest.contains(c)
            {
                self.missing_closers.push(c);
            }
            return false;
        };
        let start = self.cur.i;
        let raw = self.cur.rest()[..len].to_string();
        self.cur.bump_n(len);
        self.append(InlineTag::Html(raw), start, self.cur.i);
        true
    }

    /// A run of one registered delimiter character. The run becomes a text
    /// node; if it may open or close, it also goes on the stack.
    fn delimiter_run(&mut self, b: u8) -> bool {
        let ch = char::from(b);
        let Some(chain) = self.registry.delimiter(ch) else {
            return false;
        };
        let start = self.cur.i;
        let len = self.cur.skip_while(|x| x == b);
        let flanking = Flanking::new(self.cur.char_before(start), self.cur.char_at(self.cur.i));
        let flags = chain.flags(&flanking);

        let node = self.text(ch.to_string().repeat(len), start, self.cur.i);
        if flags.0 || flags.1 {
            self.stack.push(Delimiter::run(node, ch, start, len, flags));
        }
        true
    }
}

fn is_special(registry: &Registry, b: u8) -> bool {
    RESERVED_INLINE_CHARS.contains(&char::from(b)) || registry.is_delimiter(b)
}

/// Joins adjacent text nodes and drops empty ones.
fn merge_text(arena: &mut Arena<Inline>, root: InlineId) {
    let containers: Vec<_> = arena
        .descendants(root)
        .filter(|&id| arena[id].tag.is_container())
        .collect();
    for parent in containers {
        let mut child = arena.first_child(parent);
        while let Some(id) = child {
            let next = arena.next(id);
            let InlineTag::Text(text) = &arena[id].tag else {
                child = next;
                continue;
            };
            if text.is_empty() {
                arena.detach(id);
                child = next;
                continue;
            }
            let Some(following) = next else {
                break;
            };
            let tail = match &mut arena[following].tag {
                InlineTag::Text(tail) => std::mem::take(tail),
                _ => {
                    child = next;
                    continue;
                }
            };
            let tail_span = arena[following].span;
            arena.detach(following);
            let node = &mut arena[id];
            if let InlineTag::Text(text) = &mut node.tag {
                text.push_str(&tail);
            }
            node.span = match (node.span, tail_span) {
                (Some(a), Some(b)) => Some(a.cover(b)),
                (a, _) => a,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::{
        ParseOptions, Parser, parse,
        registry::Registry,
        tree::{Document, InlineId, InlineTag},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Compact s-expression of the first block's inlines.
    fn sexp(doc: &Document, id: InlineId) -> String {
        let node = doc.inline(id);
        let children: Vec<_> = doc.inline_children(id).map(|c| sexp(doc, c)).collect();
        match &node.tag {
            InlineTag::Text(t) => format!("{t:?}"),
            InlineTag::Code(t) => format!("(code {t:?})"),
            InlineTag::Html(t) => format!("(html {t:?})"),
            InlineTag::Math(t) => format!("(math {t:?})"),
            InlineTag::Link(l) | InlineTag::Image(l) => {
                format!("({} {:?} {})", node.tag.name(), l.url, children.join(" "))
            }
            tag if tag.is_container() => format!("({} {})", tag.name(), children.join(" ")),
            tag => tag.name().to_string(),
        }
    }

    fn first(text: &str) -> String {
        let doc = parse(text);
        let block = doc
            .descendants()
            .find(|&id| doc.block(id).inline_root().is_some())
            .expect("no inline block");
        let root = doc.block(block).inline_root().unwrap();
        sexp(&doc, root)
    }

    #[rstest]
    #[case("hello  world", r#"(Root "hello  world")"#)]
    #[case("a\\*b\\q", r#"(Root "a*b\\q")"#)]
    #[case("foo  \nbar", r#"(Root "foo" HardBreak "bar")"#)]
    #[case("foo \n  bar", r#"(Root "foo" SoftBreak "bar")"#)]
    #[case("foo\\\nbar", r#"(Root "foo" HardBreak "bar")"#)]
    #[case("`` a`b ``", r#"(Root (code "a`b"))"#)]
    #[case("``not closed`", r#"(Root "``not closed`")"#)]
    #[case("&copy; &#35; &bogus;", r#"(Root "© # &bogus;")"#)]
    #[case("<https://x.org/a>", r#"(Root (Link "https://x.org/a" "https://x.org/a"))"#)]
    #[case("<me@x.org>", r#"(Root (Link "mailto:me@x.org" "me@x.org"))"#)]
    #[case("a <b class=\"c\"> d", r#"(Root "a " (html "<b class=\"c\">") " d")"#)]
    #[case("a < b", r#"(Root "a < b")"#)]
    #[case("<? a <!-- b", r#"(Root "<? a <!-- b")"#)]
    #[case("<!-- a <? b ?>", r#"(Root "<!-- a " (html "<? b ?>"))"#)]
    fn core_constructs(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(first(input), expected);
    }

    #[test]
    fn spans_map_through_container_prefixes() {
        let registry = Registry::commonmark();
        let options = ParseOptions {
            track_positions: true,
            ..ParseOptions::default()
        };
        let source = "> *ab*\n> cd";
        let doc = Parser::new(&registry, options).parse_str(source);
        let para = doc
            .descendants()
            .find(|&id| doc.block(id).inline_root().is_some())
            .unwrap();
        let root = doc.block(para).inline_root().unwrap();
        let spans: Vec<_> = doc
            .inline_children(root)
            .map(|id| {
                let span = doc.inline(id).span.unwrap();
                &source[span.start..span.end]
            })
            .collect();
        assert_eq!(spans, vec!["*ab*", "\n", "cd"]);
    }

    #[test]
    fn spans_skip_over_replaced_nuls() {
        let registry = Registry::commonmark();
        let options = ParseOptions {
            track_positions: true,
            ..ParseOptions::default()
        };
        let source = "\0\0 *b*";
        let doc = Parser::new(&registry, options).parse_str(source);
        crate::parsing::snapshot::invariants(&doc);
        let para = doc
            .descendants()
            .find(|&id| doc.block(id).inline_root().is_some())
            .unwrap();
        let root = doc.block(para).inline_root().unwrap();
        let emphasis = doc
            .inline_children(root)
            .find(|&id| matches!(doc.inline(id).tag, InlineTag::Emphasis))
            .unwrap();
        let span = doc.inline(emphasis).span.unwrap();
        assert_eq!((span.start, span.end), (3, 6));
        assert_eq!(&source[span.start..span.end], "*b*");
    }
}
