use crate::parsing::{
    blocks::builder::{BlockBuilder, Continuation},
    chars::is_space_or_tab,
    registry::BlockStart,
    tree::{BlockId, BlockTag, Document, ListData, ListKind, Numbering},
};

/// A list marker recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ListKind,
    pub start: u64,
    /// Byte length of the marker itself.
    pub len: usize,
}

/// Recognizes a marker at the start of the given text.
pub type MarkerScanner = fn(&str) -> Option<ListMarker>;

/// Lists and list items. A list is implicit: it opens with its first item
/// and holds consecutive items whose markers match.
pub struct List;

impl List {
    pub const BULLETS: [char; 3] = ['-', '+', '*'];
    /// At most nine digits, so the start number always fits.
    pub const MAX_DIGITS: usize = 9;
    /// Spaces after a marker beyond this many start indented code instead.
    const MAX_PADDING: usize = 4;

    #[must_use]
    pub fn bullet_marker(s: &str) -> Option<ListMarker> {
        let c = s.chars().next().filter(|c| Self::BULLETS.contains(c))?;
        Some(ListMarker {
            kind: ListKind::Bullet(c),
            start: 0,
            len: 1,
        })
    }

    #[must_use]
    pub fn decimal_marker(s: &str) -> Option<ListMarker> {
        let digits = s.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits > Self::MAX_DIGITS {
            return None;
        }
        let delimiter = match s.as_bytes().get(digits) {
            Some(b'.') => '.',
            Some(b')') => ')',
            _ => return None,
        };
        Some(ListMarker {
            kind: ListKind::Ordered {
                delimiter,
                numbering: Numbering::Decimal,
            },
            start: s[..digits].parse().ok()?,
            len: digits + 1,
        })
    }

    pub fn open_bullet(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        Self::open_item_with(b, container, Self::bullet_marker)
    }

    pub fn open_ordered(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        Self::open_item_with(b, container, Self::decimal_marker)
    }

    /// Opens a list item whose marker `scan` recognizes, plus a new list
    /// when the item does not continue the open one.
    pub fn open_item_with(
        b: &mut BlockBuilder<'_>,
        container: BlockId,
        scan: MarkerScanner,
    ) -> BlockStart {
        if b.indented() {
            return BlockStart::NoMatch;
        }
        let Some(marker) = scan(b.rest()) else {
            return BlockStart::NoMatch;
        };
        let after = &b.rest()[marker.len..];
        if !after.is_empty() && !after.as_bytes().first().copied().is_some_and(is_space_or_tab) {
            return BlockStart::NoMatch;
        }
        if matches!(b.block(container).tag, BlockTag::Paragraph) {
            let ordered = matches!(marker.kind, ListKind::Ordered { .. });
            if (ordered && marker.start != 1) || after.trim().is_empty() {
                return BlockStart::NoMatch;
            }
        }

        let marker_offset = b.indent();
        b.advance_next_nonspace();
        b.advance_offset(marker.len, true);
        let (spaces_offset, spaces_column) = (b.offset(), b.column());
        loop {
            b.advance_offset(1, true);
            let more = b.byte_at(b.offset()).is_some_and(is_space_or_tab);
            if !(more && b.column() - spaces_column <= Self::MAX_PADDING) {
                break;
            }
        }
        let blank_item = b.byte_at(b.offset()).is_none();
        let spaces = b.column() - spaces_column;
        let padding = if spaces > Self::MAX_PADDING || spaces < 1 || blank_item {
            b.set_position(spaces_offset, spaces_column);
            b.skip_optional_space();
            marker.len + 1
        } else {
            marker.len + spaces
        };

        let data = ListData {
            kind: marker.kind,
            start: marker.start,
            tight: true,
            marker_offset,
            padding,
        };
        b.close_unmatched_blocks();
        let at = b.next_nonspace();
        let continues_list = match &b.block(b.tip()).tag {
            BlockTag::List(open) => open.matches(&data),
            _ => false,
        };
        if !continues_list {
            b.add_child(BlockTag::List(data.clone()), at);
        }
        b.add_child(BlockTag::ListItem(data), at);
        BlockStart::Container
    }

    pub fn item_continues(b: &mut BlockBuilder<'_>, id: BlockId) -> Continuation {
        let Some(width) = b
            .block(id)
            .tag
            .list_data()
            .map(|data| data.marker_offset + data.padding)
        else {
            return Continuation::Failed;
        };
        if b.blank() {
            if b.document().blocks().first_child(id).is_none() {
                return Continuation::Failed;
            }
            b.advance_next_nonspace();
            Continuation::Matched
        } else if b.indent() >= width {
            b.advance_offset(width, true);
            Continuation::Matched
        } else {
            Continuation::Failed
        }
    }

    pub fn finalize(b: &mut BlockBuilder<'_>, id: BlockId) {
        let tight = b.options().force_tight_lists || is_tight(b.document(), id);
        if let BlockTag::List(data) = &mut b.block_mut(id).tag {
            data.tight = tight;
        }
        let items: Vec<_> = b.document().children(id).collect();
        for item in items {
            if let BlockTag::ListItem(data) = &mut b.block_mut(item).tag {
                data.tight = tight;
            }
        }
    }
}

/// A list is loose when a blank line separates two of its items, or two
/// blocks directly inside one of its items.
fn is_tight(doc: &Document, list: BlockId) -> bool {
    let blocks = doc.blocks();
    for item in blocks.children(list) {
        let item_has_next = blocks.next(item).is_some();
        if doc.block(item).last_line_blank && item_has_next {
            return false;
        }
        for sub in blocks.children(item) {
            if (item_has_next || blocks.next(sub).is_some()) && ends_with_blank_line(doc, sub) {
                return false;
            }
        }
    }
    true
}

fn ends_with_blank_line(doc: &Document, id: BlockId) -> bool {
    let mut current = Some(id);
    while let Some(block) = current {
        if doc.block(block).last_line_blank {
            return true;
        }
        current = match doc.block(block).tag {
            BlockTag::List(_) | BlockTag::ListItem(_) => doc.blocks().last_child(block),
            _ => None,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ParseOptions, Parser, parse, registry::Registry, tree::BlockKind};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lists(doc: &Document) -> Vec<ListData> {
        doc.descendants()
            .filter_map(|id| match &doc.block(id).tag {
                BlockTag::List(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case("1.", Some((1, 2)))]
    #[case("007)", Some((7, 4)))]
    #[case("123456789.", Some((123_456_789, 10)))]
    #[case("1234567890.", None)]
    #[case("1-", None)]
    #[case(".", None)]
    fn decimal_markers(#[case] input: &str, #[case] expected: Option<(u64, usize)>) {
        assert_eq!(
            List::decimal_marker(input).map(|m| (m.start, m.len)),
            expected
        );
    }

    #[test]
    fn changing_bullet_starts_new_list() {
        let doc = parse("- a\n- b\n+ c");
        let top: Vec<_> = doc.children(doc.root()).map(|id| doc.block(id).kind()).collect();
        assert_eq!(top, vec![BlockKind::List, BlockKind::List]);
    }

    #[test]
    fn padding_includes_following_spaces() {
        let doc = parse("1.  one\n\n    two");
        let data = &lists(&doc)[0];
        assert_eq!((data.marker_offset, data.padding), (0, 4));
        let item = doc.children(doc.root()).flat_map(|l| doc.children(l)).next().unwrap();
        assert_eq!(doc.children(item).count(), 2);
    }

    #[test]
    fn five_spaces_after_marker_is_code() {
        let doc = parse("-     code");
        let data = &lists(&doc)[0];
        assert_eq!(data.padding, 2);
        let item = doc.children(doc.root()).flat_map(|l| doc.children(l)).next().unwrap();
        let child = doc.children(item).next().unwrap();
        assert_eq!(doc.block(child).kind(), BlockKind::IndentedCode);
    }

    #[rstest]
    #[case("- a\n- b", true)]
    #[case("- a\n\n- b", false)]
    #[case("- a\n\n  b", false)]
    #[case("- a\n  - b\n\n    c", true)]
    #[case("- a\n\n", true)]
    fn tightness(#[case] input: &str, #[case] tight: bool) {
        let doc = parse(input);
        assert_eq!(lists(&doc)[0].tight, tight);
    }

    #[test]
    fn forced_tight() {
        let registry = Registry::commonmark();
        let options = ParseOptions {
            force_tight_lists: true,
            ..ParseOptions::default()
        };
        let doc = Parser::new(&registry, options).parse_str("- a\n\n- b");
        assert!(lists(&doc)[0].tight);
    }

    #[test]
    fn ordered_list_interrupts_paragraph_only_from_one() {
        let doc = parse("text\n2. no\n1. yes");
        let top: Vec<_> = doc.children(doc.root()).map(|id| doc.block(id).kind()).collect();
        assert_eq!(top, vec![BlockKind::Paragraph, BlockKind::List]);
    }
}
