use crate::parsing::{blocks::ledger::PositionLedger, rope::Span};

use super::InlineId;

/// A block-level node.
#[derive(Debug, Clone)]
pub struct Block {
    pub tag: BlockTag,
    pub content: BlockContent,
    /// Source byte range, present only when position tracking is enabled.
    pub span: Option<Span>,
    pub(crate) open: bool,
    pub(crate) last_line_blank: bool,
    pub(crate) start_line: usize,
    pub(crate) ledger: Option<PositionLedger>,
}

impl Block {
    pub(crate) fn new(tag: BlockTag, start_line: usize) -> Self {
        Self {
            tag,
            content: BlockContent::Empty,
            span: None,
            open: true,
            last_line_blank: false,
            start_line,
            ledger: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.tag.kind()
    }

    /// The raw buffered text of a block that has not been inline-processed.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// The verbatim text of a code or HTML block.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// The inline chain container of a processed leaf block.
    #[must_use]
    pub fn inline_root(&self) -> Option<InlineId> {
        match self.content {
            BlockContent::Inlines(root) => Some(root),
            _ => None,
        }
    }
}

/// What a block currently holds.
///
/// `Raw` and `Inlines` are the before/after states of inline processing for
/// the same block; a block is never in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockContent {
    #[default]
    Empty,
    Raw(String),
    Literal(String),
    Inlines(InlineId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTag {
    Document,
    BlockQuote,
    List(ListData),
    ListItem(ListData),
    Paragraph,
    Heading(HeadingData),
    IndentedCode,
    FencedCode(FenceData),
    HtmlBlock(HtmlBlockKind),
    ThematicBreak,
    ReferenceDefinition,
    Table(TableData),
    TableRow { header: bool },
    TableCell,
}

/// Fieldless discriminant of [`BlockTag`], used where only the shape matters
/// (registry declarations, snapshots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Document,
    BlockQuote,
    List,
    ListItem,
    Paragraph,
    Heading,
    IndentedCode,
    FencedCode,
    HtmlBlock,
    ThematicBreak,
    ReferenceDefinition,
    Table,
    TableRow,
    TableCell,
}

impl BlockTag {
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockTag::Document => BlockKind::Document,
            BlockTag::BlockQuote => BlockKind::BlockQuote,
            BlockTag::List(_) => BlockKind::List,
            BlockTag::ListItem(_) => BlockKind::ListItem,
            BlockTag::Paragraph => BlockKind::Paragraph,
            BlockTag::Heading(_) => BlockKind::Heading,
            BlockTag::IndentedCode => BlockKind::IndentedCode,
            BlockTag::FencedCode(_) => BlockKind::FencedCode,
            BlockTag::HtmlBlock(_) => BlockKind::HtmlBlock,
            BlockTag::ThematicBreak => BlockKind::ThematicBreak,
            BlockTag::ReferenceDefinition => BlockKind::ReferenceDefinition,
            BlockTag::Table(_) => BlockKind::Table,
            BlockTag::TableRow { .. } => BlockKind::TableRow,
            BlockTag::TableCell => BlockKind::TableCell,
        }
    }

    /// Whether a block with this tag may hold `child` as a direct child.
    #[must_use]
    pub fn can_contain(&self, child: BlockKind) -> bool {
        match self {
            BlockTag::Document | BlockTag::BlockQuote | BlockTag::ListItem(_) => {
                child != BlockKind::ListItem
            }
            BlockTag::List(_) => child == BlockKind::ListItem,
            BlockTag::Table(_) => child == BlockKind::TableRow,
            BlockTag::TableRow { .. } => child == BlockKind::TableCell,
            _ => false,
        }
    }

    /// Leaf blocks that buffer the remainder of each continuation line.
    #[must_use]
    pub fn accepts_lines(&self) -> bool {
        matches!(
            self,
            BlockTag::Paragraph
                | BlockTag::IndentedCode
                | BlockTag::FencedCode(_)
                | BlockTag::HtmlBlock(_)
                | BlockTag::Table(_)
        )
    }

    /// Leaves whose lines are taken verbatim: no container starts are tried
    /// inside them.
    #[must_use]
    pub fn is_verbatim(&self) -> bool {
        matches!(
            self,
            BlockTag::IndentedCode | BlockTag::FencedCode(_) | BlockTag::HtmlBlock(_)
        )
    }

    /// Leaves whose buffered text goes through the inline parser.
    #[must_use]
    pub fn has_inlines(&self) -> bool {
        matches!(
            self,
            BlockTag::Paragraph | BlockTag::Heading(_) | BlockTag::TableCell
        )
    }

    #[must_use]
    pub fn list_data(&self) -> Option<&ListData> {
        match self {
            BlockTag::List(data) | BlockTag::ListItem(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    Decimal,
    LowerRoman,
    UpperRoman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet(char),
    Ordered { delimiter: char, numbering: Numbering },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListData {
    pub kind: ListKind,
    pub start: u64,
    pub tight: bool,
    /// Indent of the marker relative to the enclosing container.
    pub marker_offset: usize,
    /// Marker width plus the spaces that follow it.
    pub padding: usize,
}

impl ListData {
    /// Whether an item with `other`'s marker continues a list started with
    /// `self`'s marker.
    #[must_use]
    pub fn matches(&self, other: &ListData) -> bool {
        match (self.kind, other.kind) {
            (ListKind::Bullet(a), ListKind::Bullet(b)) => a == b,
            (
                ListKind::Ordered {
                    delimiter: d1,
                    numbering: n1,
                },
                ListKind::Ordered {
                    delimiter: d2,
                    numbering: n2,
                },
            ) => d1 == d2 && n1 == n2,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingData {
    pub level: u8,
    pub setext: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceData {
    pub fence_char: char,
    pub fence_length: usize,
    pub fence_offset: usize,
    pub info: String,
}

/// The start condition an HTML block was opened with; each has its own end
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlBlockKind {
    /// `<script`, `<pre`, `<textarea`, `<style`
    Raw,
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    /// A known block-level tag name.
    Block,
    /// Any other complete open or closing tag alone on its line.
    Tag,
}

impl HtmlBlockKind {
    /// Kinds 6 and 7 end at the first blank line; the rest end at a marker.
    #[must_use]
    pub fn ends_at_blank_line(self) -> bool {
        matches!(self, HtmlBlockKind::Block | HtmlBlockKind::Tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub alignments: Vec<Alignment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(c: char) -> ListData {
        ListData {
            kind: ListKind::Bullet(c),
            start: 1,
            tight: true,
            marker_offset: 0,
            padding: 2,
        }
    }

    fn ordered(delimiter: char, numbering: Numbering) -> ListData {
        ListData {
            kind: ListKind::Ordered {
                delimiter,
                numbering,
            },
            start: 1,
            tight: true,
            marker_offset: 0,
            padding: 3,
        }
    }

    #[test]
    fn bullets_match_on_same_char_only() {
        assert!(bullet('*').matches(&bullet('*')));
        assert!(!bullet('*').matches(&bullet('-')));
    }

    #[test]
    fn ordered_lists_match_on_delimiter_and_numbering() {
        let dot = ordered('.', Numbering::Decimal);
        assert!(dot.matches(&ordered('.', Numbering::Decimal)));
        assert!(!dot.matches(&ordered(')', Numbering::Decimal)));
        assert!(!dot.matches(&ordered('.', Numbering::LowerRoman)));
        assert!(!dot.matches(&bullet('-')));
    }

    #[test]
    fn only_lists_hold_items() {
        let list = BlockTag::List(bullet('-'));
        assert!(list.can_contain(BlockKind::ListItem));
        assert!(!list.can_contain(BlockKind::Paragraph));
        assert!(!BlockTag::Document.can_contain(BlockKind::ListItem));
        assert!(BlockTag::BlockQuote.can_contain(BlockKind::List));
        assert!(!BlockTag::Paragraph.can_contain(BlockKind::Paragraph));
    }
}
