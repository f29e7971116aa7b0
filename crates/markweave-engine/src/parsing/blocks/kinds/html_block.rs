use crate::parsing::{
    blocks::builder::{BlockBuilder, Continuation},
    registry::BlockStart,
    scanners,
    tree::{BlockContent, BlockId, BlockTag, HtmlBlockKind},
};

use super::indented_code::strip_trailing_blank_lines;

/// Raw HTML passed through verbatim. The start condition decides which
/// line ends the block.
pub struct HtmlBlock;

impl HtmlBlock {
    pub const OPEN: char = '<';

    pub fn open(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        if b.indented() || b.byte_at(b.next_nonspace()) != Some(b'<') {
            return BlockStart::NoMatch;
        }
        let Some(kind) = scanners::html_block_start(b.rest()) else {
            return BlockStart::NoMatch;
        };
        // A lone tag cannot interrupt a paragraph.
        if kind == HtmlBlockKind::Tag
            && (matches!(b.block(container).tag, BlockTag::Paragraph) || b.maybe_lazy())
        {
            return BlockStart::NoMatch;
        }
        b.close_unmatched_blocks();
        let at = b.offset();
        b.add_child(BlockTag::HtmlBlock(kind), at);
        BlockStart::Leaf
    }

    pub fn continues(b: &mut BlockBuilder<'_>, id: BlockId) -> Continuation {
        match b.block(id).tag {
            BlockTag::HtmlBlock(kind) if b.blank() && kind.ends_at_blank_line() => {
                Continuation::Failed
            }
            _ => Continuation::Matched,
        }
    }

    /// Whether the line just added closes a block of this kind.
    #[must_use]
    pub fn ends_on(kind: HtmlBlockKind, line: &str) -> bool {
        !kind.ends_at_blank_line() && scanners::html_block_end(kind, line)
    }

    pub fn finalize(b: &mut BlockBuilder<'_>, id: BlockId) {
        let block = b.block_mut(id);
        let literal = match &block.content {
            BlockContent::Raw(content) => strip_trailing_blank_lines(content).to_string(),
            _ => String::new(),
        };
        block.content = BlockContent::Literal(literal);
    }
}
