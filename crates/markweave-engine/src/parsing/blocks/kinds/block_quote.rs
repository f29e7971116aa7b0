use crate::parsing::{
    blocks::builder::{BlockBuilder, Continuation},
    registry::BlockStart,
    tree::{BlockId, BlockTag},
};

/// Blockquote block type with owned marker constant.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: u8 = b'>';

    /// Consumes `>` and one optional following space or tab column.
    fn consume_prefix(b: &mut BlockBuilder<'_>) -> bool {
        if b.indented() || b.byte_at(b.next_nonspace()) != Some(Self::PREFIX) {
            return false;
        }
        b.advance_next_nonspace();
        b.advance_offset(1, false);
        b.skip_optional_space();
        true
    }

    pub fn open(b: &mut BlockBuilder<'_>, _container: BlockId) -> BlockStart {
        if !Self::consume_prefix(b) {
            return BlockStart::NoMatch;
        }
        b.close_unmatched_blocks();
        let at = b.next_nonspace();
        b.add_child(BlockTag::BlockQuote, at);
        BlockStart::Container
    }

    pub fn continues(b: &mut BlockBuilder<'_>) -> Continuation {
        if Self::consume_prefix(b) {
            Continuation::Matched
        } else {
            Continuation::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::{parse, tree::BlockKind};

    fn shape(text: &str) -> Vec<BlockKind> {
        let doc = parse(text);
        doc.descendants().map(|id| doc.block(id).kind()).collect()
    }

    #[test]
    fn nested_quotes() {
        assert_eq!(
            shape("> > deep"),
            vec![
                BlockKind::Document,
                BlockKind::BlockQuote,
                BlockKind::BlockQuote,
                BlockKind::Paragraph
            ]
        );
    }

    #[test]
    fn four_space_indent_is_not_a_quote() {
        assert_eq!(
            shape("    > code"),
            vec![BlockKind::Document, BlockKind::IndentedCode]
        );
    }

    #[test]
    fn quote_ends_without_prefix_after_blank() {
        let doc = parse("> a\n\nb");
        let top: Vec<_> = doc.children(doc.root()).map(|id| doc.block(id).kind()).collect();
        assert_eq!(top, vec![BlockKind::BlockQuote, BlockKind::Paragraph]);
    }
}
