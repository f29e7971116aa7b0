use crate::parsing::{
    blocks::builder::{BlockBuilder, CODE_INDENT, Continuation},
    registry::BlockStart,
    tree::{BlockContent, BlockId, BlockTag},
};

/// Code block made of lines indented by at least four columns.
pub struct IndentedCode;

impl IndentedCode {
    pub fn open(b: &mut BlockBuilder<'_>, _container: BlockId) -> BlockStart {
        let tip = b.tip();
        if !b.indented()
            || b.blank()
            || matches!(b.block(tip).tag, BlockTag::Paragraph | BlockTag::Table(_))
        {
            return BlockStart::NoMatch;
        }
        b.advance_offset(CODE_INDENT, true);
        b.close_unmatched_blocks();
        let at = b.offset();
        b.add_child(BlockTag::IndentedCode, at);
        BlockStart::Leaf
    }

    pub fn continues(b: &mut BlockBuilder<'_>) -> Continuation {
        if b.indent() >= CODE_INDENT {
            b.advance_offset(CODE_INDENT, true);
            Continuation::Matched
        } else if b.blank() {
            b.advance_next_nonspace();
            Continuation::Matched
        } else {
            Continuation::Failed
        }
    }

    /// Blank lines at the end of the block belong to the surrounding text,
    /// not to the code.
    pub fn finalize(b: &mut BlockBuilder<'_>, id: BlockId) {
        let block = b.block_mut(id);
        let literal = match &block.content {
            BlockContent::Raw(content) => format!("{}\n", strip_trailing_blank_lines(content)),
            _ => String::new(),
        };
        block.content = BlockContent::Literal(literal);
    }
}

/// Drops trailing lines that hold only spaces, along with the final line
/// ending.
pub(crate) fn strip_trailing_blank_lines(s: &str) -> &str {
    let mut end = s.len();
    while let Some(nl) = s[..end].rfind('\n') {
        if !s[nl + 1..end].bytes().all(|b| b == b' ') {
            break;
        }
        end = nl;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse, tree::BlockKind};
    use rstest::rstest;

    #[rstest]
    #[case("foo\n\n  \n", "foo")]
    #[case("foo\n  bar\n", "foo\n  bar")]
    #[case("foo", "foo")]
    #[case("\n\n", "")]
    fn trailing_blank_lines(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_trailing_blank_lines(input), expected);
    }

    #[test]
    fn interior_blank_lines_are_kept() {
        let doc = parse("    a\n\n\n    b\n\n");
        let code = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.block(code).kind(), BlockKind::IndentedCode);
        assert_eq!(doc.block(code).literal(), Some("a\n\n\nb\n"));
    }

    #[test]
    fn cannot_interrupt_paragraph() {
        let doc = parse("text\n    more");
        let top: Vec<_> = doc.children(doc.root()).map(|id| doc.block(id).kind()).collect();
        assert_eq!(top, vec![BlockKind::Paragraph]);
    }
}
