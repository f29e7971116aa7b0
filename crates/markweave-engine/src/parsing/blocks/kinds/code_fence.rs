use crate::parsing::{
    blocks::builder::{BlockBuilder, Continuation},
    chars::is_space_or_tab,
    registry::BlockStart,
    scanners,
    tree::{BlockContent, BlockId, BlockTag, FenceData},
};

/// Fenced code block: a raw zone closed by a fence of the same character
/// that is at least as long as the opener.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICK: char = '`';
    pub const TILDE: char = '~';

    pub fn open(b: &mut BlockBuilder<'_>, _container: BlockId) -> BlockStart {
        if b.indented() {
            return BlockStart::NoMatch;
        }
        let Some((fence_char, fence_length)) = scanners::code_fence_open(b.rest()) else {
            return BlockStart::NoMatch;
        };
        b.close_unmatched_blocks();
        let data = FenceData {
            fence_char,
            fence_length,
            fence_offset: b.indent(),
            info: String::new(),
        };
        let at = b.next_nonspace();
        b.add_child(BlockTag::FencedCode(data), at);
        b.advance_next_nonspace();
        b.advance_offset(fence_length, false);
        BlockStart::Leaf
    }

    pub fn continues(b: &mut BlockBuilder<'_>, id: BlockId) -> Continuation {
        let BlockTag::FencedCode(data) = &b.block(id).tag else {
            return Continuation::Failed;
        };
        let (fence_char, fence_length, fence_offset) =
            (data.fence_char, data.fence_length, data.fence_offset);

        if b.indent() <= 3 && scanners::code_fence_close(b.rest(), fence_char, fence_length) {
            let line = b.line_number();
            b.finalize(id, line);
            return Continuation::LineDone;
        }

        let mut remaining = fence_offset;
        while remaining > 0 && b.byte_at(b.offset()).is_some_and(is_space_or_tab) {
            b.advance_offset(1, true);
            remaining -= 1;
        }
        Continuation::Matched
    }

    /// Splits the buffered lines into the info string (first line) and the
    /// literal body.
    pub fn finalize(b: &mut BlockBuilder<'_>, id: BlockId) {
        let block = b.block_mut(id);
        let content = match std::mem::take(&mut block.content) {
            BlockContent::Raw(s) => s,
            _ => String::new(),
        };
        let (first, rest) = content.split_once('\n').unwrap_or((content.as_str(), ""));
        let info = scanners::unescape_string(first.trim());
        if let BlockTag::FencedCode(data) = &mut block.tag {
            data.info = info;
        }
        block.content = BlockContent::Literal(rest.to_string());
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::{parse, tree::BlockTag};

    fn fence(text: &str) -> (String, String) {
        let doc = parse(text);
        let id = doc
            .descendants()
            .find(|&id| matches!(doc.block(id).tag, BlockTag::FencedCode(_)))
            .expect("no fenced code block");
        let block = doc.block(id);
        let BlockTag::FencedCode(data) = &block.tag else {
            unreachable!()
        };
        (data.info.clone(), block.literal().unwrap_or_default().to_string())
    }

    #[test]
    fn info_string_is_unescaped() {
        assert_eq!(
            fence("```rust\\!  x\nfn main() {}\n```"),
            ("rust!  x".to_string(), "fn main() {}\n".to_string())
        );
    }

    #[test]
    fn shorter_fence_does_not_close() {
        assert_eq!(fence("````\na\n```\n````").1, "a\n```\n");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(fence("~~~\na\n\nb").1, "a\n\nb\n");
    }

    #[test]
    fn fence_offset_is_removed_from_content() {
        assert_eq!(fence("  ```\n   x\n  y\nz\n  ```").1, " x\ny\nz\n");
    }
}
