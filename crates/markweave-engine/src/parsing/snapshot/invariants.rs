use crate::parsing::{
    rope::Span,
    tree::{BlockContent, BlockId, BlockTag, Document, InlineId},
};

/// Panics when the tree breaks a structural rule:
///
/// - every block is closed
/// - spans lie within the source and are not inverted
/// - a child's span lies within its parent's (blocks, a block's inline
///   root, and inline nodes)
/// - content matches the tag: containers are empty, inline-bearing leaves
///   hold inlines, code and HTML blocks hold literals
pub fn check(doc: &Document) {
    let n = doc.source_len();
    for id in doc.descendants() {
        let block = doc.block(id);
        assert!(!block.is_open(), "block {id:?} left open after parse");
        check_content(doc, id);

        if let Some(span) = block.span {
            in_bounds(span, n, "block");
        }
        if let Some(parent) = doc.blocks().parent(id) {
            nested(doc.block(parent).span, block.span, "block", id.index());
        }

        if let Some(root) = block.inline_root() {
            nested(block.span, doc.inline(root).span, "inline root", root.index());
            check_inlines(doc, root, n);
        }
    }
}

fn check_content(doc: &Document, id: BlockId) {
    let block = doc.block(id);
    let ok = match (&block.tag, &block.content) {
        (tag, BlockContent::Inlines(_)) => tag.has_inlines(),
        (tag, BlockContent::Literal(_)) => tag.is_verbatim(),
        (tag, BlockContent::Empty) => !tag.has_inlines() && !tag.is_verbatim(),
        (_, BlockContent::Raw(_)) => false,
    };
    assert!(
        ok,
        "block {id:?} tagged {:?} holds {:?}",
        block.tag.kind(),
        block.content
    );
    if matches!(block.tag, BlockTag::ReferenceDefinition) {
        assert!(
            doc.blocks().first_child(id).is_none(),
            "reference definition {id:?} has children"
        );
    }
}

fn check_inlines(doc: &Document, root: InlineId, n: usize) {
    for id in doc.inlines().descendants(root) {
        let node = doc.inline(id);
        if let Some(span) = node.span {
            in_bounds(span, n, "inline");
        }
        if id != root
            && let Some(parent) = doc.inlines().parent(id)
        {
            nested(doc.inline(parent).span, node.span, "inline", id.index());
        }
    }
}

fn in_bounds(span: Span, n: usize, what: &str) {
    assert!(
        span.start <= span.end && span.end <= n,
        "{what} span out of bounds: {span:?} (source len: {n})"
    );
}

fn nested(parent: Option<Span>, child: Option<Span>, what: &str, index: usize) {
    if let (Some(parent), Some(child)) = (parent, child) {
        assert!(
            parent.contains(child),
            "{what} #{index} span {child:?} not contained in parent span {parent:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ParseOptions, Parser, registry::Registry};
    use rstest::rstest;

    fn tracked(text: &str) -> Document {
        let registry = Registry::commonmark();
        let options = ParseOptions {
            track_positions: true,
            ..ParseOptions::default()
        };
        Parser::new(&registry, options).parse_str(text)
    }

    #[rstest]
    #[case("plain paragraph\nwith lazy line")]
    #[case("> quote\nlazy\n\n> - item *em*\n>   more")]
    #[case("- a\n\n  b\n- c\n\n      code\n")]
    #[case("\tindented\n\n```\nfence\n")]
    #[case("Setext\n---\n\n[ref]: /u\n\n[ref] and [inline](/x \"t\")")]
    #[case("<div>\nhtml\n</div>\n\n<!-- c -->")]
    #[case("a  \nb\\\nc `code`\n")]
    #[case("1) one\n2) two\n\n\n3. three")]
    fn parsed_documents_hold_invariants(#[case] text: &str) {
        check(&tracked(text));
    }

    #[test]
    #[should_panic(expected = "not contained in parent span")]
    fn escaping_child_span_is_caught() {
        let mut doc = tracked("> a");
        let quote = doc.children(doc.root()).next().unwrap();
        let para = doc.children(quote).next().unwrap();
        doc.blocks[para].span = Some(Span::new(0, 99));
        doc.source_len = 100;
        check(&doc);
    }
}
