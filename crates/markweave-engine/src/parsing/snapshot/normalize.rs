use std::fmt::Write as _;

use serde::Serialize;

use crate::parsing::{
    rope::{Span, preview},
    tree::{BlockContent, BlockTag, Document, InlineId, InlineTag, ListData, ListKind},
};

const PREVIEW_LEN: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snap {
    pub blocks: Vec<BlockSnap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSnap {
    /// Nesting depth; the document itself is 0.
    pub depth: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
    /// Literal content of code and HTML blocks, or the source under the
    /// span of an inline-bearing block.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineSnap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineSnap {
    /// Nesting depth below the block; direct children are 0.
    pub depth: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

pub fn normalize(doc: &Document, source: &str) -> Snap {
    let mut blocks = Vec::new();
    let mut walk = doc.blocks().descendants(doc.root());
    while let Some((id, depth)) = walk.next_with_depth() {
        let block = doc.block(id);
        let text = match (&block.content, block.span) {
            (BlockContent::Literal(literal), _) => literal.clone(),
            (BlockContent::Inlines(_), Some(span)) => preview(source, span, PREVIEW_LEN),
            _ => String::new(),
        };
        let inline = block
            .inline_root()
            .map(|root| inline_snaps(doc, root))
            .unwrap_or_default();
        blocks.push(BlockSnap {
            depth,
            kind: block_label(&block.tag),
            span: block.span.map(pair),
            text,
            inline,
        });
    }
    Snap { blocks }
}

fn inline_snaps(doc: &Document, root: InlineId) -> Vec<InlineSnap> {
    let mut out = Vec::new();
    let mut walk = doc.inlines().descendants(root);
    while let Some((id, depth)) = walk.next_with_depth() {
        if depth == 0 {
            continue;
        }
        let node = doc.inline(id);
        out.push(InlineSnap {
            depth: depth - 1,
            kind: inline_label(&node.tag),
            span: node.span.map(pair),
            text: node.text().unwrap_or_default().to_string(),
        });
    }
    out
}

/// Indented one-line-per-node dump of the whole tree:
///
/// ```text
/// Document
///   Paragraph
///     Text "hi "
///     Emphasis
///       Text "there"
/// ```
pub fn outline(doc: &Document) -> String {
    let mut out = String::new();
    let mut walk = doc.blocks().descendants(doc.root());
    while let Some((id, depth)) = walk.next_with_depth() {
        let block = doc.block(id);
        line(
            &mut out,
            depth,
            &block_label(&block.tag),
            block.span,
            block.literal().unwrap_or_default(),
        );
        if let Some(root) = block.inline_root() {
            let mut inlines = doc.inlines().descendants(root);
            while let Some((inline, inline_depth)) = inlines.next_with_depth() {
                if inline_depth == 0 {
                    continue;
                }
                let node = doc.inline(inline);
                line(
                    &mut out,
                    depth + inline_depth,
                    &inline_label(&node.tag),
                    node.span,
                    node.text().unwrap_or_default(),
                );
            }
        }
    }
    out
}

fn line(out: &mut String, depth: usize, label: &str, span: Option<Span>, text: &str) {
    let _ = write!(out, "{:indent$}{label}", "", indent = depth * 2);
    if let Some(span) = span {
        let _ = write!(out, " @{}..{}", span.start, span.end);
    }
    if !text.is_empty() {
        let _ = write!(out, " {text:?}");
    }
    out.push('\n');
}

fn pair(span: Span) -> (usize, usize) {
    (span.start, span.end)
}

/// Kind of a block plus the payload that matters when comparing trees.
#[must_use]
pub fn block_label(tag: &BlockTag) -> String {
    match tag {
        BlockTag::List(data) => {
            let tightness = if data.tight { "tight" } else { "loose" };
            format!("List({}, {tightness})", list_kind(data))
        }
        BlockTag::ListItem(data) => format!("ListItem({})", list_kind(data)),
        BlockTag::Heading(h) if h.setext => format!("Heading({}, setext)", h.level),
        BlockTag::Heading(h) => format!("Heading({})", h.level),
        BlockTag::FencedCode(f) if f.info.is_empty() => "FencedCode".to_string(),
        BlockTag::FencedCode(f) => format!("FencedCode({})", f.info),
        BlockTag::HtmlBlock(kind) => format!("HtmlBlock({kind:?})"),
        BlockTag::Table(t) => {
            let alignments: Vec<_> = t.alignments.iter().map(|a| format!("{a:?}")).collect();
            format!("Table({})", alignments.join(", "))
        }
        BlockTag::TableRow { header: true } => "TableRow(header)".to_string(),
        other => format!("{:?}", other.kind()),
    }
}

fn list_kind(data: &ListData) -> String {
    match data.kind {
        ListKind::Bullet(c) => format!("bullet {c}"),
        ListKind::Ordered {
            delimiter,
            numbering,
        } => format!("{numbering:?} {}{delimiter}", data.start),
    }
}

#[must_use]
pub fn inline_label(tag: &InlineTag) -> String {
    match tag {
        InlineTag::Link(l) | InlineTag::Image(l) if l.title.is_empty() => {
            format!("{}({})", tag.name(), l.url)
        }
        InlineTag::Link(l) | InlineTag::Image(l) => {
            format!("{}({} {:?})", tag.name(), l.url, l.title)
        }
        _ => tag.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ParseOptions, Parser, parse, registry::Registry};
    use pretty_assertions::assert_eq;

    #[test]
    fn outline_nests_inlines_under_blocks() {
        let doc = parse("> hi *there*\n\n```rust\nfn x() {}\n```\n");
        insta::assert_snapshot!(outline(&doc), @r#"
        Document
          BlockQuote
            Paragraph
              Text "hi "
              Emphasis
                Text "there"
          FencedCode(rust) "fn x() {}\n"
        "#);
    }

    #[test]
    fn outline_shows_spans_when_tracked() {
        let registry = Registry::commonmark();
        let options = ParseOptions {
            track_positions: true,
            ..ParseOptions::default()
        };
        let doc = Parser::new(&registry, options).parse_str("# T\n- [a](/u)\n");
        insta::assert_snapshot!(outline(&doc), @r#"
        Document @0..14
          Heading(1) @0..3
            Text @2..3 "T"
          List(bullet -, tight) @4..13
            ListItem(bullet -) @4..13
              Paragraph @6..13
                Link(/u) @6..13
                  Text @7..8 "a"
        "#);
    }

    #[test]
    fn normalize_flattens_with_depths() {
        let text = "1. one\n2. two\n";
        let registry = Registry::commonmark();
        let options = ParseOptions {
            track_positions: true,
            ..ParseOptions::default()
        };
        let doc = Parser::new(&registry, options).parse_str(text);
        let snap = normalize(&doc, text);

        let kinds: Vec<_> = snap
            .blocks
            .iter()
            .map(|b| (b.depth, b.kind.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0, "Document"),
                (1, "List(Decimal 1., tight)"),
                (2, "ListItem(Decimal 1.)"),
                (3, "Paragraph"),
                (2, "ListItem(Decimal 2.)"),
                (3, "Paragraph"),
            ]
        );
        let first_para = &snap.blocks[3];
        assert_eq!(first_para.text, "one");
        assert_eq!(first_para.span, Some((3, 6)));
        assert_eq!(
            first_para.inline,
            vec![InlineSnap {
                depth: 0,
                kind: "Text".into(),
                span: Some((3, 6)),
                text: "one".into(),
            }]
        );
    }

    #[test]
    fn labels_carry_payloads() {
        let doc = parse("Title\n===\n\n[x](/u \"t\")\n");
        let snap = normalize(&doc, "");
        assert_eq!(snap.blocks[1].kind, "Heading(1, setext)");
        assert_eq!(snap.blocks[2].inline[0].kind, r#"Link(/u "t")"#);
    }
}
