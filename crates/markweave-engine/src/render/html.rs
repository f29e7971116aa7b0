use std::borrow::Cow;

use crate::parsing::tree::{
    Alignment, BlockId, BlockTag, Document, InlineId, InlineTag, LinkData, ListKind, Numbering,
};

/// Renders the whole document as HTML.
pub fn render(doc: &Document) -> String {
    let mut renderer = HtmlRenderer {
        doc,
        out: String::with_capacity(doc.source_len() * 5 / 4),
    };
    renderer.block(doc.root(), false);
    renderer.out
}

struct HtmlRenderer<'d> {
    doc: &'d Document,
    out: String,
}

impl HtmlRenderer<'_> {
    /// Starts a new line unless the output is already at one.
    fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn escaped(&mut self, s: &str) {
        self.out.push_str(&escape(s));
    }

    fn children(&mut self, id: BlockId, tight: bool) {
        let children: Vec<_> = self.doc.children(id).collect();
        for child in children {
            self.block(child, tight);
        }
    }

    /// `tight` is set for the direct children of an item in a tight list.
    fn block(&mut self, id: BlockId, tight: bool) {
        let doc = self.doc;
        let block = doc.block(id);
        match &block.tag {
            BlockTag::Document => self.children(id, false),
            BlockTag::BlockQuote => {
                self.cr();
                self.push("<blockquote>\n");
                self.children(id, false);
                self.cr();
                self.push("</blockquote>\n");
            }
            BlockTag::List(data) => {
                self.cr();
                let close = match data.kind {
                    ListKind::Bullet(_) => {
                        self.push("<ul>\n");
                        "</ul>\n"
                    }
                    ListKind::Ordered { numbering, .. } => {
                        self.push("<ol");
                        match numbering {
                            Numbering::Decimal => {}
                            Numbering::LowerRoman => self.push(" type=\"i\""),
                            Numbering::UpperRoman => self.push(" type=\"I\""),
                        }
                        if data.start != 1 {
                            self.push(&format!(" start=\"{}\"", data.start));
                        }
                        self.push(">\n");
                        "</ol>\n"
                    }
                };
                self.children(id, data.tight);
                self.cr();
                self.push(close);
            }
            BlockTag::ListItem(_) => {
                self.cr();
                self.push("<li>");
                self.children(id, tight);
                self.push("</li>\n");
            }
            BlockTag::Paragraph if tight => self.inline_content(id),
            BlockTag::Paragraph => {
                self.cr();
                self.push("<p>");
                self.inline_content(id);
                self.push("</p>\n");
            }
            BlockTag::Heading(heading) => {
                self.cr();
                self.push(&format!("<h{}>", heading.level));
                self.inline_content(id);
                self.push(&format!("</h{}>\n", heading.level));
            }
            BlockTag::IndentedCode | BlockTag::FencedCode(_) => {
                self.cr();
                self.push("<pre><code");
                if let BlockTag::FencedCode(fence) = &block.tag
                    && let Some(lang) = fence.info.split_whitespace().next()
                {
                    self.push(" class=\"language-");
                    self.escaped(lang);
                    self.push("\"");
                }
                self.push(">");
                self.escaped(block.literal().unwrap_or_default());
                self.push("</code></pre>\n");
            }
            BlockTag::HtmlBlock(_) => {
                self.cr();
                self.push(block.literal().unwrap_or_default());
                self.cr();
            }
            BlockTag::ThematicBreak => {
                self.cr();
                self.push("<hr />\n");
            }
            BlockTag::ReferenceDefinition => {}
            BlockTag::Table(table) => self.table(id, &table.alignments),
            BlockTag::TableRow { .. } | BlockTag::TableCell => {
                panic!("table part {id:?} rendered outside its table")
            }
        }
    }

    fn table(&mut self, id: BlockId, alignments: &[Alignment]) {
        self.cr();
        self.push("<table>\n");
        let rows: Vec<_> = self.doc.children(id).collect();
        let mut body_open = false;
        for row in rows {
            let header = matches!(self.doc.block(row).tag, BlockTag::TableRow { header: true });
            if header {
                self.push("<thead>\n");
            } else if !body_open {
                self.push("<tbody>\n");
                body_open = true;
            }
            self.push("<tr>\n");
            let cell_tag = if header { "th" } else { "td" };
            let cells: Vec<_> = self.doc.children(row).collect();
            for (column, cell) in cells.into_iter().enumerate() {
                self.push("<");
                self.push(cell_tag);
                match alignments.get(column) {
                    Some(Alignment::Left) => self.push(" align=\"left\""),
                    Some(Alignment::Center) => self.push(" align=\"center\""),
                    Some(Alignment::Right) => self.push(" align=\"right\""),
                    Some(Alignment::None) | None => {}
                }
                self.push(">");
                self.inline_content(cell);
                self.push("</");
                self.push(cell_tag);
                self.push(">\n");
            }
            self.push("</tr>\n");
            if header {
                self.push("</thead>\n");
            }
        }
        if body_open {
            self.push("</tbody>\n");
        }
        self.push("</table>\n");
    }

    fn inline_content(&mut self, block: BlockId) {
        if let Some(root) = self.doc.block(block).inline_root() {
            self.inline_children(root);
        }
    }

    fn inline_children(&mut self, id: InlineId) {
        let children: Vec<_> = self.doc.inline_children(id).collect();
        for child in children {
            self.inline(child);
        }
    }

    fn inline(&mut self, id: InlineId) {
        let doc = self.doc;
        match &doc.inline(id).tag {
            InlineTag::Root => self.inline_children(id),
            InlineTag::Text(text) => self.escaped(text),
            InlineTag::SoftBreak => self.push("\n"),
            InlineTag::HardBreak => self.push("<br />\n"),
            InlineTag::Code(code) => {
                self.push("<code>");
                self.escaped(code);
                self.push("</code>");
            }
            InlineTag::Html(html) => self.push(html),
            InlineTag::Emphasis => self.wrapped(id, "em"),
            InlineTag::Strong => self.wrapped(id, "strong"),
            InlineTag::Strikethrough => self.wrapped(id, "del"),
            InlineTag::Subscript => self.wrapped(id, "sub"),
            InlineTag::Superscript => self.wrapped(id, "sup"),
            InlineTag::Math(math) => {
                self.push("<span class=\"math\">");
                self.escaped(math);
                self.push("</span>");
            }
            InlineTag::Link(link) => {
                self.push("<a href=\"");
                self.escaped(&normalize_url(&link.url));
                self.push("\"");
                self.title(link);
                self.push(">");
                self.inline_children(id);
                self.push("</a>");
            }
            InlineTag::Image(link) => {
                self.push("<img src=\"");
                self.escaped(&normalize_url(&link.url));
                self.push("\" alt=\"");
                self.escaped(&doc.plain_text(id));
                self.push("\"");
                self.title(link);
                self.push(" />");
            }
        }
    }

    fn wrapped(&mut self, id: InlineId, tag: &str) {
        self.push("<");
        self.push(tag);
        self.push(">");
        self.inline_children(id);
        self.push("</");
        self.push(tag);
        self.push(">");
    }

    fn title(&mut self, link: &LinkData) {
        if !link.title.is_empty() {
            self.push(" title=\"");
            self.escaped(&link.title);
            self.push("\"");
        }
    }
}

/// Escapes `&`, `<`, `>` and `"`.
fn escape(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// Percent-encodes every byte outside the URL-safe set. Existing `%XX`
/// escapes are kept as they are.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    const SAFE: &[u8] = b";/?:@&=+$,-_.!~*'()#";
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let escape_ahead = b == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if escape_ahead {
            out.push_str(&url[i..i + 3]);
            i += 3;
            continue;
        }
        if b.is_ascii_alphanumeric() || SAFE.contains(&b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn html(text: &str) -> String {
        render(&parse(text))
    }

    #[rstest]
    #[case("hello", "<p>hello</p>\n")]
    #[case("# One\n## Two", "<h1>One</h1>\n<h2>Two</h2>\n")]
    #[case("***", "<hr />\n")]
    #[case("> quote", "<blockquote>\n<p>quote</p>\n</blockquote>\n")]
    #[case("    code", "<pre><code>code\n</code></pre>\n")]
    #[case(
        "```rust extra\nfn main() {}\n```",
        "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
    )]
    #[case("<div>\nhi\n</div>", "<div>\nhi\n</div>\n")]
    #[case("a & b < \"c\"", "<p>a &amp; b &lt; &quot;c&quot;</p>\n")]
    #[case("a  \nb", "<p>a<br />\nb</p>\n")]
    fn blocks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[test]
    fn tight_lists_drop_paragraph_tags() {
        assert_eq!(
            html("- a\n- b\n  - c"),
            "<ul>\n<li>a</li>\n<li>b\n<ul>\n<li>c</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn loose_lists_keep_paragraph_tags() {
        assert_eq!(
            html("1. a\n\n2. b"),
            "<ol>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn ordered_start_is_kept() {
        assert_eq!(html("3) x"), "<ol start=\"3\">\n<li>x</li>\n</ol>\n");
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            html("[a](/u?x=1&y \"T\") ![*b* c](/i.png)"),
            "<p><a href=\"/u?x=1&amp;y\" title=\"T\">a</a> <img src=\"/i.png\" alt=\"b c\" /></p>\n"
        );
    }

    #[rstest]
    #[case("/plain", "/plain")]
    #[case("/a b", "/a%20b")]
    #[case("/%20ok", "/%20ok")]
    #[case("/%zz", "/%25zz")]
    #[case("/ä", "/%C3%A4")]
    fn urls_are_percent_encoded(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(normalize_url(url), expected);
    }
}
