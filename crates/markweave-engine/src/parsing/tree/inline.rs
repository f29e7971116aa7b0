use crate::parsing::rope::Span;

#[derive(Debug, Clone)]
pub struct Inline {
    pub tag: InlineTag,
    pub span: Option<Span>,
}

impl Inline {
    pub(crate) fn new(tag: InlineTag, span: Option<Span>) -> Self {
        Self { tag, span }
    }

    /// Literal text carried by the node, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.tag {
            InlineTag::Text(s) | InlineTag::Code(s) | InlineTag::Html(s) | InlineTag::Math(s) => {
                Some(s)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineTag {
    /// Chain container of one leaf block.
    Root,
    Text(String),
    SoftBreak,
    HardBreak,
    Code(String),
    Html(String),
    Emphasis,
    Strong,
    Strikethrough,
    Subscript,
    Superscript,
    Math(String),
    Link(LinkData),
    Image(LinkData),
}

impl InlineTag {
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            InlineTag::Root
                | InlineTag::Emphasis
                | InlineTag::Strong
                | InlineTag::Strikethrough
                | InlineTag::Subscript
                | InlineTag::Superscript
                | InlineTag::Link(_)
                | InlineTag::Image(_)
        )
    }

    /// Short name used by outlines and snapshots.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InlineTag::Root => "Root",
            InlineTag::Text(_) => "Text",
            InlineTag::SoftBreak => "SoftBreak",
            InlineTag::HardBreak => "HardBreak",
            InlineTag::Code(_) => "Code",
            InlineTag::Html(_) => "Html",
            InlineTag::Emphasis => "Emphasis",
            InlineTag::Strong => "Strong",
            InlineTag::Strikethrough => "Strikethrough",
            InlineTag::Subscript => "Subscript",
            InlineTag::Superscript => "Superscript",
            InlineTag::Math(_) => "Math",
            InlineTag::Link(_) => "Link",
            InlineTag::Image(_) => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkData {
    pub url: String,
    pub title: String,
}
