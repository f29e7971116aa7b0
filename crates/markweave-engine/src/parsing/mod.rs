//! # Parsing
//!
//! Two-phase Markdown parsing. The block phase turns lines into a tree of
//! container and leaf blocks; the inline phase then parses the text of each
//! leaf that carries inline content.
//!
//! Both phases consult a frozen [`Registry`](registry::Registry) of block
//! openers and inline delimiters, so extensions plug in without touching
//! the engine.
//!
//! ## Modules
//!
//! - **`rope`**: line splitting with source offsets, spans, previews
//! - **`chars`**, **`scanners`**: character classes and stateless recognizers
//! - **`blocks`**: the line state machine and block kinds
//! - **`inline`**: the inline parser and delimiter stack
//! - **`registry`**: handler tables built once, then shared
//! - **`refs`**: reference definitions and label normalization
//! - **`tree`**: the arena-backed `Document`
//! - **`snapshot`**: serializable snapshots, outlines and invariant checks

pub mod blocks;
pub mod chars;
pub mod inline;
pub mod refs;
pub mod registry;
pub mod rope;
pub mod scanners;
pub mod snapshot;
pub mod tree;

use std::sync::OnceLock;

use xi_rope::Rope;

use blocks::BlockBuilder;
use registry::Registry;
use rope::lines_with_spans;
use tree::Document;

/// Global switches that apply to one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Record a source span on every block and inline node.
    pub track_positions: bool,
    /// Treat every list as tight regardless of blank lines.
    pub force_tight_lists: bool,
}

/// A parser bound to a registry and a set of options. Cheap to create;
/// one registry can serve any number of parsers and threads.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r> {
    registry: &'r Registry,
    options: ParseOptions,
}

impl<'r> Parser<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry, options: ParseOptions) -> Self {
        Self { registry, options }
    }

    #[must_use]
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn parse(&self, rope: &Rope) -> Document {
        self.parse_str(&rope.slice_to_cow(..))
    }

    pub fn parse_str(&self, text: &str) -> Document {
        log::debug!(
            "parsing {} bytes (positions: {}, force tight: {})",
            text.len(),
            self.options.track_positions,
            self.options.force_tight_lists
        );
        let mut builder = BlockBuilder::new(self.registry, self.options, text.len());
        for line in lines_with_spans(text) {
            builder.push(&line);
        }
        let mut doc = builder.finish();
        inline::process_document(&mut doc, self.registry);
        log::debug!("inline phase done: {} inline nodes", doc.inlines().len());
        doc
    }
}

/// Parses CommonMark with the core registry and default options.
pub fn parse(text: &str) -> Document {
    static CORE: OnceLock<Registry> = OnceLock::new();
    let registry = CORE.get_or_init(Registry::commonmark);
    Parser::new(registry, ParseOptions::default()).parse_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tree::BlockKind;

    #[test]
    fn rope_and_str_parse_alike() {
        let text = "# Title\n\n- one\n- two\n";
        let registry = Registry::commonmark();
        let parser = Parser::new(&registry, ParseOptions::default());
        let from_rope = parser.parse(&Rope::from(text));
        let from_str = parser.parse_str(text);
        let kinds = |doc: &Document| -> Vec<BlockKind> {
            doc.descendants().map(|id| doc.block(id).kind()).collect()
        };
        assert_eq!(kinds(&from_rope), kinds(&from_str));
    }

    #[test]
    fn empty_document_has_only_root() {
        let doc = parse("");
        assert_eq!(doc.descendants().count(), 1);
        let doc = parse("\n\n\n");
        assert_eq!(doc.descendants().count(), 1);
    }

    #[test]
    fn positions_are_off_by_default() {
        let doc = parse("text");
        assert!(doc.descendants().all(|id| doc.block(id).span.is_none()));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let registry = Registry::commonmark();
        std::thread::scope(|scope| {
            for text in ["*a*", "`b`", "> c"] {
                let registry = &registry;
                scope.spawn(move || {
                    let doc = Parser::new(registry, ParseOptions::default()).parse_str(text);
                    assert_eq!(doc.children(doc.root()).count(), 1);
                });
            }
        });
    }
}
