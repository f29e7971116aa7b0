//! # Handler Registry
//!
//! Two character-indexed tables: block openers keyed by the first non-space
//! character of a line, and inline delimiter handlers keyed by the delimiter
//! character. Each slot holds an ordered chain. Extensions prepend to a
//! chain so their handlers run before the core ones they refine.
//!
//! The registry is assembled with a [`RegistryBuilder`] and then frozen;
//! a built [`Registry`] is plain data and can be shared between threads.

use crate::parsing::{
    blocks::{BlockBuilder, open},
    chars::Flanking,
    inline::kinds::emphasis,
    tree::{BlockId, BlockKind, InlineTag},
};

/// Highest character a block opener may be registered on.
pub const MAX_OPENER_CHAR: char = '•';

/// Characters handled by the inline parser itself.
pub const RESERVED_INLINE_CHARS: &[char] = &['`', '\\', '&', '<', '[', ']', '!', '\n'];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("block opener '{name}' registered on {trigger:?}, outside the opener range")]
    OpenerOutOfRange { name: &'static str, trigger: char },

    #[error("inline delimiter {0:?} is reserved by the core inline parser")]
    ReservedInlineChar(char),

    #[error("inline delimiter {0:?} is not ASCII")]
    NonAsciiDelimiter(char),

    #[error("inline delimiter {0:?} produces no element for runs of length 1 or 2")]
    EmptyDelimiterKinds(char),

    #[error("block opener '{name}' registered twice on {trigger:?}")]
    DuplicateOpener { name: &'static str, trigger: char },
}

/// Where a handler lands in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Appended: tried after everything already registered.
    Core,
    /// Prepended: tried before everything already registered.
    Extension,
}

/// Outcome of one block opener attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStart {
    NoMatch,
    /// A container was opened; keep looking for more starts on this line.
    Container,
    /// A leaf was opened (or retagged); the rest of the line is its content.
    Leaf,
}

pub type OpenFn = fn(&mut BlockBuilder<'_>, BlockId) -> BlockStart;

#[derive(Clone, Copy)]
pub struct BlockOpener {
    pub name: &'static str,
    /// The one kind of block this opener creates.
    pub creates: BlockKind,
    pub open: OpenFn,
}

impl std::fmt::Debug for BlockOpener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockOpener")
            .field("name", &self.name)
            .field("creates", &self.creates)
            .finish_non_exhaustive()
    }
}

/// Element a matched delimiter pair turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimKind {
    Emphasis,
    Strong,
    Strikethrough,
    Subscript,
    Superscript,
    /// The text between the delimiters is taken verbatim.
    Math,
}

impl DelimKind {
    /// Whether the matched span collapses into one literal node.
    #[must_use]
    pub fn collapses(self) -> bool {
        self == DelimKind::Math
    }

    /// Container tag for non-collapsing kinds.
    #[must_use]
    pub fn container_tag(self) -> InlineTag {
        match self {
            DelimKind::Emphasis => InlineTag::Emphasis,
            DelimKind::Strong => InlineTag::Strong,
            DelimKind::Strikethrough => InlineTag::Strikethrough,
            DelimKind::Subscript => InlineTag::Subscript,
            DelimKind::Superscript => InlineTag::Superscript,
            DelimKind::Math => InlineTag::Math(String::new()),
        }
    }
}

pub type KindsFn = fn(usize) -> Option<DelimKind>;
pub type FlankFn = fn(&Flanking) -> bool;

#[derive(Clone, Copy)]
pub struct InlineDelimiter {
    pub ch: char,
    /// Element for a matched run of the given length (1 or 2).
    pub kinds: KindsFn,
    pub can_open: FlankFn,
    pub can_close: FlankFn,
}

impl std::fmt::Debug for InlineDelimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineDelimiter")
            .field("ch", &self.ch)
            .finish_non_exhaustive()
    }
}

/// All handlers registered on one delimiter character, innermost first.
#[derive(Debug, Clone)]
pub struct DelimiterChain {
    handlers: Vec<InlineDelimiter>,
}

impl DelimiterChain {
    /// First handler with an element for this run length wins.
    #[must_use]
    pub fn kind(&self, run: usize) -> Option<DelimKind> {
        self.handlers.iter().find_map(|h| (h.kinds)(run))
    }

    /// Open/close eligibility: every handler in the chain must agree.
    #[must_use]
    pub fn flags(&self, flanking: &Flanking) -> (bool, bool) {
        let can_open = self.handlers.iter().all(|h| (h.can_open)(flanking));
        let can_close = self.handlers.iter().all(|h| (h.can_close)(flanking));
        (can_open, can_close)
    }

    /// How many delimiters a matched opener/closer pair consumes, and the
    /// element they produce.
    #[must_use]
    pub fn resolve(&self, opener: usize, closer: usize) -> Option<(usize, DelimKind)> {
        let single = self.kind(1);
        let double = self.kind(2);
        let use_delims = if opener >= 3 && closer >= 3 {
            match (single, double) {
                (None, _) => 2,
                (_, None) => 1,
                _ if closer % 2 == 0 => 2,
                _ => 1,
            }
        } else {
            match opener.min(closer) {
                0 => return None,
                1 => 1,
                _ if double.is_some() => 2,
                _ => 1,
            }
        };
        let kind = if use_delims == 2 { double } else { single };
        kind.map(|k| (use_delims, k))
    }
}

#[derive(Debug)]
pub struct RegistryBuilder {
    openers: Vec<Vec<BlockOpener>>,
    indented: Vec<BlockOpener>,
    delimiters: Vec<Vec<InlineDelimiter>>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// A builder with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            openers: Vec::new(),
            indented: Vec::new(),
            delimiters: vec![Vec::new(); 128],
        }
    }

    /// A builder preloaded with the CommonMark core handlers.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self::empty();
        open::register_core(&mut builder);
        emphasis::register_core(&mut builder);
        builder
    }

    pub fn block_opener(
        &mut self,
        trigger: char,
        layer: Layer,
        opener: BlockOpener,
    ) -> Result<&mut Self, SetupError> {
        if trigger > MAX_OPENER_CHAR {
            return Err(SetupError::OpenerOutOfRange {
                name: opener.name,
                trigger,
            });
        }
        let slot = trigger as usize;
        if self.openers.len() <= slot {
            self.openers.resize_with(slot + 1, Vec::new);
        }
        insert(&mut self.openers[slot], layer, opener);
        Ok(self)
    }

    /// Openers tried when a line is indented by four or more columns.
    pub fn indented_opener(&mut self, layer: Layer, opener: BlockOpener) -> &mut Self {
        insert(&mut self.indented, layer, opener);
        self
    }

    pub fn inline_delimiter(
        &mut self,
        layer: Layer,
        delimiter: InlineDelimiter,
    ) -> Result<&mut Self, SetupError> {
        let ch = delimiter.ch;
        if RESERVED_INLINE_CHARS.contains(&ch) {
            return Err(SetupError::ReservedInlineChar(ch));
        }
        if !ch.is_ascii() {
            return Err(SetupError::NonAsciiDelimiter(ch));
        }
        if (delimiter.kinds)(1).is_none() && (delimiter.kinds)(2).is_none() {
            return Err(SetupError::EmptyDelimiterKinds(ch));
        }
        insert(&mut self.delimiters[ch as usize], layer, delimiter);
        Ok(self)
    }

    /// Lets an extension register its handlers.
    pub fn extension(
        &mut self,
        extension: &dyn crate::extensions::Extension,
    ) -> Result<&mut Self, SetupError> {
        log::debug!("registering extension {}", extension.name());
        extension.register(self)?;
        Ok(self)
    }

    /// Validates the tables and freezes them.
    pub fn build(self) -> Result<Registry, SetupError> {
        for (slot, chain) in self.openers.iter().enumerate() {
            for (i, opener) in chain.iter().enumerate() {
                if chain[..i].iter().any(|o| o.name == opener.name) {
                    return Err(SetupError::DuplicateOpener {
                        name: opener.name,
                        trigger: char::from_u32(slot as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
                    });
                }
            }
        }
        Ok(self.freeze())
    }

    fn freeze(self) -> Registry {
        let delimiters = self
            .delimiters
            .into_iter()
            .map(|handlers| (!handlers.is_empty()).then_some(DelimiterChain { handlers }))
            .collect();
        Registry {
            openers: self.openers,
            indented: self.indented,
            delimiters,
        }
    }
}

fn insert<T>(chain: &mut Vec<T>, layer: Layer, item: T) {
    match layer {
        Layer::Core => chain.push(item),
        Layer::Extension => chain.insert(0, item),
    }
}

/// Frozen handler tables.
#[derive(Debug, Clone)]
pub struct Registry {
    openers: Vec<Vec<BlockOpener>>,
    indented: Vec<BlockOpener>,
    delimiters: Vec<Option<DelimiterChain>>,
}

impl Registry {
    /// The core-only registry.
    #[must_use]
    pub fn commonmark() -> Self {
        RegistryBuilder::new().freeze()
    }

    #[must_use]
    pub fn openers(&self, trigger: char) -> &[BlockOpener] {
        self.openers
            .get(trigger as usize)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn indented_openers(&self) -> &[BlockOpener] {
        &self.indented
    }

    #[must_use]
    pub fn delimiter(&self, ch: char) -> Option<&DelimiterChain> {
        self.delimiters.get(ch as usize)?.as_ref()
    }

    /// Whether `b` starts a registered delimiter run.
    #[must_use]
    pub fn is_delimiter(&self, b: u8) -> bool {
        matches!(self.delimiters.get(b as usize), Some(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::chars::Flanking;

    fn always(_: &Flanking) -> bool {
        true
    }

    fn never(_: &Flanking) -> bool {
        false
    }

    fn tilde_kinds(run: usize) -> Option<DelimKind> {
        match run {
            1 => Some(DelimKind::Subscript),
            2 => Some(DelimKind::Strikethrough),
            _ => None,
        }
    }

    fn only_double(run: usize) -> Option<DelimKind> {
        (run == 2).then_some(DelimKind::Strikethrough)
    }

    fn no_kinds(_: usize) -> Option<DelimKind> {
        None
    }

    fn delim(ch: char, kinds: KindsFn) -> InlineDelimiter {
        InlineDelimiter {
            ch,
            kinds,
            can_open: always,
            can_close: always,
        }
    }

    #[test]
    fn core_registry_has_star_and_underscore() {
        let registry = Registry::commonmark();
        assert!(registry.is_delimiter(b'*'));
        assert!(registry.is_delimiter(b'_'));
        assert!(!registry.is_delimiter(b'~'));
        assert!(!registry.openers('>').is_empty());
        assert!(registry.openers('a').is_empty());
        assert!(!registry.indented_openers().is_empty());
    }

    #[test]
    fn star_resolution_follows_parity_for_long_runs() {
        let registry = Registry::commonmark();
        let star = registry.delimiter('*').unwrap();
        assert_eq!(star.resolve(3, 3), Some((1, DelimKind::Emphasis)));
        assert_eq!(star.resolve(3, 4), Some((2, DelimKind::Strong)));
        assert_eq!(star.resolve(2, 2), Some((2, DelimKind::Strong)));
        assert_eq!(star.resolve(1, 3), Some((1, DelimKind::Emphasis)));
        assert_eq!(star.resolve(3, 2), Some((2, DelimKind::Strong)));
    }

    #[test]
    fn resolution_downgrades_missing_kinds() {
        let mut builder = RegistryBuilder::empty();
        builder
            .inline_delimiter(Layer::Core, delim('=', only_double))
            .unwrap();
        let registry = builder.build().unwrap();
        let chain = registry.delimiter('=').unwrap();
        assert_eq!(chain.resolve(1, 1), None);
        assert_eq!(chain.resolve(2, 2), Some((2, DelimKind::Strikethrough)));
        assert_eq!(chain.resolve(3, 3), Some((2, DelimKind::Strikethrough)));
    }

    #[test]
    fn extension_layer_is_tried_first() {
        fn quote_kinds(run: usize) -> Option<DelimKind> {
            (run == 1).then_some(DelimKind::Superscript)
        }
        let mut builder = RegistryBuilder::empty();
        builder
            .inline_delimiter(Layer::Core, delim('~', tilde_kinds))
            .unwrap()
            .inline_delimiter(Layer::Extension, delim('~', quote_kinds))
            .unwrap();
        let registry = builder.build().unwrap();
        let chain = registry.delimiter('~').unwrap();
        assert_eq!(chain.kind(1), Some(DelimKind::Superscript));
        assert_eq!(chain.kind(2), Some(DelimKind::Strikethrough));
    }

    #[test]
    fn predicates_are_anded() {
        let mut builder = RegistryBuilder::empty();
        builder
            .inline_delimiter(Layer::Core, delim('~', tilde_kinds))
            .unwrap()
            .inline_delimiter(
                Layer::Extension,
                InlineDelimiter {
                    ch: '~',
                    kinds: tilde_kinds,
                    can_open: always,
                    can_close: never,
                },
            )
            .unwrap();
        let registry = builder.build().unwrap();
        let flanking = Flanking::new(Some('a'), Some('b'));
        assert_eq!(registry.delimiter('~').unwrap().flags(&flanking), (true, false));
    }

    #[test]
    fn setup_errors_fail_fast() {
        let mut builder = RegistryBuilder::empty();
        assert_eq!(
            builder.inline_delimiter(Layer::Core, delim('[', tilde_kinds)).err(),
            Some(SetupError::ReservedInlineChar('['))
        );
        assert_eq!(
            builder.inline_delimiter(Layer::Core, delim('é', tilde_kinds)).err(),
            Some(SetupError::NonAsciiDelimiter('é'))
        );
        assert_eq!(
            builder.inline_delimiter(Layer::Core, delim('%', no_kinds)).err(),
            Some(SetupError::EmptyDelimiterKinds('%'))
        );
        let opener = BlockOpener {
            name: "arrow",
            creates: BlockKind::Paragraph,
            open: |_, _| BlockStart::NoMatch,
        };
        assert_eq!(
            builder.block_opener('→', Layer::Core, opener).err(),
            Some(SetupError::OpenerOutOfRange {
                name: "arrow",
                trigger: '→'
            })
        );
    }

    #[test]
    fn duplicate_opener_is_rejected_at_build() {
        let opener = BlockOpener {
            name: "twice",
            creates: BlockKind::Paragraph,
            open: |_, _| BlockStart::NoMatch,
        };
        let mut builder = RegistryBuilder::empty();
        builder
            .block_opener('%', Layer::Core, opener)
            .unwrap()
            .block_opener('%', Layer::Extension, opener)
            .unwrap();
        assert_eq!(
            builder.build().err(),
            Some(SetupError::DuplicateOpener {
                name: "twice",
                trigger: '%'
            })
        );
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
