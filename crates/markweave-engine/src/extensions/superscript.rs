use crate::parsing::{
    chars::Flanking,
    registry::{DelimKind, InlineDelimiter, Layer, RegistryBuilder, SetupError},
};

use super::Extension;

/// `^text^` raises text.
pub struct Superscript;

impl Superscript {
    pub const CARET: char = '^';

    fn kinds(run: usize) -> Option<DelimKind> {
        (run == 1).then_some(DelimKind::Superscript)
    }

    fn opens(f: &Flanking) -> bool {
        f.left
    }

    fn closes(f: &Flanking) -> bool {
        f.right
    }
}

impl Extension for Superscript {
    fn name(&self) -> &'static str {
        "superscript"
    }

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        builder.inline_delimiter(
            Layer::Extension,
            InlineDelimiter {
                ch: Self::CARET,
                kinds: Self::kinds,
                can_open: Self::opens,
                can_close: Self::closes,
            },
        )?;
        Ok(())
    }
}
