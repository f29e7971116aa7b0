use crate::parsing::{
    chars::Flanking,
    registry::{DelimKind, InlineDelimiter, Layer, RegistryBuilder, SetupError},
};

use super::Extension;

/// `~~text~~` strikes through; a single `~text~` is a subscript.
pub struct Strikethrough;

impl Strikethrough {
    pub const TILDE: char = '~';

    fn kinds(run: usize) -> Option<DelimKind> {
        match run {
            1 => Some(DelimKind::Subscript),
            2 => Some(DelimKind::Strikethrough),
            _ => None,
        }
    }

    fn opens(f: &Flanking) -> bool {
        f.left
    }

    fn closes(f: &Flanking) -> bool {
        f.right
    }
}

impl Extension for Strikethrough {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        builder.inline_delimiter(
            Layer::Extension,
            InlineDelimiter {
                ch: Self::TILDE,
                kinds: Self::kinds,
                can_open: Self::opens,
                can_close: Self::closes,
            },
        )?;
        Ok(())
    }
}
