//! # Extensions
//!
//! Optional syntax layered over the CommonMark core. An extension adds
//! handlers to a [`RegistryBuilder`] at [`Layer::Extension`](crate::parsing::registry::Layer),
//! so they are tried before the core handlers on the same character, and
//! may flip global [`ParseOptions`].
//!
//! | Name | Syntax |
//! |------|--------|
//! | `strikethrough` | `~~del~~`, `~sub~` |
//! | `superscript` | `^sup^` |
//! | `math` | `$x$`, `$$x$$` |
//! | `tables` | GFM pipe tables |
//! | `roman_lists` | `i.`, `IV)` list markers |
//! | `tight_lists` | every list renders tight |

pub mod math;
pub mod roman_lists;
pub mod strikethrough;
pub mod superscript;
pub mod tables;
pub mod tight_lists;

pub use math::Math;
pub use roman_lists::RomanLists;
pub use strikethrough::Strikethrough;
pub use superscript::Superscript;
pub use tables::Tables;
pub use tight_lists::TightLists;

use crate::parsing::{
    ParseOptions,
    registry::{RegistryBuilder, SetupError},
};

pub trait Extension: Send + Sync {
    /// Name used in configuration files and on the command line.
    fn name(&self) -> &'static str;

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError>;

    /// Adjusts global switches. Most extensions only add syntax.
    fn configure(&self, _options: &mut ParseOptions) {}
}

/// Every built-in extension.
pub const BUILTIN: &[&dyn Extension] = &[
    &Strikethrough,
    &Superscript,
    &Math,
    &Tables,
    &RomanLists,
    &TightLists,
];

/// Looks up a built-in extension by its configuration name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static dyn Extension> {
    BUILTIN.iter().copied().find(|ext| ext.name() == name)
}

/// Names of every built-in extension, for help text and error messages.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|ext| ext.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{Parser, registry::Registry};
    use crate::render::render;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("tables").map(|e| e.name()), Some("tables"));
        assert!(by_name("footnotes").is_none());
        assert_eq!(names().count(), BUILTIN.len());
    }

    #[test]
    fn all_builtins_register_together() {
        let mut builder = RegistryBuilder::new();
        for ext in BUILTIN {
            builder.extension(*ext).unwrap();
        }
        let registry: Registry = builder.build().unwrap();
        let mut options = ParseOptions::default();
        for ext in BUILTIN {
            ext.configure(&mut options);
        }
        let doc = Parser::new(&registry, options).parse_str("~~a~~ ^b^ $c$\n\ni. x\n\nii. y");
        assert_eq!(
            render(&doc),
            "<p><del>a</del> <sup>b</sup> <span class=\"math\">c</span></p>\n\
             <ol type=\"i\">\n<li>x</li>\n<li>y</li>\n</ol>\n"
        );
    }
}
