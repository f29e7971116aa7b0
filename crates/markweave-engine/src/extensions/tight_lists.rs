use crate::parsing::{
    ParseOptions,
    registry::{RegistryBuilder, SetupError},
};

use super::Extension;

/// Renders every list tight, whatever blank lines separate its items.
/// Adds no syntax.
pub struct TightLists;

impl Extension for TightLists {
    fn name(&self) -> &'static str {
        "tight_lists"
    }

    fn register(&self, _builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        Ok(())
    }

    fn configure(&self, options: &mut ParseOptions) {
        options.force_tight_lists = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parsing::{Parser, registry::Registry},
        render::render,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn configure_forces_tight_lists() {
        let mut options = ParseOptions::default();
        TightLists.configure(&mut options);
        assert!(options.force_tight_lists);

        let registry = Registry::commonmark();
        let doc = Parser::new(&registry, options).parse_str("- a\n\n- b");
        assert_eq!(render(&doc), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }
}
