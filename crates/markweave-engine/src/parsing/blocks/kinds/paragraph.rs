use crate::parsing::{
    blocks::builder::BlockBuilder,
    refs::parse_reference_definition,
    tree::{BlockContent, BlockId, BlockTag},
};

/// Paragraph block type (marker struct).
///
/// Paragraphs have no delimiters - they are the default leaf block
/// when no other block opener matches. Link reference definitions are
/// peeled off their front when they close.
pub struct Paragraph;

impl Paragraph {
    /// Moves leading reference definitions out of the paragraph's content
    /// into the document's reference map. Returns whether any non-blank
    /// content is left.
    pub fn extract_definitions(b: &mut BlockBuilder<'_>, id: BlockId) -> bool {
        let BlockContent::Raw(content) = &b.block(id).content else {
            return false;
        };
        let mut definitions = Vec::new();
        let mut consumed = 0;
        while content[consumed..].starts_with('[')
            && let Some(def) = parse_reference_definition(&content[consumed..])
        {
            consumed += def.consumed;
            definitions.push(def);
        }
        let remaining = !content[consumed..].trim().is_empty();
        if consumed == 0 {
            return remaining;
        }

        for def in definitions {
            if !b.document_mut().references.insert(&def.label, def.reference) {
                log::trace!("duplicate reference definition {}", def.label);
            }
        }
        let block = b.block_mut(id);
        if let BlockContent::Raw(content) = &mut block.content {
            content.drain(..consumed);
        }
        if let Some(ledger) = block.ledger.as_mut() {
            ledger.rebase(consumed);
        }
        remaining
    }

    pub fn finalize(b: &mut BlockBuilder<'_>, id: BlockId) {
        if !Self::extract_definitions(b, id) {
            let block = b.block_mut(id);
            block.tag = BlockTag::ReferenceDefinition;
            block.content = BlockContent::Empty;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::{parse, tree::BlockKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn definitions_are_collected() {
        let doc = parse("[a]: /one\n[b]: /two 'Two'\ntext");
        assert_eq!(doc.references().len(), 2);
        assert_eq!(doc.references().get("B").unwrap().title, "Two");
        let para = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.block(para).kind(), BlockKind::Paragraph);
    }

    #[test]
    fn paragraph_of_only_definitions_disappears() {
        let doc = parse("[a]: /one\n\npara");
        let top: Vec<_> = doc.children(doc.root()).map(|id| doc.block(id).kind()).collect();
        assert_eq!(top, vec![BlockKind::ReferenceDefinition, BlockKind::Paragraph]);
    }

    #[test]
    fn definition_cannot_interrupt_paragraph() {
        let doc = parse("text\n[a]: /one");
        assert!(doc.references().is_empty());
    }
}
