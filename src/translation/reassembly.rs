/*!
 * Reassembly of translated fragments into the tree.
 *
 * Units and outcomes are paired by position. Inside a unit, each text leaf is
 * found again with a fresh locator pass and receives the translation whose
 * index equals the leaf's 1-based position. Leaves without a translation keep
 * their text; translations without a leaf are dropped.
 */

use std::collections::HashSet;
use std::ops::AddAssign;

use log::{debug, warn};

use crate::document::{DocumentTree, Element};
use crate::translation::fragments::ParagraphUnit;
use crate::translation::locator::locate_mut;
use crate::translation::sanitizer::TranslatedUnit;
use crate::translation::translator::UnitOutcome;

/// What happened to the fragments of one or more units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblyCounts {
    /// Leaves that received a translation
    pub applied: usize,
    /// Leaves left untouched for lack of a translation
    pub unmatched: usize,
    /// Translations with no leaf to go to
    pub dropped: usize,
}

impl AddAssign for ReassemblyCounts {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.unmatched += other.unmatched;
        self.dropped += other.dropped;
    }
}

/// Write one translated unit into its paragraph element.
pub fn reassemble_paragraph(paragraph: &mut Element, translated: &TranslatedUnit) -> ReassemblyCounts {
    let mut counts = ReassemblyCounts::default();
    let leaves = locate_mut(paragraph);
    let leaf_count = leaves.len();

    for (position, leaf) in leaves.into_iter().enumerate() {
        match translated.translation_for(position + 1) {
            Some(text) => {
                leaf.set_text(text);
                counts.applied += 1;
            }
            None => counts.unmatched += 1,
        }
    }

    let mut seen = HashSet::new();
    counts.dropped = translated
        .nodes
        .iter()
        .filter(|node| match node.index {
            Some(index) => !(1..=leaf_count).contains(&index) || !seen.insert(index),
            None => true,
        })
        .count();

    counts
}

/// Write every translated outcome back into the tree.
///
/// `outcomes[p]` belongs to `units[p]`. Skipped and untranslated units are left alone.
pub fn reassemble(tree: &mut DocumentTree, units: &[ParagraphUnit], outcomes: &[UnitOutcome]) -> ReassemblyCounts {
    if units.len() != outcomes.len() {
        warn!(
            "Reassembling {} outcomes for {} paragraphs; extra entries are ignored",
            outcomes.len(),
            units.len()
        );
    }

    let mut totals = ReassemblyCounts::default();
    for (unit, outcome) in units.iter().zip(outcomes) {
        let UnitOutcome::Translated(translated) = outcome else {
            continue;
        };
        let Some(paragraph) = tree.element_mut(&unit.source) else {
            warn!("Paragraph {} no longer exists at {}", unit.position, unit.source);
            continue;
        };

        let counts = reassemble_paragraph(paragraph, translated);
        if counts.unmatched > 0 || counts.dropped > 0 {
            let kept: Vec<String> = unit
                .unmatched_fragments(translated)
                .iter()
                .map(|id| id.to_string())
                .collect();
            debug!(
                "Paragraph {}: {} fragments applied, {} translations dropped, kept original text: [{}]",
                unit.position,
                counts.applied,
                counts.dropped,
                kept.join(", ")
            );
        }
        totals += counts;
    }
    totals
}
