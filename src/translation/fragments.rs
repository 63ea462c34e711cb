/*!
 * Fragment indexing.
 *
 * Turns each paragraph into a `ParagraphUnit`: the paragraph's path in the
 * tree, its plain text, and one 1-based indexed fragment per text leaf. The
 * index is what the oracle sees and echoes back; the `FragmentId` is the
 * stable identity kept on our side.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{DocumentTree, Element, NodePath, TextLeaf};
use crate::translation::locator::locate;
use crate::translation::sanitizer::TranslatedUnit;
use crate::translation::segmenter::segment_document;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([\w-]+(\.[\w-]+)+)([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])?$")
        .expect("valid URL regex")
});
static PERCENTAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+%$").expect("valid percentage regex"));
static MULTIPLIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+x$").expect("valid multiplier regex"));

/// Stable identity of a fragment: which paragraph, which leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId {
    paragraph: usize,
    leaf: usize,
}

impl FragmentId {
    /// Identity of the `leaf`-th text leaf (0-based) of the `paragraph`-th unit.
    pub fn new(paragraph: usize, leaf: usize) -> Self {
        Self { paragraph, leaf }
    }

    /// Position of the owning unit.
    pub fn paragraph(&self) -> usize {
        self.paragraph
    }

    /// 0-based position of the leaf inside its paragraph.
    pub fn leaf(&self) -> usize {
        self.leaf
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}#{}", self.paragraph, self.leaf)
    }
}

/// One indexed slice of a paragraph's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Stable identity
    pub id: FragmentId,
    /// 1-based index shown to the oracle
    pub index: usize,
    /// Text of the leaf when the unit was built
    pub original_text: String,
}

/// Why a unit is not sent for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The paragraph has no text at all
    Empty,
    /// The text is whitespace, a bare URL, a percentage, a multiplier or a single character
    Untranslatable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Untranslatable => write!(f, "untranslatable"),
        }
    }
}

/// A paragraph prepared for translation.
#[derive(Debug, Clone)]
pub struct ParagraphUnit {
    /// Position among the document's paragraphs (0-based)
    pub position: usize,
    /// Location of the paragraph element in the tree
    pub source: NodePath,
    /// Concatenation of all fragment texts
    pub plain_text: String,
    /// Fragments in traversal order, indexed 1..N
    pub fragments: Vec<Fragment>,
    /// Set when the unit bypasses the oracle
    pub skip: Option<SkipReason>,
}

impl ParagraphUnit {
    /// Index the text leaves of a paragraph element.
    pub fn from_element(position: usize, source: NodePath, element: &Element) -> Self {
        let fragments: Vec<Fragment> = locate(element)
            .into_iter()
            .enumerate()
            .map(|(leaf, node)| Fragment {
                id: FragmentId::new(position, leaf),
                index: leaf + 1,
                original_text: node.text().to_string(),
            })
            .collect();
        let plain_text: String = fragments.iter().map(|f| f.original_text.as_str()).collect();
        let skip = plain_text.is_empty().then_some(SkipReason::Empty);

        Self {
            position,
            source,
            plain_text,
            fragments,
            skip,
        }
    }

    /// Whether the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.plain_text.is_empty()
    }

    /// Whether the unit bypasses the oracle.
    pub fn is_skipped(&self) -> bool {
        self.skip.is_some()
    }

    /// Fragment carrying the given oracle index.
    pub fn fragment(&self, index: usize) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.index == index)
    }

    /// Fragments the reply has no translation for.
    pub fn unmatched_fragments(&self, translated: &TranslatedUnit) -> Vec<FragmentId> {
        self.fragments
            .iter()
            .filter(|f| translated.translation_for(f.index).is_none())
            .map(|f| f.id)
            .collect()
    }

    /// Also flag units whose text is not worth translating.
    pub fn flag_untranslatable(&mut self) {
        if self.skip.is_none() && is_untranslatable(&self.plain_text) {
            self.skip = Some(SkipReason::Untranslatable);
        }
    }
}

/// Whether a paragraph text should be left as is.
pub fn is_untranslatable(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || trimmed.chars().count() == 1
        || PERCENTAGE_RE.is_match(trimmed)
        || MULTIPLIER_RE.is_match(trimmed)
        || URL_RE.is_match(trimmed)
}

/// Build a unit for every paragraph path.
///
/// Paths that no longer resolve to an element are skipped.
pub fn index_paragraphs(tree: &DocumentTree, paths: &[NodePath]) -> Vec<ParagraphUnit> {
    paths
        .iter()
        .filter_map(|path| tree.element(path).map(|element| (path, element)))
        .enumerate()
        .map(|(position, (path, element))| ParagraphUnit::from_element(position, path.clone(), element))
        .collect()
}

/// Segment a document and index every paragraph.
pub fn index_document(tree: &DocumentTree, skip_untranslatable: bool) -> Vec<ParagraphUnit> {
    let mut units = index_paragraphs(tree, &segment_document(tree));
    if skip_untranslatable {
        units.iter_mut().for_each(ParagraphUnit::flag_untranslatable);
    }
    units
}

/// Texts of a paragraph's leaves, for comparing before and after.
pub fn leaf_texts(element: &Element) -> Vec<String> {
    locate(element).into_iter().map(TextLeaf::text).map(str::to_string).collect()
}
