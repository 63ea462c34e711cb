/*!
 * Paragraph translation pipeline.
 *
 * The document tree goes through these submodules in order:
 *
 * - `segmenter`: Finds paragraph-boundary elements
 * - `locator`: Finds the text leaves of a paragraph in document order
 * - `fragments`: Turns paragraphs into indexed translation units
 * - `prompts`: Prompt templates and builders for the oracle
 * - `oracle`: Sends prompts to a completion provider, retrying transport errors
 * - `sanitizer`: Recovers and parses the JSON in oracle replies
 * - `translator`: Drives one unit to a terminal outcome
 * - `batch`: Runs units concurrently within a batch, batches in sequence
 * - `reassembly`: Writes translations back into the tree
 * - `pipeline`: The end-to-end flow with progress and statistics
 */

// Re-export main types for easier usage
pub use self::fragments::{Fragment, FragmentId, ParagraphUnit, SkipReason};
pub use self::pipeline::{DocumentTranslator, ProgressUpdate, TranslationStats};
pub use self::sanitizer::{TranslatedFragment, TranslatedUnit};
pub use self::translator::{Translator, TranslatorSettings, UnitOutcome, UnitReport};

// Re-export prompt types
pub use self::prompts::{PromptBuilder, PromptKind, PromptTemplate};

// Submodules
pub mod batch;
pub mod fragments;
pub mod locator;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod reassembly;
pub mod sanitizer;
pub mod segmenter;
pub mod translator;
