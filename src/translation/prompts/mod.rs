/*!
 * Prompt construction for the translation oracle.
 *
 * This module provides:
 * - System/user templates for the single-pass and two-pass modes
 * - A builder that renders them for a paragraph unit
 */

pub mod templates;

pub use templates::{AUTO_SOURCE_PHRASE, Prompt, PromptBuilder, PromptKind, PromptTemplate};
