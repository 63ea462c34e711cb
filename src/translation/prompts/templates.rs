/*!
 * Prompt templates for paragraph translation.
 *
 * Each template pairs a system prompt with a user prompt. The user prompt
 * carries one worked example of the expected output shape,
 * `{"paragraph": ..., "nodes": [{"index": ..., "translation": ...}]}`,
 * followed by the paragraph to translate serialized as JSON.
 */

use serde::Serialize;

use crate::language_utils::AUTO_DETECT_LANGUAGE;
use crate::translation::fragments::ParagraphUnit;
use crate::translation::sanitizer::TranslatedUnit;

/// Phrase used in place of the auto-detect sentinel.
pub const AUTO_SOURCE_PHRASE: &str = "the auto-identified source language";

/// Which instruction set to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Translate every node and repair coherence in one call
    TranslateAndRepair,
    /// Translate the paragraph and each node, keeping node order
    Translate,
    /// Rework a first-pass translation into a coherent paragraph
    Improve,
}

/// A system prompt and a user prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: &'static str,
    user: &'static str,
}

impl PromptTemplate {
    pub const TRANSLATE_AND_REPAIR_SYSTEM: &'static str = r#"You are a specialist in producing coherent, culturally appropriate translations of document paragraphs from {source_language} to {target_language}. A paragraph is split into text nodes identified by their indices.

- Translate every node while keeping the context and meaning of the whole paragraph. Read together, the translated nodes must flow naturally in {target_language}.
- You may move text between nodes, merge nodes or change their order when a literal node-by-node translation would not read naturally. Every index you return must be one of the input indices.
- Escape double quotes, backslashes and other special characters so the output is valid JSON. Keep apostrophes and single quotes as they are: a backslash before them is not valid JSON.
- Reply with JSON only, without commentary."#;

    pub const TRANSLATE_AND_REPAIR_USER: &'static str = r#"Translate the paragraph below from {source_language} to {target_language}. Treat the nodes as one continuous text: adjust grammar and word choice in each node so the concatenated translation is fluent, and rearrange text across nodes where needed. The example only shows the response structure; its languages do not matter.

Example:
Input:
{
  "paragraph": "This course can help you better understand LinkedIn Marketing Solutions’ paid products.",
  "nodes": [
    {"index": 1, "text": "This course can help you better \"understand\" "},
    {"index": 2, "text": "LinkedIn Marketing Solutions"},
    {"index": 3, "text": "’ paid products."}
  ]
}
Output:
{
  "paragraph": "Este curso puede ayudarlo a \"comprender\" mejor los productos pagos de LinkedIn Marketing Solutions.",
  "nodes": [
    {"index": 1, "translation": "Este curso puede ayudarlo a \"comprender\" mejor los productos pagos de "},
    {"index": 2, "translation": "LinkedIn Marketing Solutions"},
    {"index": 3, "translation": "."}
  ]
}

Input:
{input}
Output:
"#;

    pub const TRANSLATE_SYSTEM: &'static str = r#"You are an expert translator from {source_language} to {target_language}. Translate both the entire paragraph and each of its nodes accurately and in a culturally appropriate way. Each node is part of the paragraph, so node translations must stay coherent with the translation of the full paragraph. Escape double quotes and backslashes so the output is valid JSON, and leave apostrophes and single quotes unescaped. Reply with JSON only."#;

    pub const TRANSLATE_USER: &'static str = r#"Translate the complete paragraph and each individual node for {target_language} speakers, using the whole paragraph as context. Keep one translation per node and keep the node indices.

Example:
Input:
{
  "paragraph": "This course can help you better understand LinkedIn Marketing Solutions’ paid products.",
  "nodes": [
    {"index": 1, "text": "This course can help you better understand "},
    {"index": 2, "text": "LinkedIn Marketing Solutions"},
    {"index": 3, "text": "’ paid products."}
  ]
}
Output:
{
  "paragraph": "Este curso puede ayudarte a entender mejor los productos pagados de LinkedIn Marketing Solutions.",
  "nodes": [
    {"index": 1, "translation": "Este curso puede ayudarte a entender mejor "},
    {"index": 2, "translation": "LinkedIn Marketing Solutions"},
    {"index": 3, "translation": " los productos pagados."}
  ]
}

Input:
{input}
Output:
"#;

    pub const IMPROVE_SYSTEM: &'static str = r#"You are a specialist in assembling coherent translations from node translations. The source language is {source_language} and the target language is {target_language}. Given an original paragraph and its nodes with their original text, translation and index, construct a coherent translated paragraph. If the concatenated node translations do not make sense or do not match the paragraph's meaning, rearrange the nodes and adjust the translations. Escape double quotes and backslashes so the output is valid JSON, and leave apostrophes and single quotes unescaped. Reply with JSON only."#;

    pub const IMPROVE_USER: &'static str = r#"Make sure the concatenated node translations below read as a coherent {target_language} translation of the whole paragraph. If the current order does not produce a clear translation, move text between nodes or reorder them. Every index you return must be one of the input indices.

Example:
Input:
{
  "paragraph": "This course can help you better understand LinkedIn Marketing Solutions’ paid products.",
  "nodes": [
    {"index": 1, "original": "This course can help you better understand ", "translation": "Este curso puede ayudarlo a comprender mejor"},
    {"index": 2, "original": "LinkedIn Marketing Solutions", "translation": "LinkedIn Marketing Solutions"},
    {"index": 3, "original": "’ paid products.", "translation": "los productos pagos."}
  ]
}
Output:
{
  "paragraph": "Este curso puede ayudarlo a comprender mejor los productos pagos de LinkedIn Marketing Solutions.",
  "nodes": [
    {"index": 1, "translation": "Este curso puede ayudarlo a comprender mejor "},
    {"index": 3, "translation": "los productos pagos "},
    {"index": 2, "translation": "de LinkedIn Marketing Solutions."}
  ]
}

Input:
{input}
Output:
"#;

    /// Template for the given kind.
    pub fn for_kind(kind: PromptKind) -> Self {
        match kind {
            PromptKind::TranslateAndRepair => Self {
                system: Self::TRANSLATE_AND_REPAIR_SYSTEM,
                user: Self::TRANSLATE_AND_REPAIR_USER,
            },
            PromptKind::Translate => Self {
                system: Self::TRANSLATE_SYSTEM,
                user: Self::TRANSLATE_USER,
            },
            PromptKind::Improve => Self {
                system: Self::IMPROVE_SYSTEM,
                user: Self::IMPROVE_USER,
            },
        }
    }

    /// Render the system prompt.
    pub fn render_system(&self, source_language: &str, target_language: &str) -> String {
        render_languages(self.system, source_language, target_language)
    }

    /// Render the user prompt around a serialized input block.
    pub fn render_user(&self, source_language: &str, target_language: &str, input: &str) -> String {
        // Languages first, so braces inside the input are never treated as placeholders.
        render_languages(self.user, source_language, target_language).replace("{input}", input)
    }
}

fn render_languages(template: &str, source_language: &str, target_language: &str) -> String {
    template
        .replace("{source_language}", source_language)
        .replace("{target_language}", target_language)
}

/// A rendered pair of instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Input block for the translate templates.
#[derive(Debug, Serialize)]
struct ParagraphInput<'a> {
    paragraph: &'a str,
    nodes: Vec<NodeInput<'a>>,
}

#[derive(Debug, Serialize)]
struct NodeInput<'a> {
    index: usize,
    text: &'a str,
}

/// Input block for the improve template.
#[derive(Debug, Serialize)]
struct ImproveInput<'a> {
    paragraph: &'a str,
    nodes: Vec<ImproveNodeInput<'a>>,
}

#[derive(Debug, Serialize)]
struct ImproveNodeInput<'a> {
    index: usize,
    original: &'a str,
    translation: &'a str,
}

/// Builds prompts for one source/target language pair.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_language: String,
    target_language: String,
}

impl PromptBuilder {
    /// Create a builder. The auto-detect sentinel is replaced by a neutral phrase.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        let source_language = if source_language.eq_ignore_ascii_case(AUTO_DETECT_LANGUAGE) {
            AUTO_SOURCE_PHRASE.to_string()
        } else {
            source_language.to_string()
        };
        Self {
            source_language,
            target_language: target_language.to_string(),
        }
    }

    /// Source language as it appears in prompts.
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Prompt asking for a translation of `unit` with the given instruction set.
    ///
    /// `PromptKind::Improve` needs a first pass; use [`PromptBuilder::improve`].
    pub fn translate(&self, kind: PromptKind, unit: &ParagraphUnit) -> Prompt {
        let input = ParagraphInput {
            paragraph: &unit.plain_text,
            nodes: unit
                .fragments
                .iter()
                .map(|f| NodeInput {
                    index: f.index,
                    text: &f.original_text,
                })
                .collect(),
        };
        self.render(kind, &to_json(&input))
    }

    /// Prompt asking to rework `first_pass` into a coherent paragraph.
    ///
    /// Nodes the first pass left out are sent with their original text as translation.
    pub fn improve(&self, unit: &ParagraphUnit, first_pass: &TranslatedUnit) -> Prompt {
        let input = ImproveInput {
            paragraph: &unit.plain_text,
            nodes: unit
                .fragments
                .iter()
                .map(|f| ImproveNodeInput {
                    index: f.index,
                    original: &f.original_text,
                    translation: first_pass
                        .translation_for(f.index)
                        .unwrap_or(&f.original_text),
                })
                .collect(),
        };
        self.render(PromptKind::Improve, &to_json(&input))
    }

    fn render(&self, kind: PromptKind, input: &str) -> Prompt {
        let template = PromptTemplate::for_kind(kind);
        Prompt {
            system: template.render_system(&self.source_language, &self.target_language),
            user: template.render_user(&self.source_language, &self.target_language, input),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
