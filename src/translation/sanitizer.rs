/*!
 * Oracle response sanitizing and parsing.
 *
 * The oracle answers in free text that is supposed to hold one JSON object.
 * Replies are often wrapped in markdown fences or followed by commentary, so
 * the object is cut out before parsing. A reply can also carry an embedded
 * provider error instead of a translation; the rate-limit variant is reported
 * separately so the caller can cool down before asking again.
 */

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error code providers use for rate limiting.
pub const RATE_LIMIT_MARKER: &str = "rate_limit_exceeded";

/// One translated node as returned by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedFragment {
    /// Index of the original fragment; absent or unreadable indices are kept as `None`
    #[serde(default, deserialize_with = "lenient_index")]
    pub index: Option<usize>,
    pub translation: String,
}

impl TranslatedFragment {
    pub fn new(index: usize, translation: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            translation: translation.into(),
        }
    }
}

/// A parsed oracle reply for one paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedUnit {
    /// The whole translated paragraph
    #[serde(default, alias = "plainDocument")]
    pub paragraph: String,
    /// Node translations, possibly reordered or partial
    pub nodes: Vec<TranslatedFragment>,
}

impl TranslatedUnit {
    /// Translation for an original fragment index. The first match wins.
    pub fn translation_for(&self, index: usize) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.index == Some(index))
            .map(|node| node.translation.as_str())
    }

    /// Identity translation of a unit's fragments.
    pub fn identity<'a>(fragments: impl IntoIterator<Item = (usize, &'a str)>) -> Self {
        let nodes: Vec<TranslatedFragment> = fragments
            .into_iter()
            .map(|(index, text)| TranslatedFragment::new(index, text))
            .collect();
        let paragraph = nodes.iter().map(|n| n.translation.as_str()).collect();
        Self { paragraph, nodes }
    }
}

/// Result of interpreting one raw reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A usable translation
    Parsed(TranslatedUnit),
    /// The reply reports a rate limit
    RateLimited,
    /// Anything else; the text says why
    Malformed(String),
}

/// Cut the JSON object out of a raw reply.
///
/// A code fence only counts when it opens a line. Valid JSON cannot hold a
/// raw newline inside a string, so backticks within translations are never
/// mistaken for a fence. The opening fence is the first one with an object
/// after it; the body ends at the next fence. The object is then everything
/// from the first `{` through the last `}`. Returns `None` when no such span
/// exists.
pub fn sanitize(raw: &str) -> Option<&str> {
    let mut text = raw.trim();

    let opening = fence_lines(text)
        .map(|fence| line_end(text, fence))
        .find(|&body| text[body..].contains('{'));
    if let Some(body) = opening {
        text = &text[body..];
        if let Some(closing) = fence_lines(text).next() {
            text = &text[..closing];
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Byte offsets of fences that start a line, after optional indentation.
fn fence_lines(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut offset = 0;
    text.split_inclusive('\n').filter_map(move |line| {
        let start = offset;
        offset += line.len();
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        line[indent..].starts_with("```").then_some(start + indent)
    })
}

/// Offset just past the line holding `at`.
fn line_end(text: &str, at: usize) -> usize {
    text[at..].find('\n').map_or(text.len(), |i| at + i + 1)
}

/// Interpret a raw oracle reply.
pub fn parse_response(raw: &str) -> ParseOutcome {
    let Some(json) = sanitize(raw) else {
        if raw.contains(RATE_LIMIT_MARKER) {
            return ParseOutcome::RateLimited;
        }
        return ParseOutcome::Malformed("no JSON object in response".to_string());
    };

    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            if raw.contains(RATE_LIMIT_MARKER) {
                return ParseOutcome::RateLimited;
            }
            return ParseOutcome::Malformed(format!("invalid JSON: {}", e));
        }
    };

    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(Value::as_str).unwrap_or_default();
        let kind = error.get("type").and_then(Value::as_str).unwrap_or_default();
        if code == RATE_LIMIT_MARKER || kind == "rate_limit_error" {
            return ParseOutcome::RateLimited;
        }
        return ParseOutcome::Malformed(format!("oracle returned an error: {}", error));
    }

    match serde_json::from_value::<TranslatedUnit>(value) {
        Ok(unit) => ParseOutcome::Parsed(unit),
        Err(e) => ParseOutcome::Malformed(format!("unexpected response shape: {}", e)),
    }
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
