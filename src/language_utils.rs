/*!
 * Language naming helpers.
 *
 * Languages reach the prompts as English names ("French", "Spanish (Argentina)").
 * Users may configure ISO 639-1 or ISO 639-2 codes instead; those are
 * resolved here. Anything that is not a code is kept verbatim.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Source language sentinel asking the oracle to identify the language itself
pub const AUTO_DETECT_LANGUAGE: &str = "Detect language";

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Whether `language` is the auto-detect sentinel.
pub fn is_auto_detect(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case(AUTO_DETECT_LANGUAGE)
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
            {
                return Ok(terminology.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Name to use for a configured language.
///
/// ISO codes become English names; the auto-detect sentinel and free-form
/// names are returned trimmed but otherwise unchanged.
pub fn display_name(language: &str) -> String {
    let trimmed = language.trim();
    if is_auto_detect(trimmed) {
        return AUTO_DETECT_LANGUAGE.to_string();
    }
    get_language_name(trimmed).unwrap_or_else(|_| trimmed.to_string())
}

/// Short tag for file names: the ISO 639-1 code when one exists, else a slug of the name.
pub fn file_tag(language: &str) -> String {
    let trimmed = language.trim();
    if let Ok(part2t) = normalize_to_part2t(trimmed) {
        if let Some(part1) = Language::from_639_3(&part2t).and_then(|l| l.to_639_1()) {
            return part1.to_string();
        }
        return part2t;
    }
    if let Some(lang) = Language::from_name(trimmed) {
        if let Some(part1) = lang.to_639_1() {
            return part1.to_string();
        }
    }
    let slug: String = trimmed
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    slug.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-")
}
