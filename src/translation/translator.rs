/*!
 * Per-paragraph translation loop.
 *
 * Each unit goes through `send -> parse` until a reply parses, with a
 * cool-down after rate-limit signals. Failed replies and cool-downs are capped
 * separately; a unit that never gets a usable reply ends as `Untranslated`
 * and keeps its text.
 */

use std::fmt;
use std::time::Duration;

use log::{debug, warn};

use crate::app_config::TranslationMode;
use crate::translation::fragments::{ParagraphUnit, SkipReason};
use crate::translation::oracle::Oracle;
use crate::translation::prompts::PromptKind;
use crate::translation::sanitizer::{ParseOutcome, TranslatedUnit, parse_response};

/// Terminal state of one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// The oracle produced a usable translation
    Translated(TranslatedUnit),
    /// The unit was never sent
    Skipped(SkipReason),
    /// Every attempt failed; the paragraph keeps its original text
    Untranslated { reason: String },
}

impl UnitOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }

    pub fn translation(&self) -> Option<&TranslatedUnit> {
        match self {
            Self::Translated(unit) => Some(unit),
            _ => None,
        }
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translated(_) => write!(f, "translated"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Untranslated { reason } => write!(f, "untranslated ({})", reason),
        }
    }
}

/// Outcome of a unit plus what it took to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub outcome: UnitOutcome,
    /// Requests sent to the oracle
    pub sends: u32,
    /// Replies that could not be parsed
    pub parse_failures: u32,
    /// Cool-downs taken after rate-limit signals
    pub rate_limit_waits: u32,
}

impl UnitReport {
    fn new(outcome: UnitOutcome) -> Self {
        Self {
            outcome,
            sends: 0,
            parse_failures: 0,
            rate_limit_waits: 0,
        }
    }
}

/// Limits and mode of the translation loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatorSettings {
    pub mode: TranslationMode,
    /// Sends per pass before giving up
    pub max_parse_attempts: u32,
    /// Wait after a rate-limit signal
    pub rate_limit_cooldown: Duration,
    /// Cool-downs per pass before giving up
    pub max_rate_limit_waits: u32,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            mode: TranslationMode::SinglePass,
            max_parse_attempts: 5,
            rate_limit_cooldown: Duration::from_secs(60),
            max_rate_limit_waits: 20,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pass<'a> {
    Translate(PromptKind),
    Improve(&'a TranslatedUnit),
}

/// Drives one paragraph at a time through the oracle.
#[derive(Debug, Clone)]
pub struct Translator {
    oracle: Oracle,
    settings: TranslatorSettings,
}

impl Translator {
    pub fn new(oracle: Oracle, settings: TranslatorSettings) -> Self {
        Self { oracle, settings }
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    /// Translate one unit to a terminal outcome.
    pub async fn translate_unit(&self, unit: &ParagraphUnit) -> UnitReport {
        if let Some(reason) = unit.skip {
            debug!("Paragraph {} skipped: {}", unit.position, reason);
            return UnitReport::new(UnitOutcome::Skipped(reason));
        }

        let mut report = UnitReport::new(UnitOutcome::Untranslated { reason: String::new() });
        let outcome = match self.settings.mode {
            TranslationMode::SinglePass => {
                self.outcome_of(self.run_pass(unit, Pass::Translate(PromptKind::TranslateAndRepair), &mut report).await)
            }
            TranslationMode::TwoPass => match self.run_pass(unit, Pass::Translate(PromptKind::Translate), &mut report).await {
                Ok(first) => match self.run_pass(unit, Pass::Improve(&first), &mut report).await {
                    Ok(improved) => UnitOutcome::Translated(improved),
                    Err(reason) => {
                        warn!("Paragraph {}: improve pass failed, keeping first pass: {}", unit.position, reason);
                        UnitOutcome::Translated(first)
                    }
                },
                Err(reason) => UnitOutcome::Untranslated { reason },
            },
        };
        report.outcome = outcome;

        if let UnitOutcome::Untranslated { reason } = &report.outcome {
            warn!("Paragraph {} left untranslated: {}", unit.position, reason);
        }
        report
    }

    fn outcome_of(&self, result: Result<TranslatedUnit, String>) -> UnitOutcome {
        match result {
            Ok(translated) => UnitOutcome::Translated(translated),
            Err(reason) => UnitOutcome::Untranslated { reason },
        }
    }

    async fn run_pass(&self, unit: &ParagraphUnit, pass: Pass<'_>, report: &mut UnitReport) -> Result<TranslatedUnit, String> {
        let max_attempts = self.settings.max_parse_attempts.max(1);
        let mut attempts = 0;
        let mut waits = 0;
        let mut last_failure = String::from("no attempt made");

        loop {
            report.sends += 1;
            let reply = match pass {
                Pass::Translate(kind) => self.oracle.translate(kind, unit).await,
                Pass::Improve(first) => self.oracle.improve(unit, first).await,
            };

            let rate_limited = match reply {
                Ok(text) => match parse_response(&text) {
                    ParseOutcome::Parsed(translated) => return Ok(translated),
                    ParseOutcome::RateLimited => true,
                    ParseOutcome::Malformed(why) => {
                        attempts += 1;
                        report.parse_failures += 1;
                        debug!(
                            "Paragraph {}: unparseable reply (attempt {}/{}): {}",
                            unit.position, attempts, max_attempts, why
                        );
                        last_failure = why;
                        false
                    }
                },
                Err(e) if e.is_rate_limit() => true,
                Err(e) if !e.is_retryable() => return Err(e.to_string()),
                Err(e) => {
                    attempts += 1;
                    last_failure = e.to_string();
                    false
                }
            };

            if rate_limited {
                // Cool-downs have their own budget and leave parse attempts untouched
                if waits >= self.settings.max_rate_limit_waits {
                    return Err(format!("rate limit still exceeded after {} cool-downs", waits));
                }
                waits += 1;
                report.rate_limit_waits += 1;
                warn!(
                    "Paragraph {}: rate limit reached, waiting {:?} before retrying ({}/{})",
                    unit.position, self.settings.rate_limit_cooldown, waits, self.settings.max_rate_limit_waits
                );
                tokio::time::sleep(self.settings.rate_limit_cooldown).await;
            } else if attempts >= max_attempts {
                return Err(format!("no valid reply after {} attempts: {}", attempts, last_failure));
            }
        }
    }
}
