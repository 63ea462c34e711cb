/*!
 * End-to-end document translation.
 *
 * `DocumentTranslator` runs the whole flow over one document tree:
 * segment and index the paragraphs, translate them batch by batch, then
 * write the results back into the tree once every batch has resolved.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::app_config::Config;
use crate::document::{DocumentTree, DocxPackage};
use crate::errors::TranslationError;
use crate::providers::CompletionProvider;
use crate::translation::batch::run_batches;
use crate::translation::fragments::{ParagraphUnit, index_document};
use crate::translation::oracle::{Oracle, RetryPolicy};
use crate::translation::prompts::PromptBuilder;
use crate::translation::reassembly::reassemble;
use crate::translation::translator::{Translator, TranslatorSettings, UnitOutcome, UnitReport};

/// Counters for one translated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Paragraphs found in the document
    pub total_paragraphs: usize,

    /// Paragraphs with a usable translation
    pub translated: usize,

    /// Empty or untranslatable paragraphs that were never sent
    pub skipped: usize,

    /// Paragraphs that kept their text after every attempt failed
    pub untranslated: usize,

    /// Text leaves that received a translation
    pub fragments_applied: usize,

    /// Text leaves left as they were for lack of a matching translation
    pub fragments_unmatched: usize,

    /// Translations that matched no text leaf
    pub fragments_dropped: usize,

    /// Oracle replies that had to be asked for again
    pub parse_retries: usize,

    /// Cool-downs taken after rate-limit signals
    pub rate_limit_waits: usize,
}

impl TranslationStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, report: &UnitReport) {
        match report.outcome {
            UnitOutcome::Translated(_) => self.translated += 1,
            UnitOutcome::Skipped(_) => self.skipped += 1,
            UnitOutcome::Untranslated { .. } => self.untranslated += 1,
        }
        self.parse_retries += report.parse_failures as usize;
        self.rate_limit_waits += report.rate_limit_waits as usize;
    }

    /// Share of the paragraphs that were sent which came back translated.
    pub fn success_rate(&self) -> f32 {
        let attempted = self.translated + self.untranslated;
        if attempted == 0 {
            return 100.0;
        }
        (self.translated as f32 / attempted as f32) * 100.0
    }

    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} paragraphs: {} translated, {} skipped, {} untranslated ({:.1}% success)",
            self.total_paragraphs,
            self.translated,
            self.skipped,
            self.untranslated,
            self.success_rate()
        );
        summary.push_str(&format!(
            "; fragments: {} applied, {} unmatched, {} dropped",
            self.fragments_applied, self.fragments_unmatched, self.fragments_dropped
        ));
        if self.parse_retries > 0 || self.rate_limit_waits > 0 {
            summary.push_str(&format!(
                "; {} parse retries, {} rate-limit waits",
                self.parse_retries, self.rate_limit_waits
            ));
        }
        summary
    }
}

/// Reported after each paragraph reaches a terminal outcome.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate<'a> {
    /// Position of the paragraph in the document
    pub position: usize,
    pub result: &'a UnitOutcome,
    pub total_paragraphs: usize,
}

/// Translates every paragraph of a document tree.
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    translator: Translator,
    batch_size: usize,
    skip_untranslatable: bool,
}

impl DocumentTranslator {
    pub fn new(translator: Translator, batch_size: usize, skip_untranslatable: bool) -> Self {
        Self {
            translator,
            batch_size: batch_size.max(1),
            skip_untranslatable,
        }
    }

    /// Wire a translator from the configuration.
    pub fn from_config(config: &Config, provider: Arc<dyn CompletionProvider>) -> Result<Self, TranslationError> {
        let common = &config.translation.common;
        if common.batch_size == 0 {
            return Err(TranslationError::Config("batch_size must be at least 1".to_string()));
        }
        if common.max_parse_attempts == 0 {
            return Err(TranslationError::Config("max_parse_attempts must be at least 1".to_string()));
        }

        let prompts = PromptBuilder::new(&config.source_language_name(), &config.target_language_name());
        let oracle = Oracle::new(
            provider,
            prompts,
            RetryPolicy::new(common.retry_limit, common.retry_backoff_ms),
        );
        let settings = TranslatorSettings {
            mode: common.mode,
            max_parse_attempts: common.max_parse_attempts,
            rate_limit_cooldown: Duration::from_secs(common.rate_limit_cooldown_secs),
            max_rate_limit_waits: common.max_rate_limit_waits,
        };

        Ok(Self::new(
            Translator::new(oracle, settings),
            common.batch_size,
            common.skip_untranslatable,
        ))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Paragraph units of `tree` as they will be sent.
    pub fn units(&self, tree: &DocumentTree) -> Vec<ParagraphUnit> {
        index_document(tree, self.skip_untranslatable)
    }

    /// Translate `tree` in place.
    ///
    /// The tree is only written after all paragraphs are resolved. Paragraphs
    /// that could not be translated keep their original text.
    pub async fn translate_tree<F>(&self, tree: &mut DocumentTree, mut on_progress: F) -> TranslationStats
    where
        F: FnMut(ProgressUpdate<'_>),
    {
        let units = self.units(tree);
        let total_paragraphs = units.len();
        let mut stats = TranslationStats {
            total_paragraphs,
            ..TranslationStats::default()
        };

        if units.is_empty() {
            info!("No paragraphs to translate");
            return stats;
        }

        info!(
            "Translating {} paragraphs in batches of {}",
            total_paragraphs, self.batch_size
        );

        let reports = run_batches(
            &units,
            self.batch_size,
            |unit| self.translator.translate_unit(unit),
            |index, report: &UnitReport| {
                let position = units[index].position;
                debug!("Paragraph {}/{}: {}", position + 1, total_paragraphs, report.outcome);
                on_progress(ProgressUpdate {
                    position,
                    result: &report.outcome,
                    total_paragraphs,
                });
            },
        )
        .await;

        reports.iter().for_each(|report| stats.record(report));
        let outcomes: Vec<UnitOutcome> = reports.into_iter().map(|report| report.outcome).collect();

        let counts = reassemble(tree, &units, &outcomes);
        stats.fragments_applied = counts.applied;
        stats.fragments_unmatched = counts.unmatched;
        stats.fragments_dropped = counts.dropped;

        info!("Translation finished: {}", stats.summary());
        stats
    }

    /// Translate the main part of `package` and return the rebuilt archive.
    pub async fn translate_package<F>(
        &self,
        package: &DocxPackage,
        on_progress: F,
    ) -> Result<(Vec<u8>, TranslationStats), TranslationError>
    where
        F: FnMut(ProgressUpdate<'_>),
    {
        let mut tree = package.document_tree()?;
        let stats = self.translate_tree(&mut tree, on_progress).await;
        let bytes = package.to_bytes_with_document(&tree)?;
        Ok((bytes, stats))
    }
}
