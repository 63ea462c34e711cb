use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::document::DocxPackage;
use crate::errors::AppError;
use crate::language_utils;
use crate::providers::CompletionProvider;
use crate::providers::openai::OpenAI;
use crate::translation::{DocumentTranslator, TranslationStats, UnitOutcome};

// @module: Application controller for document translation

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Oracle backend shared by every paragraph
    provider: Arc<dyn CompletionProvider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let translation = &config.translation;
        let provider = OpenAI::new(
            translation.get_api_key(),
            translation.get_endpoint(),
            translation.get_model(),
            translation.common.temperature,
            translation.get_timeout_secs(),
        )?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create a controller that talks to the given provider
    pub fn with_provider(config: Config, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output path used when none is given: `<stem>.<target>.docx` next to the input
    pub fn default_output_path(&self, input_file: &Path) -> PathBuf {
        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let file_name = format!("{}.{}.docx", stem, language_utils::file_tag(&self.config.target_language));
        input_file.with_file_name(file_name)
    }

    /// Translate `input_file` and write the result
    ///
    /// Returns `None` when the output already exists and `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<TranslationStats>, AppError> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(AppError::File(format!("Input file does not exist: {}", input_file.display())));
        }

        let output_path = output_file.unwrap_or_else(|| self.default_output_path(input_file));
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping file, translation already exists at {} (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(None);
        }

        info!(
            "docutrans: {} - {} | {} -> {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.source_language_name(),
            self.config.target_language_name()
        );

        let package = DocxPackage::read(input_file)?;

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));

        let (bytes, stats) = self.translate_package(&package, &progress_bar).await?;
        progress_bar.finish_and_clear();

        std::fs::write(&output_path, bytes).map_err(|e| {
            AppError::File(format!("Failed to write translated document {}: {}", output_path.display(), e))
        })?;

        info!(
            "Wrote {} in {:.1}s: {}",
            output_path.display(),
            start_time.elapsed().as_secs_f32(),
            stats.summary()
        );
        Ok(Some(stats))
    }

    /// Translate the main document part of a package and return the new archive bytes
    pub async fn translate_package(
        &self,
        package: &DocxPackage,
        progress_bar: &ProgressBar,
    ) -> Result<(Vec<u8>, TranslationStats), AppError> {
        let translator = DocumentTranslator::from_config(&self.config, Arc::clone(&self.provider))?;
        let result = translator
            .translate_package(package, |update| {
                progress_bar.set_length(update.total_paragraphs as u64);
                progress_bar.inc(1);
                if let UnitOutcome::Untranslated { .. } = update.result {
                    progress_bar.set_message(format!("paragraph {} left untranslated", update.position + 1));
                }
            })
            .await?;
        Ok(result)
    }
}
