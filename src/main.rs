// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use docutrans::app_config::{self, Config, TranslationMode, TranslationProvider};
use docutrans::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for TranslationMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationMode {
    SinglePass,
    TwoPass,
}

impl From<CliTranslationMode> for TranslationMode {
    fn from(cli_mode: CliTranslationMode) -> Self {
        match cli_mode {
            CliTranslationMode::SinglePass => TranslationMode::SinglePass,
            CliTranslationMode::TwoPass => TranslationMode::TwoPass,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// docutrans - translate Word documents with a language model
///
/// Every paragraph is sent to the model with its text runs indexed, and the
/// translations are written back run by run so formatting survives.
#[derive(Parser, Debug)]
#[command(name = "docutrans")]
#[command(version = "0.1.0")]
#[command(about = "Paragraph-aware DOCX translation with a language model")]
#[command(long_about = "docutrans translates the text of a .docx file paragraph by paragraph, keeping run formatting.

EXAMPLES:
    docutrans report.docx                          # Translate using default config
    docutrans -t fr report.docx                    # Translate to French
    docutrans -s en -t es -o out.docx report.docx  # Explicit languages and output
    docutrans --mode two-pass report.docx          # Translate, then improve each paragraph
    docutrans -p lmstudio -m qwen2.5 report.docx   # Use a local LM Studio server

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The OpenAI key may also come from OPENAI_API_KEY.")]
struct CommandLineOptions {
    /// Input .docx file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: <stem>.<target>.docx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language name or code, or "Detect language"
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language name or code (e.g., 'es', 'French')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Paragraphs translated concurrently
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Translation mode
    #[arg(long, value_enum)]
    mode: Option<CliTranslationMode>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

impl CommandLineOptions {
    // @applies: Command line values over the loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.translation.provider = provider.clone().into();
        }
        if let Some(model) = &self.model {
            config.translation.active_provider_config_mut().model = model.clone();
        }
        if let Some(source_language) = &self.source_language {
            config.source_language = source_language.clone();
        }
        if let Some(target_language) = &self.target_language {
            config.target_language = target_language.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.translation.common.batch_size = batch_size;
        }
        if let Some(mode) = &self.mode {
            config.translation.common.mode = mode.clone().into();
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone().into();
        }
    }
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let options = CommandLineOptions::parse();
    if let Some(log_level) = &options.log_level {
        let level: app_config::LogLevel = log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(&options.config_path))?;
    options.apply_to(&mut config);
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    match controller
        .run(&options.input, options.output.clone(), options.force_overwrite)
        .await?
    {
        Some(stats) if stats.untranslated > 0 => info!(
            "{} paragraph(s) kept their original text; run again to retry them",
            stats.untranslated
        ),
        _ => {}
    }

    Ok(())
}
