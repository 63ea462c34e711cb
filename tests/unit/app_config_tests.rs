/*!
 * Tests for application configuration functionality
 */

use docutrans::app_config::{
    Config, LogLevel, ProviderConfig, TranslationMode, TranslationProvider,
};

fn config_with_key() -> Config {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "Detect language");
    assert_eq!(config.target_language, "Spanish (Argentina)");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.log_level, LogLevel::Info);

    let common = &config.translation.common;
    assert_eq!(common.batch_size, 8);
    assert_eq!(common.retry_limit, 3);
    assert_eq!(common.max_parse_attempts, 5);
    assert_eq!(common.rate_limit_cooldown_secs, 60);
    assert_eq!(common.max_rate_limit_waits, 20);
    assert_eq!(common.mode, TranslationMode::SinglePass);
    assert!(common.skip_untranslatable);

    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = config_with_key();
    assert!(config.validate().is_ok());

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "Detect language".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());
    config.translation.common.batch_size = 4;

    config.translation.common.temperature = 3.5;
    assert!(config.validate().is_err());
    config.translation.common.temperature = 0.3;

    assert!(config.validate().is_ok());
}

/// A local provider needs no key
#[test]
fn test_config_validation_withLmStudio_shouldNotRequireKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;

    assert!(config.validate().is_ok());
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
    assert!(config.translation.get_api_key().is_empty());
}

/// Partial files are completed with defaults
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "target_language": "fr",
        "translation": {
            "provider": "lmstudio",
            "common": { "batch_size": 2, "mode": "two_pass" }
        }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.source_language, "Detect language");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.common.batch_size, 2);
    assert_eq!(config.translation.common.mode, TranslationMode::TwoPass);
    assert_eq!(config.translation.common.retry_limit, 3);
    assert_eq!(config.translation.get_model(), "local-model");
}

/// The active provider entry is created when missing
#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.translation.available_providers.clear();

    config.translation.active_provider_config_mut().model = "gpt-4o".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "gpt-4o");
}

/// Language codes are shown to the model as English names
#[test]
fn test_languageNames_withIsoCodes_shouldResolve() {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "deu".to_string();

    assert_eq!(config.source_language_name(), "English");
    assert_eq!(config.target_language_name(), "German");
}

/// Test provider string conversions
#[test]
fn test_translationProvider_fromStr_shouldParseKnownNames() {
    assert_eq!("openai".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("LMStudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    assert_eq!(ProviderConfig::new(TranslationProvider::LMStudio).provider_type, "lmstudio");
}

/// A missing file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = crate::common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(created.target_language, loaded.target_language);
    assert_eq!(loaded.translation.common.batch_size, 8);
}
