/*!
 * End-to-end tests for translating .docx files through the controller
 */

use std::sync::Arc;

use docutrans::app_config::Config;
use docutrans::{AppError, DocumentError, DocxPackage, TranslationError};
use docutrans::app_controller::Controller;
use docutrans::providers::mock::MockProvider;

use crate::common::{build_docx, create_temp_dir, create_test_docx, init_test_logging, read_paragraph_texts};

fn controller(provider: &MockProvider) -> Controller {
    init_test_logging();
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "es".to_string();
    Controller::with_provider(config, Arc::new(provider.clone()))
}

/// A file is translated next to its input with the target tag in its name
#[tokio::test]
async fn test_run_withDocx_shouldWriteTranslatedCopy() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_docx(dir.path(), "letter.docx", &[&["Dear ", "team,"], &["See you soon."]]).unwrap();
    let provider = MockProvider::echo_with_prefix("ES:");

    let stats = controller(&provider).run(&input, None, false).await.unwrap().unwrap();

    let output = dir.path().join("letter.es.docx");
    assert!(output.exists());
    assert_eq!(
        read_paragraph_texts(&output).unwrap(),
        vec![vec!["ES:Dear ", "ES:team,"], vec!["ES:See you soon."]]
    );
    assert_eq!(stats.translated, 2);

    // The input is left as it was
    assert_eq!(
        read_paragraph_texts(&input).unwrap(),
        vec![vec!["Dear ", "team,"], vec!["See you soon."]]
    );
}

/// Archive parts other than the main document are copied unchanged
#[tokio::test]
async fn test_run_shouldPreserveOtherParts() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_docx(dir.path(), "in.docx", &[&["Hello"]]).unwrap();
    let output = dir.path().join("out.docx");
    let provider = MockProvider::echo();

    controller(&provider).run(&input, Some(output.clone()), false).await.unwrap();

    let original = DocxPackage::read(&input).unwrap();
    let translated = DocxPackage::read(&output).unwrap();
    assert_eq!(original.entries.len(), translated.entries.len());
    assert_eq!(original.part("word/styles.xml"), translated.part("word/styles.xml"));
    assert_eq!(original.part("[Content_Types].xml"), translated.part("[Content_Types].xml"));
}

/// Existing output is kept unless overwriting is forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldRespectForceFlag() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_docx(dir.path(), "memo.docx", &[&["Hello"]]).unwrap();
    let output = dir.path().join("memo.es.docx");
    std::fs::write(&output, b"placeholder").unwrap();
    let provider = MockProvider::echo();

    let skipped = controller(&provider).run(&input, None, false).await.unwrap();
    assert!(skipped.is_none());
    assert_eq!(std::fs::read(&output).unwrap(), b"placeholder");
    assert_eq!(provider.request_count(), 0);

    let forced = controller(&provider).run(&input, None, true).await.unwrap();
    assert!(forced.is_some());
    assert_eq!(read_paragraph_texts(&output).unwrap(), vec![vec!["[TRANSLATED] Hello"]]);
}

/// A file that is not a .docx archive is reported as an error
#[test]
fn test_run_withInvalidArchive_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let input = dir.path().join("broken.docx");
    std::fs::write(&input, b"definitely not a zip").unwrap();

    let result = tokio_test::block_on(controller(&MockProvider::echo()).run(&input, None, false));

    assert!(matches!(result, Err(AppError::Document(DocumentError::Archive(_)))));
    assert!(!dir.path().join("broken.es.docx").exists());
}

/// A main part with broken XML fails before anything is sent or written
#[tokio::test]
async fn test_run_withMalformedDocumentXml_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let input = dir.path().join("truncated.docx");
    std::fs::write(&input, build_docx("<w:document><w:body><w:p>")).unwrap();
    let provider = MockProvider::echo();

    let result = controller(&provider).run(&input, None, false).await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Document(DocumentError::Xml(_))))
    ));
    assert_eq!(provider.request_count(), 0);
    assert!(!dir.path().join("truncated.es.docx").exists());
}
