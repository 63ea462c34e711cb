/*!
 * Integration tests for the paragraph translation pipeline.
 *
 * Documents are parsed from realistic `word/document.xml` parts and
 * translated against scripted mock providers.
 */

use std::sync::Arc;
use std::time::Duration;

use docutrans::app_config::{Config, TranslationMode};
use docutrans::document::{DocumentTree, parse_document, write_document};
use docutrans::providers::mock::{MockProvider, MockReply};
use docutrans::translation::DocumentTranslator;
use docutrans::translation::fragments::index_document;
use docutrans::translation::locator::extract_text;

use crate::common::{document_xml, init_test_logging, paragraph_texts, texts_at};

const HOLA_MUNDO: &str = r#"{"paragraph":"Hola mundo.","nodes":[{"index":1,"translation":"Hola "},{"index":2,"translation":"mundo."}]}"#;

fn tree(paragraphs: &[&[&str]]) -> DocumentTree {
    parse_document(document_xml(paragraphs).as_bytes()).unwrap()
}

fn test_config(batch_size: usize, mode: TranslationMode) -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "es".to_string();
    config.translation.common.batch_size = batch_size;
    config.translation.common.mode = mode;
    config.translation.common.retry_limit = 2;
    config.translation.common.retry_backoff_ms = 10;
    config.translation.common.max_parse_attempts = 3;
    config
}

fn translator(provider: &MockProvider, batch_size: usize, mode: TranslationMode) -> DocumentTranslator {
    init_test_logging();
    DocumentTranslator::from_config(&test_config(batch_size, mode), Arc::new(provider.clone())).unwrap()
}

/// The reference scenario: two runs become "Hola " and "mundo."
#[tokio::test]
async fn test_translateTree_withHelloWorld_shouldProduceHolaMundo() {
    let provider = MockProvider::fixed(HOLA_MUNDO);
    let mut tree = tree(&[&["Hello ", "world."]]);

    let stats = translator(&provider, 8, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(texts_at(&tree, &[0, 0]), vec!["Hola ", "mundo."]);
    assert_eq!(extract_text(&tree.root), "Hola mundo.");
    assert_eq!(stats.translated, 1);
    assert_eq!(stats.fragments_applied, 2);

    let written = String::from_utf8(write_document(&tree).unwrap()).unwrap();
    assert!(written.contains(r#"<w:t xml:space="preserve">Hola </w:t>"#));
    assert!(written.contains("<w:rPr><w:b/></w:rPr><w:t>mundo.</w:t>"));
}

/// Reordered replies are matched by index, unknown indices are dropped
#[tokio::test]
async fn test_translateTree_withReorderedReply_shouldMatchByIndex() {
    let reply = r#"```json
{"paragraph":"abc","nodes":[{"index":3,"translation":"c"},{"index":1,"translation":"a"},{"index":2,"translation":"b"},{"index":9,"translation":"?"}]}
```"#;
    let provider = MockProvider::fixed(reply);
    let mut tree = tree(&[&["A", "B", "C"]]);

    let stats = translator(&provider, 8, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(paragraph_texts(&tree), vec![vec!["a", "b", "c"]]);
    assert_eq!(stats.fragments_dropped, 1);
}

/// A merged reply leaves the unmentioned runs as they were
#[tokio::test]
async fn test_translateTree_withMergedReply_shouldKeepUnmatchedRuns() {
    let reply = r#"{"paragraph":"Todo junto","nodes":[{"index":1,"translation":"Todo junto"}]}"#;
    let provider = MockProvider::fixed(reply);
    let mut tree = tree(&[&["All ", "together"]]);

    let stats = translator(&provider, 8, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(paragraph_texts(&tree), vec![vec!["Todo junto", "together"]]);
    assert_eq!(stats.fragments_unmatched, 1);
}

fn slow_first_paragraphs(user: &str) -> u64 {
    if user.contains("One.") || user.contains("Three.") { 50 } else { 5 }
}

/// Results stay in document order whatever order calls finish in
#[tokio::test(start_paused = true)]
async fn test_translateTree_withBatchesOfTwo_shouldKeepDocumentOrder() {
    let provider = MockProvider::echo_with_prefix("ES:").with_delay(slow_first_paragraphs);
    let mut tree = tree(&[&["One."], &["Two."], &["Three."], &["Four."], &["Five."]]);
    let mut completed = Vec::new();

    let stats = translator(&provider, 2, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |update| completed.push(update.position))
        .await;

    assert_eq!(
        paragraph_texts(&tree),
        vec![vec!["ES:One."], vec!["ES:Two."], vec!["ES:Three."], vec!["ES:Four."], vec!["ES:Five."]]
    );
    assert_eq!(completed, vec![1, 0, 3, 2, 4]);
    assert_eq!(stats.translated, 5);
}

/// Malformed replies and rate limits are retried within the ceiling
#[tokio::test(start_paused = true)]
async fn test_translateTree_withFlakyOracle_shouldRecover() {
    let provider = MockProvider::fixed(HOLA_MUNDO).with_replies(vec![
        MockReply::Text("Sorry, here you go: {\"paragraph\": ".to_string()),
        MockReply::RateLimited,
    ]);
    let mut tree = tree(&[&["Hello ", "world."]]);

    let stats = translator(&provider, 8, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(extract_text(&tree.root), "Hola mundo.");
    assert_eq!(stats.parse_retries, 1);
    assert_eq!(stats.rate_limit_waits, 1);
    assert_eq!(provider.request_count(), 3);
}

/// A paragraph that never parses keeps its text and the others still translate
#[tokio::test(start_paused = true)]
async fn test_translateTree_withPersistentFailure_shouldLeaveParagraphUntranslated() {
    let provider = MockProvider::echo_with_prefix("ES:").with_texts(vec!["nope", "nope", "nope"]);
    let mut tree = tree(&[&["First."], &["Second."]]);

    let stats = translator(&provider, 1, TranslationMode::SinglePass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(paragraph_texts(&tree), vec![vec!["First."], vec!["ES:Second."]]);
    assert_eq!(stats.untranslated, 1);
    assert_eq!(stats.translated, 1);
    assert_eq!(stats.success_rate(), 50.0);
}

/// Two-pass mode sends a translate and an improve request per paragraph
#[tokio::test]
async fn test_translateTree_withTwoPassMode_shouldImproveFirstPass() {
    let improved = r#"{"paragraph":"¡Hola, mundo!","nodes":[{"index":1,"translation":"¡Hola, "},{"index":2,"translation":"mundo!"}]}"#;
    let provider = MockProvider::fixed(improved).with_texts(vec![HOLA_MUNDO]);
    let mut tree = tree(&[&["Hello ", "world."]]);

    translator(&provider, 8, TranslationMode::TwoPass)
        .translate_tree(&mut tree, |_| {})
        .await;

    assert_eq!(extract_text(&tree.root), "¡Hola, mundo!");
    let prompts = provider.recorded_prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].1.contains("\"translation\": \"Hola \""));
}

/// Plain text of every unit is the concatenation of its fragments
#[test]
fn test_indexDocument_shouldKeepPlainTextConsistent() {
    let tree = tree(&[&["This course ", "helps ", "you."], &[], &["50%"]]);

    let units = index_document(&tree, true);

    assert_eq!(units.len(), 3);
    for unit in &units {
        let joined: String = unit.fragments.iter().map(|f| f.original_text.as_str()).collect();
        assert_eq!(joined, unit.plain_text);
        let indices: Vec<usize> = unit.fragments.iter().map(|f| f.index).collect();
        assert_eq!(indices, (1..=unit.fragments.len()).collect::<Vec<_>>());
    }
    assert!(!units[0].is_skipped());
    assert!(units[1].is_skipped());
    assert!(units[2].is_skipped());
}
