/*!
 * Tests for oracle reply sanitizing and parsing
 */

use docutrans::translation::sanitizer::{ParseOutcome, TranslatedUnit, parse_response, sanitize};

fn parsed(raw: &str) -> TranslatedUnit {
    match parse_response(raw) {
        ParseOutcome::Parsed(unit) => unit,
        other => panic!("expected a parsed reply, got {:?}", other),
    }
}

/// Fenced replies with trailing garbage are recovered
#[test]
fn test_sanitize_withFenceAndTrailingGarbage_shouldRecoverObject() {
    let raw = "```json\n{\"paragraph\":\"x\",\"nodes\":[]}\nextra-trailing-garbage";

    assert_eq!(sanitize(raw), Some(r#"{"paragraph":"x","nodes":[]}"#));

    let unit = parsed(raw);
    assert_eq!(unit.paragraph, "x");
    assert!(unit.nodes.is_empty());
}

/// Chatty prefixes and suffixes around the object are ignored
#[test]
fn test_parseResponse_withSurroundingProse_shouldParse() {
    let raw = r#"Sure! Here is the translation:
{"paragraph": "Hola mundo.", "nodes": [{"index": 2, "translation": "mundo."}, {"index": "1", "translation": "Hola "}]}
Let me know if you need anything else."#;

    let unit = parsed(raw);

    assert_eq!(unit.translation_for(1), Some("Hola "));
    assert_eq!(unit.translation_for(2), Some("mundo."));
}

/// Escaped quotes inside translations survive
#[test]
fn test_parseResponse_withEscapedQuotes_shouldKeepThem() {
    let raw = r#"{"paragraph":"Dijo \"hola\"","nodes":[{"index":1,"translation":"Dijo \"hola\" y l'amour"}]}"#;

    assert_eq!(parsed(raw).translation_for(1), Some("Dijo \"hola\" y l'amour"));
}

/// Broken or mis-shaped JSON is reported as malformed
#[test]
fn test_parseResponse_withBrokenJson_shouldBeMalformed() {
    assert!(matches!(parse_response("I can't help with that."), ParseOutcome::Malformed(_)));
    assert!(matches!(parse_response(r#"{"paragraph": "x", "nodes": [{"index": 1}"#), ParseOutcome::Malformed(_)));
    assert!(matches!(parse_response(r#"{"paragraph": "no nodes"}"#), ParseOutcome::Malformed(_)));
}

/// Rate-limit errors embedded in a reply are recognized
#[test]
fn test_parseResponse_withRateLimitMarker_shouldSignalRateLimit() {
    let envelope = r#"{"error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}}"#;

    assert_eq!(parse_response(envelope), ParseOutcome::RateLimited);
    assert_eq!(parse_response("Error: rate_limit_exceeded, retry later"), ParseOutcome::RateLimited);
    assert!(matches!(
        parse_response(r#"{"error": {"message": "bad model", "code": "model_not_found"}}"#),
        ParseOutcome::Malformed(_)
    ));
}
