/*!
 * Tests for the document tree, XML codec and DOCX container
 */

use docutrans::DocxPackage;
use docutrans::document::package::DOCUMENT_PART;
use docutrans::document::{NodePath, TextPayload, parse_document, write_document};
use docutrans::translation::locator::{extract_text, locate, locate_mut};
use docutrans::translation::segmenter::segment_document;

use crate::common::{build_docx, document_xml, paragraph_texts};

/// Parsing then writing an untouched part gives the same bytes
#[test]
fn test_writeDocument_withUntouchedTree_shouldReproduceBytes() {
    let xml = document_xml(&[&["Hello ", "world & co."], &["Second <paragraph>."]]);

    let tree = parse_document(xml.as_bytes()).unwrap();
    let written = write_document(&tree).unwrap();

    assert_eq!(String::from_utf8(written).unwrap(), xml);
}

/// Paragraphs come from the body in document order
#[test]
fn test_segmentDocument_withRealisticPart_shouldFindBodyParagraphs() {
    let xml = document_xml(&[&["One"], &["Two ", "halves"], &[]]);
    let tree = parse_document(xml.as_bytes()).unwrap();

    let paragraphs = segment_document(&tree);

    assert_eq!(paragraphs.len(), 3);
    assert_eq!(paragraphs[0], NodePath::from(vec![0, 0]));
    assert_eq!(paragraph_texts(&tree), vec![vec!["One"], vec!["Two ", "halves"], vec![]]);
}

/// Locating twice yields the same leaves
#[test]
fn test_locate_calledTwice_shouldBeStable() {
    let xml = document_xml(&[&["a", "b", "c"], &["d"]]);
    let tree = parse_document(xml.as_bytes()).unwrap();

    let first: Vec<String> = locate(&tree.root).iter().map(|l| l.text().to_string()).collect();
    let second: Vec<String> = locate(&tree.root).iter().map(|l| l.text().to_string()).collect();

    assert_eq!(first, vec!["a", "b", "c", "d"]);
    assert_eq!(first, second);
    assert_eq!(extract_text(&tree.root), "abcd");
}

/// A leaf that gains edge spaces is written with xml:space="preserve"
#[test]
fn test_setText_withEdgeSpaces_shouldWritePreserveAttribute() {
    let xml = document_xml(&[&["Hello"]]);
    let mut tree = parse_document(xml.as_bytes()).unwrap();

    let leaves = locate_mut(&mut tree.root);
    assert!(matches!(leaves[0].payload, TextPayload::Plain(_)));
    leaves.into_iter().for_each(|leaf| leaf.set_text("Hola "));

    let written = String::from_utf8(write_document(&tree).unwrap()).unwrap();
    assert!(written.contains(r#"<w:t xml:space="preserve">Hola </w:t>"#));
}

/// Other archive parts are carried over untouched
#[test]
fn test_docxPackage_roundTrip_shouldKeepOtherParts() {
    let bytes = build_docx(&document_xml(&[&["Hi"]]));
    let package = DocxPackage::from_bytes(&bytes).unwrap();
    let tree = package.document_tree().unwrap();

    let rewritten = DocxPackage::from_bytes(&package.to_bytes_with_document(&tree).unwrap()).unwrap();

    let names: Vec<&str> = rewritten.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["[Content_Types].xml", DOCUMENT_PART, "word/styles.xml"]);
    assert_eq!(rewritten.part("word/styles.xml"), package.part("word/styles.xml"));
    assert_eq!(rewritten.part(DOCUMENT_PART), package.part(DOCUMENT_PART));
}
