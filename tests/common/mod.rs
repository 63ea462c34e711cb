/*!
 * Common test utilities for the docutrans test suite
 */

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docutrans::DocxPackage;
use docutrans::document::{DocumentTree, NodePath};
use docutrans::translation::fragments::{index_document, leaf_texts};

pub const WORD_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

/// Route crate logs through the test harness; repeated calls are no-ops
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Escape text for use inside a `w:t` element
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Build `word/document.xml` with one paragraph per slice and one bold-alternating run per text
pub fn document_xml(paragraphs: &[&[&str]]) -> String {
    let mut body = String::new();
    for runs in paragraphs {
        body.push_str("<w:p><w:pPr><w:jc w:val=\"left\"/></w:pPr>");
        for (i, text) in runs.iter().enumerate() {
            body.push_str("<w:r>");
            if i % 2 == 1 {
                body.push_str("<w:rPr><w:b/></w:rPr>");
            }
            if text.starts_with(' ') || text.ends_with(' ') {
                body.push_str(&format!("<w:t xml:space=\"preserve\">{}</w:t>", escape(text)));
            } else {
                body.push_str(&format!("<w:t>{}</w:t>", escape(text)));
            }
            body.push_str("</w:r>");
        }
        body.push_str("</w:p>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\"><w:body>{}<w:sectPr/></w:body></w:document>",
        WORD_NAMESPACE, body
    )
}

/// Build a minimal `.docx` archive around a document part
pub fn build_docx(document_xml: &str) -> Vec<u8> {
    let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("word/document.xml", document_xml),
        ("word/styles.xml", STYLES),
    ] {
        zout.start_file(name, deflated).unwrap();
        zout.write_all(body.as_bytes()).unwrap();
    }
    zout.finish().unwrap().into_inner()
}

/// Write a `.docx` with the given paragraphs into `dir`
pub fn create_test_docx(dir: &Path, filename: &str, paragraphs: &[&[&str]]) -> Result<PathBuf> {
    let path = dir.join(filename);
    std::fs::write(&path, build_docx(&document_xml(paragraphs)))?;
    Ok(path)
}

/// Leaf texts of every paragraph of a tree
pub fn paragraph_texts(tree: &DocumentTree) -> Vec<Vec<String>> {
    index_document(tree, false)
        .iter()
        .map(|unit| unit.fragments.iter().map(|f| f.original_text.clone()).collect())
        .collect()
}

/// Leaf texts of every paragraph of a `.docx` file
pub fn read_paragraph_texts(path: &Path) -> Result<Vec<Vec<String>>> {
    let package = DocxPackage::read(path)?;
    Ok(paragraph_texts(&package.document_tree()?))
}

/// Leaf texts of the element at `indices`
pub fn texts_at(tree: &DocumentTree, indices: &[usize]) -> Vec<String> {
    leaf_texts(tree.element(&NodePath::from(indices.to_vec())).unwrap())
}
