/*!
 * DOCX container.
 *
 * A `.docx` file is a zip archive; the translatable content lives in the
 * `word/document.xml` part. The package keeps every entry in memory so the
 * archive can be written back with only that part replaced.
 */

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::model::DocumentTree;
use crate::document::xml::{parse_document, write_document};
use crate::errors::DocumentError;

/// Name of the main document part inside the archive.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// An in-memory DOCX archive.
pub struct DocxPackage {
    /// Archive entries in their original order
    pub entries: Vec<DocxEntry>,
}

/// One archive entry.
pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub last_modified: zip::DateTime,
    pub unix_mode: Option<u32>,
    pub is_dir: bool,
}

impl DocxPackage {
    /// Read a package from a file on disk.
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path)
            .map_err(|e| DocumentError::Archive(format!("open {}: {}", path.display(), e)))?;
        Self::from_bytes(&bytes)
    }

    /// Read a package from raw archive bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_reader(Cursor::new(bytes))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocumentError> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| DocumentError::Archive(format!("read entry {}: {}", file.name(), e)))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                last_modified: file.last_modified().unwrap_or_default(),
                unix_mode: file.unix_mode(),
                is_dir: file.is_dir(),
            });
        }
        debug!("Read DOCX package with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Raw bytes of a named part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    /// Parse the main document part into a tree.
    pub fn document_tree(&self) -> Result<DocumentTree, DocumentError> {
        let xml = self
            .part(DOCUMENT_PART)
            .ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;
        parse_document(xml)
    }

    /// Serialize the archive with the main document part replaced by `tree`.
    pub fn to_bytes_with_document(&self, tree: &DocumentTree) -> Result<Vec<u8>, DocumentError> {
        let replacement = write_document(tree)?;
        let mut out = Cursor::new(Vec::new());
        self.write_entries(&mut out, &replacement)?;
        Ok(out.into_inner())
    }

    /// Write the archive to `path` with the main document part replaced by `tree`.
    pub fn write(&self, path: &Path, tree: &DocumentTree) -> Result<(), DocumentError> {
        let bytes = self.to_bytes_with_document(tree)?;
        std::fs::write(path, bytes)
            .map_err(|e| DocumentError::Archive(format!("write {}: {}", path.display(), e)))
    }

    fn write_entries<W: Write + Seek>(&self, sink: W, replacement: &[u8]) -> Result<(), DocumentError> {
        if self.part(DOCUMENT_PART).is_none() {
            return Err(DocumentError::MissingPart(DOCUMENT_PART.to_string()));
        }

        let mut zout = ZipWriter::new(sink);
        for entry in &self.entries {
            let data = if entry.name == DOCUMENT_PART {
                replacement
            } else {
                entry.data.as_slice()
            };
            let mut opts = SimpleFileOptions::default()
                .compression_method(entry.compression)
                .last_modified_time(entry.last_modified);
            if let Some(mode) = entry.unix_mode {
                opts = opts.unix_permissions(mode);
            }
            if entry.is_dir || entry.name.ends_with('/') {
                zout.add_directory(entry.name.as_str(), opts)?;
            } else {
                zout.start_file(entry.name.as_str(), opts)?;
                zout.write_all(data)
                    .map_err(|e| DocumentError::Archive(format!("write entry {}: {}", entry.name, e)))?;
            }
        }
        zout.finish()?;
        Ok(())
    }
}
