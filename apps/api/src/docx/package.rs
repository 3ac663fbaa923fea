//! Zip-level I/O for .docx packages.
//!
//! The package is held as an ordered list of `(entry_name, bytes)` so that a
//! load/save round trip reproduces every part we do not touch.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::DocxError;

/// Main document part inside a WordprocessingML package.
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Reads every entry of the zip at `path`, preserving entry order.
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        if !path.exists() {
            return Err(DocxError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(DocxError::InvalidPackage(format!("missing {DOCUMENT_PART}")));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Replaces the bytes of an existing part, or appends a new one.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|(entry, _)| entry == name) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((name.to_string(), data)),
        }
    }

    /// Writes the package to `path`, overwriting whatever is there.
    /// Media parts are STORED, everything else DEFLATED, as Word lays them out.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let file = File::create(path)?;
        self.write_to(file)?;
        Ok(())
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, DocxError> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let options = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?)
    }
}
