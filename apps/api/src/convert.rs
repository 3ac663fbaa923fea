//! Fixed-layout (PDF) export of an editable .docx.
//!
//! `PdfConverter` is the seam; `LibreOfficeConverter` shells out to a headless
//! LibreOffice. `AppState` holds an `Arc<dyn PdfConverter>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Editable document not found: {0}")]
    SourceMissing(String),

    #[error("Converter unavailable: {0}")]
    Unavailable(String),

    #[error("Converter exited with status {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error during conversion: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Converts `editable` to PDF at `destination` and returns the destination path.
    async fn convert(
        &self,
        editable: &Path,
        destination: &Path,
    ) -> Result<PathBuf, ConversionError>;
}

/// Converts with `soffice --headless --convert-to pdf`.
pub struct LibreOfficeConverter {
    binary: String,
}

impl LibreOfficeConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PdfConverter for LibreOfficeConverter {
    async fn convert(
        &self,
        editable: &Path,
        destination: &Path,
    ) -> Result<PathBuf, ConversionError> {
        if !editable.exists() {
            return Err(ConversionError::SourceMissing(editable.display().to_string()));
        }

        // soffice names its output after the input stem, so convert into a
        // scratch directory and move the result into place.
        let out_dir = tempfile::tempdir()?;
        debug!("Running {} on {}", self.binary, editable.display());

        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir.path())
            .arg(editable)
            .output()
            .await
            .map_err(|e| ConversionError::Unavailable(format!("{}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stem = editable
            .file_stem()
            .ok_or_else(|| ConversionError::SourceMissing(editable.display().to_string()))?;
        let produced = out_dir
            .path()
            .join(format!("{}.pdf", stem.to_string_lossy()));
        if !produced.exists() {
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr: format!("no PDF produced for {}", editable.display()),
            });
        }

        move_file(&produced, destination).await?;
        info!("Exported {}", destination.display());
        Ok(destination.to_path_buf())
    }
}

/// Rename, falling back to copy + remove across filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<(), ConversionError> {
    if tokio::fs::rename(from, to).await.is_err() {
        tokio::fs::copy(from, to).await?;
        tokio::fs::remove_file(from).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_editable_is_reported_before_running() {
        let converter = LibreOfficeConverter::new("soffice");
        let err = converter
            .convert(Path::new("/nope/resume.docx"), Path::new("/tmp/out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::SourceMissing(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let editable = dir.path().join("resume.docx");
        std::fs::write(&editable, b"docx").unwrap();

        let converter = LibreOfficeConverter::new("definitely-not-a-real-soffice-binary");
        let err = converter
            .convert(&editable, &dir.path().join("resume.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_move_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        std::fs::write(&from, b"new").unwrap();
        std::fs::write(&to, b"old").unwrap();

        move_file(&from, &to).await.unwrap();
        assert_eq!(std::fs::read(&to).unwrap(), b"new");
        assert!(!from.exists());
    }
}
