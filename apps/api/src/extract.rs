//! Plain-text extraction for resumes and job descriptions, used to build prompts.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::docx::Document;
use crate::errors::AppError;

/// Extracts plain text from a `.docx`, `.pdf`, `.txt` or `.md` file.
pub async fn extract_text(path: &Path) -> Result<String, AppError> {
    if !path.exists() {
        return Err(AppError::NotFound(path.display().to_string()));
    }

    let path: PathBuf = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extract_blocking(&path)).await??;
    debug!("Extracted {} characters of text", text.len());
    Ok(text)
}

fn extract_blocking(path: &Path) -> Result<String, AppError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "docx" => Ok(Document::open(path)?.plain_text()?),
        "pdf" => pdf_extract::extract_text(path)
            .map_err(|e| AppError::Document(format!("PDF extraction failed: {e}"))),
        "txt" | "md" => Ok(std::fs::read_to_string(path)?),
        other => Err(AppError::Validation(format!(
            "Unsupported file extension: .{other}. Supported: docx, pdf, txt, md"
        ))),
    }
}
