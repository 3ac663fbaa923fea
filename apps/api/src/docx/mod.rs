// Bullet Rewrite Engine.
// Loads a .docx package, exposes body paragraphs as runs, rewrites matched
// bullets in place and writes the package back out. All work here is
// synchronous and CPU/disk bound; async callers wrap it in spawn_blocking.

pub mod model;
pub mod package;
pub mod rewrite;

use thiserror::Error;

pub use model::{Document, Paragraph, RgbColor, Run, ACCENT_COLOR};
pub use rewrite::{
    apply_rewrites, replace_in_paragraph, rewrite_file, EntryOutcome, ReplaceKind, RewritePair,
    RewriteReport,
};

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Source document not found: {0}")]
    NotFound(String),

    #[error("Invalid .docx package: {0}")]
    InvalidPackage(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
