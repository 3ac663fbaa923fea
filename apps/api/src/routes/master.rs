use std::io::{Cursor, Write};

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::config::DataPaths;
use crate::docx::package::DocxPackage;
use crate::docx::Document;
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MasterResumeStatus {
    pub exists: bool,
    /// Extracted plain text, present when the master resume exists.
    pub text: Option<String>,
}

/// GET /api/v1/master-resume
pub async fn handle_get_master(
    State(state): State<AppState>,
) -> Result<Json<MasterResumeStatus>, AppError> {
    let master = &state.paths.master_resume;
    if !master.exists() {
        return Ok(Json(MasterResumeStatus {
            exists: false,
            text: None,
        }));
    }
    let text = extract_text(master).await?;
    Ok(Json(MasterResumeStatus {
        exists: true,
        text: Some(text),
    }))
}

/// PUT /api/v1/master-resume
/// Multipart upload; the `file` field must be a .docx.
pub async fn handle_upload_master(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MasterResumeStatus>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("master_resume.docx").to_string();
        if !file_name.to_lowercase().ends_with(".docx") {
            return Err(AppError::Validation(
                "Only .docx files can be used as the master resume".to_string(),
            ));
        }

        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
        let size = data.len();
        let paths = state.paths.clone();
        let text = tokio::task::spawn_blocking(move || replace_master(&paths, &file_name, &data))
            .await??;
        info!("Master resume replaced ({size} bytes)");

        return Ok(Json(MasterResumeStatus {
            exists: true,
            text: Some(text),
        }));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// Parses the upload fully, then swaps it in over the master with a rename.
/// A rejected upload leaves the current master untouched.
fn replace_master(paths: &DataPaths, file_name: &str, data: &[u8]) -> Result<String, AppError> {
    let text = DocxPackage::from_reader(Cursor::new(data))
        .and_then(Document::from_package)
        .and_then(|document| document.plain_text())
        .map_err(|e| AppError::Validation(format!("{file_name} is not a valid .docx document: {e}")))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&paths.resume_dir)?;
    tmp.write_all(data)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&paths.master_resume)
        .map_err(|e| AppError::from(e.error))?;
    Ok(text)
}
