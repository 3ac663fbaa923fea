//! Tailoring pipeline: orchestrates one tailoring request end to end.
//!
//! Flow: master exists? → extract text → score → suggest rewrites →
//!       copy master to a per-job .docx → apply rewrites to the copy →
//!       export PDF → delete the .docx copy → return.
//!
//! The master resume is only ever read. Any failure removes the per-job
//! .docx copy so no half-applied result is left behind.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DataPaths;
use crate::convert::PdfConverter;
use crate::docx::{rewrite_file, RewritePair, RewriteReport};
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::tailoring::advisor::{ResumeAdvisor, ScoreReport};

#[derive(Debug, Clone, Deserialize)]
pub struct TailorRequest {
    pub job_description: String,
    pub job_id: u32,
    pub company: String,
    pub title: String,
}

impl TailorRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.job_description.trim().is_empty()
            || self.company.trim().is_empty()
            || self.title.trim().is_empty()
        {
            return Err(AppError::Validation(
                "job_description, company and title are all required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TailorOutcome {
    pub score: ScoreReport,
    pub rewrites: Vec<RewritePair>,
    pub report: RewriteReport,
    pub output_path: PathBuf,
}

/// File stem for a job's tailored resume, e.g. `12_Acme_Corp_Data_Scientist`.
pub fn tailored_stem(job_id: u32, company: &str, title: &str) -> String {
    let clean = |s: &str| {
        s.trim()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    };
    format!("{job_id}_{}_{}", clean(company), clean(title))
}

pub async fn tailor_resume(
    paths: &DataPaths,
    advisor: &dyn ResumeAdvisor,
    converter: &dyn PdfConverter,
    request: &TailorRequest,
) -> Result<TailorOutcome, AppError> {
    request.validate()?;

    let master = &paths.master_resume;
    if !master.exists() {
        return Err(AppError::NotFound(format!(
            "No master resume uploaded yet ({})",
            master.display()
        )));
    }

    // Step 1: prompt inputs
    let resume_text = extract_text(master).await?;

    // Step 2: score + rewrite suggestions
    info!(
        "Tailoring resume for job #{} ({} @ {})",
        request.job_id, request.title, request.company
    );
    let score = advisor.score(&resume_text, &request.job_description).await?;
    let rewrites = advisor
        .suggest_rewrites(&resume_text, &request.job_description)
        .await?;

    // Step 3: copy-then-mutate
    let stem = tailored_stem(request.job_id, &request.company, &request.title);
    let editable = paths.resume_dir.join(format!("{stem}.docx"));
    let output_pdf = paths.resume_dir.join(format!("{stem}.pdf"));

    tokio::fs::copy(master, &editable).await?;
    let report = match apply_to_copy(&editable, rewrites.clone()).await {
        Ok(report) => report,
        Err(e) => {
            discard(&editable).await;
            return Err(e);
        }
    };

    // Step 4: fixed-layout export, then drop the editable copy either way
    let converted = converter.convert(&editable, &output_pdf).await;
    discard(&editable).await;
    let output_path = converted?;

    info!(
        "Tailored resume written to {} ({} applied, {} skipped)",
        output_path.display(),
        report.applied_count(),
        report.skipped_count()
    );

    Ok(TailorOutcome {
        score,
        rewrites,
        report,
        output_path,
    })
}

async fn apply_to_copy(editable: &Path, rewrites: Vec<RewritePair>) -> Result<RewriteReport, AppError> {
    let editable = editable.to_path_buf();
    let report =
        tokio::task::spawn_blocking(move || rewrite_file(&editable, &editable, &rewrites)).await??;
    Ok(report)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove {}: {e}", path.display());
    }
}
