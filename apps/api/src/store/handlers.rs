use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Form;
use crate::state::AppState;
use crate::store::{JobRecord, JobStatus, JobSummary, NewJob, ReferralRecord};

#[derive(Deserialize)]
pub struct JobsQuery {
    /// Comma-separated statuses, e.g. `Applied,Referral Pending`.
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub job: NewJob,
    pub session_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct CreateJobResponse {
    pub job: JobRecord,
    /// New job-form counter for the session, if one was given.
    pub form_version: Option<u32>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<Vec<JobRecord>>, AppError> {
    let statuses = params
        .status
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<JobStatus>)
        .collect::<Result<Vec<_>, _>>()?;

    let records = state.records.lock().await;
    Ok(Json(records.jobs.filter(&statuses)))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, AppError> {
    let job = {
        let mut records = state.records.lock().await;
        records.jobs.add(req.job, Local::now().date_naive())?
    };
    let form_version = match req.session_id {
        Some(id) => state.sessions.bump_form(id, Form::Job).await,
        None => None,
    };
    Ok(Json(CreateJobResponse { job, form_version }))
}

/// GET /api/v1/jobs/summary
pub async fn handle_job_summary(State(state): State<AppState>) -> Json<JobSummary> {
    let records = state.records.lock().await;
    Json(records.jobs.summary(Local::now().date_naive()))
}

/// PATCH /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<JobRecord>, AppError> {
    let mut records = state.records.lock().await;
    let job = records.jobs.update_status(id, req.status)?;
    tracing::info!("Job #{id} moved to {}", job.status);
    Ok(Json(job))
}

/// GET /api/v1/jobs/:id/resume
/// Streams the tailored PDF attached to a job.
pub async fn handle_job_resume(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    let resume_path = {
        let records = state.records.lock().await;
        let job = records
            .jobs
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Job #{id} not found")))?;
        job.resume_path.clone()
    };
    if resume_path.is_empty() {
        return Err(AppError::NotFound(format!("Job #{id} has no tailored resume")));
    }

    let bytes = tokio::fs::read(&resume_path)
        .await
        .map_err(|_| AppError::NotFound(format!("Resume file {resume_path} is missing")))?;
    let file_name = std::path::Path::new(&resume_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("job_{id}.pdf"));

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}

#[derive(Deserialize)]
pub struct ReferralQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct IndexedReferral {
    pub index: usize,
    #[serde(flatten)]
    pub referral: ReferralRecord,
}

#[derive(Deserialize)]
pub struct CreateReferralRequest {
    #[serde(flatten)]
    pub referral: ReferralRecord,
    pub session_id: Option<Uuid>,
}

/// GET /api/v1/referrals
pub async fn handle_list_referrals(
    State(state): State<AppState>,
    Query(params): Query<ReferralQuery>,
) -> Json<Vec<IndexedReferral>> {
    let records = state.records.lock().await;
    let hits = records
        .referrals
        .search(params.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(|(index, referral)| IndexedReferral { index, referral })
        .collect();
    Json(hits)
}

/// POST /api/v1/referrals
pub async fn handle_create_referral(
    State(state): State<AppState>,
    Json(req): Json<CreateReferralRequest>,
) -> Result<Json<IndexedReferral>, AppError> {
    let index = {
        let mut records = state.records.lock().await;
        records.referrals.add(req.referral.clone())?
    };
    if let Some(id) = req.session_id {
        state.sessions.bump_form(id, Form::Referral).await;
    }
    Ok(Json(IndexedReferral {
        index,
        referral: req.referral,
    }))
}

/// PUT /api/v1/referrals/:index
pub async fn handle_update_referral(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(referral): Json<ReferralRecord>,
) -> Result<Json<IndexedReferral>, AppError> {
    let mut records = state.records.lock().await;
    records.referrals.update(index, referral.clone())?;
    Ok(Json(IndexedReferral { index, referral }))
}
