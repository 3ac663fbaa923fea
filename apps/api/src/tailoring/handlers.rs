use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::{tailor_resume, TailorOutcome, TailorRequest};

#[derive(Deserialize)]
pub struct TailorBody {
    #[serde(flatten)]
    pub request: TailorRequest,
    /// Cache the outcome as this session's last result.
    pub session_id: Option<Uuid>,
}

/// POST /api/v1/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(body): Json<TailorBody>,
) -> Result<Json<TailorOutcome>, AppError> {
    if let Some(id) = body.session_id {
        if state.sessions.get(id).await.is_none() {
            return Err(AppError::NotFound(format!("Session {id} not found")));
        }
    }

    let request = body.request;
    let outcome = tailor_resume(
        &state.paths,
        state.advisor.as_ref(),
        state.converter.as_ref(),
        &request,
    )
    .await?;

    {
        let mut records = state.records.lock().await;
        if records.jobs.get(request.job_id).is_some() {
            records
                .jobs
                .set_resume_path(request.job_id, &outcome.output_path)?;
            info!("Job #{} now points at {}", request.job_id, outcome.output_path.display());
        }
    }

    if let Some(id) = body.session_id {
        if !state.sessions.store_result(id, outcome.clone()).await {
            warn!("Session {id} ended before its tailoring result was stored");
        }
    }

    Ok(Json(outcome))
}
