pub mod health;
pub mod master;
pub mod sessions;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;
use crate::store::handlers as store;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Master resume
        .route(
            "/api/v1/master-resume",
            get(master::handle_get_master).put(master::handle_upload_master),
        )
        // Tailoring
        .route("/api/v1/tailor", post(tailoring::handle_tailor))
        // Job tracker
        .route(
            "/api/v1/jobs",
            get(store::handle_list_jobs).post(store::handle_create_job),
        )
        .route("/api/v1/jobs/summary", get(store::handle_job_summary))
        .route("/api/v1/jobs/:id", patch(store::handle_update_job))
        .route("/api/v1/jobs/:id/resume", get(store::handle_job_resume))
        // Referral database
        .route(
            "/api/v1/referrals",
            get(store::handle_list_referrals).post(store::handle_create_referral),
        )
        .route("/api/v1/referrals/:index", put(store::handle_update_referral))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_end_session),
        )
        .with_state(state)
}
