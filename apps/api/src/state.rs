use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::DataPaths;
use crate::convert::PdfConverter;
use crate::session::SessionStore;
use crate::store::Records;
use crate::tailoring::ResumeAdvisor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub paths: DataPaths,
    /// Pluggable advisor. Default: LlmAdvisor over the hosted chat API.
    pub advisor: Arc<dyn ResumeAdvisor>,
    pub converter: Arc<dyn PdfConverter>,
    /// Job and referral tables; every mutation rewrites its CSV file.
    pub records: Arc<Mutex<Records>>,
    pub sessions: SessionStore,
}
