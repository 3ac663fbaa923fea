//! Per-client session state: the last tailoring result and the counters used to
//! reset the job and referral entry forms after a save.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::tailoring::TailorOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Job,
    Referral,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_result: Option<TailorOutcome>,
    pub job_form_version: u32,
    pub referral_form_version: u32,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_result: None,
            job_form_version: 0,
            referral_form_version: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.inner.write().await.insert(id, session);
        tracing::debug!("Session {id} started");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Returns false if the session did not exist.
    pub async fn end(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Returns false if the session did not exist.
    pub async fn store_result(&self, id: Uuid, outcome: TailorOutcome) -> bool {
        match self.inner.write().await.get_mut(&id) {
            Some(session) => {
                session.last_result = Some(outcome);
                true
            }
            None => false,
        }
    }

    /// Increments a form's counter and returns the new value.
    pub async fn bump_form(&self, id: Uuid, form: Form) -> Option<u32> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id)?;
        let counter = match form {
            Form::Job => &mut session.job_form_version,
            Form::Referral => &mut session.referral_form_version,
        };
        *counter += 1;
        Some(*counter)
    }
}
