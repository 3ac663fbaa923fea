//! Job tracker backed by `jobs.csv`.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::{read_rows, write_rows};
use crate::errors::AppError;

pub const JOB_COLUMNS: [&str; 8] = [
    "id",
    "company",
    "title",
    "description",
    "status",
    "date_added",
    "resume_path",
    "url",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Applied,
    Referred,
    #[serde(rename = "Referral Pending")]
    ReferralPending,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Applied,
        JobStatus::Referred,
        JobStatus::ReferralPending,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Referred => "Referred",
            JobStatus::ReferralPending => "Referral Pending",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("Unknown job status: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: u32,
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date_added: Option<NaiveDate>,
    #[serde(default)]
    pub resume_path: String,
    #[serde(default)]
    pub url: String,
}

/// Blank or unparsable dates load as `None`. Timestamps keep their date part.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    });
    Ok(date)
}

/// Fields supplied when saving a new job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub company: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub url: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub applied_today: usize,
    pub referral_pending: usize,
    pub applied: usize,
    pub total: usize,
}

pub struct JobStore {
    path: PathBuf,
    jobs: Vec<JobRecord>,
}

impl JobStore {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let jobs: Vec<JobRecord> = read_rows(path)?;
        info!("Loaded {} jobs from {}", jobs.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            jobs,
        })
    }

    pub fn all(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn get(&self, id: u32) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Appends a job with the next id, status `Applied` and `today` as its date.
    pub fn add(&mut self, new: NewJob, today: NaiveDate) -> Result<JobRecord, AppError> {
        if new.company.trim().is_empty()
            || new.title.trim().is_empty()
            || new.description.trim().is_empty()
        {
            return Err(AppError::Validation(
                "company, title and description are all required".to_string(),
            ));
        }

        let id = self.jobs.iter().map(|job| job.id).max().unwrap_or(0) + 1;
        let record = JobRecord {
            id,
            company: new.company.trim().to_string(),
            title: new.title.trim().to_string(),
            description: new.description,
            status: JobStatus::Applied,
            date_added: Some(today),
            resume_path: String::new(),
            url: new.url.trim().to_string(),
        };
        let mut next = self.jobs.clone();
        next.push(record.clone());
        self.commit(next)?;
        info!("Job #{id} saved: {} @ {}", record.title, record.company);
        Ok(record)
    }

    pub fn update_status(&mut self, id: u32, status: JobStatus) -> Result<JobRecord, AppError> {
        self.update(id, |job| job.status = status)
    }

    pub fn set_resume_path(&mut self, id: u32, resume_path: &Path) -> Result<JobRecord, AppError> {
        let resume_path = resume_path.display().to_string();
        self.update(id, |job| job.resume_path = resume_path)
    }

    /// Jobs whose status is in `statuses`; an empty filter returns everything.
    pub fn filter(&self, statuses: &[JobStatus]) -> Vec<JobRecord> {
        let wanted: HashSet<_> = statuses.iter().collect();
        self.jobs
            .iter()
            .filter(|job| wanted.is_empty() || wanted.contains(&job.status))
            .cloned()
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> JobSummary {
        let count = |status: JobStatus| self.jobs.iter().filter(|j| j.status == status).count();
        JobSummary {
            applied_today: self
                .jobs
                .iter()
                .filter(|j| j.date_added == Some(today))
                .count(),
            referral_pending: count(JobStatus::ReferralPending),
            applied: count(JobStatus::Applied),
            total: self.jobs.len(),
        }
    }

    /// Applies `change` to a copy of job `id` and commits it.
    fn update(&mut self, id: u32, change: impl FnOnce(&mut JobRecord)) -> Result<JobRecord, AppError> {
        let index = self
            .jobs
            .iter()
            .position(|job| job.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Job #{id} not found")))?;
        let mut next = self.jobs.clone();
        change(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next)?;
        Ok(updated)
    }

    /// Writes `next` to disk and only then makes it the in-memory table.
    fn commit(&mut self, next: Vec<JobRecord>) -> Result<(), AppError> {
        write_rows(&self.path, &JOB_COLUMNS, &next)?;
        self.jobs = next;
        Ok(())
    }
}
