// Flat-file records: the job tracker (jobs.csv) and the referral database
// (referrals.csv). Both load fully into memory and are written back whole.

pub mod handlers;
pub mod jobs;
pub mod referrals;

use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::config::DataPaths;
use crate::errors::AppError;

pub use jobs::{JobRecord, JobStatus, JobStore, JobSummary, NewJob};
pub use referrals::{ReferralRecord, ReferralStore};

/// Both record stores, guarded together in `AppState`.
pub struct Records {
    pub jobs: JobStore,
    pub referrals: ReferralStore,
}

impl Records {
    pub fn load(paths: &DataPaths) -> Result<Self, AppError> {
        Ok(Self {
            jobs: JobStore::load(&paths.jobs_csv)?,
            referrals: ReferralStore::load(&paths.referrals_csv)?,
        })
    }
}

/// Reads every row of a headed CSV file. A missing file is an empty table.
pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Writes `headers` then `rows` to a sibling temp file and renames it over `path`.
pub(crate) fn write_rows<T: Serialize>(
    path: &Path,
    headers: &[&str],
    rows: &[T],
) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.persist(path).map_err(|e| AppError::from(e.error))?;
    Ok(())
}
