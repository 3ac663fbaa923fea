//! Referral database backed by `referrals.csv`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{read_rows, write_rows};
use crate::errors::AppError;

pub const REFERRAL_COLUMNS: [&str; 4] = ["company", "referral_name", "contact at", "notes"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferralRecord {
    pub company: String,
    pub referral_name: String,
    #[serde(rename = "contact at", alias = "contact_at", default)]
    pub contact_at: String,
    #[serde(default)]
    pub notes: String,
}

impl ReferralRecord {
    fn validate(&self) -> Result<(), AppError> {
        if self.company.trim().is_empty() || self.referral_name.trim().is_empty() {
            return Err(AppError::Validation(
                "company and referral_name are required".to_string(),
            ));
        }
        Ok(())
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.company, &self.referral_name, &self.contact_at, &self.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

pub struct ReferralStore {
    path: PathBuf,
    referrals: Vec<ReferralRecord>,
}

impl ReferralStore {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let referrals: Vec<ReferralRecord> = read_rows(path)?;
        info!("Loaded {} referrals from {}", referrals.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            referrals,
        })
    }

    pub fn all(&self) -> &[ReferralRecord] {
        &self.referrals
    }

    pub fn add(&mut self, record: ReferralRecord) -> Result<usize, AppError> {
        record.validate()?;
        info!("Referral added: {} @ {}", record.referral_name, record.company);
        let mut next = self.referrals.clone();
        next.push(record);
        self.commit(next)?;
        Ok(self.referrals.len() - 1)
    }

    /// Case-insensitive substring match on any field, paired with each row's index.
    /// A blank query returns every row.
    pub fn search(&self, query: &str) -> Vec<(usize, ReferralRecord)> {
        let needle = query.trim().to_lowercase();
        self.referrals
            .iter()
            .enumerate()
            .filter(|(_, r)| needle.is_empty() || r.matches(&needle))
            .map(|(i, r)| (i, r.clone()))
            .collect()
    }

    pub fn update(&mut self, index: usize, record: ReferralRecord) -> Result<(), AppError> {
        record.validate()?;
        if index >= self.referrals.len() {
            return Err(AppError::NotFound(format!("Referral {index} not found")));
        }
        let mut next = self.referrals.clone();
        next[index] = record;
        self.commit(next)
    }

    /// Writes `next` to disk and only then makes it the in-memory table.
    fn commit(&mut self, next: Vec<ReferralRecord>) -> Result<(), AppError> {
        write_rows(&self.path, &REFERRAL_COLUMNS, &next)?;
        self.referrals = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn referral(company: &str, name: &str, notes: &str) -> ReferralRecord {
        ReferralRecord {
            company: company.into(),
            referral_name: name.into(),
            contact_at: "linkedin".into(),
            notes: notes.into(),
        }
    }

    #[test]
    fn test_add_and_reload_uses_contact_at_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.csv");
        let mut store = ReferralStore::load(&path).unwrap();
        assert_eq!(store.add(referral("Acme", "Sam", "")).unwrap(), 0);

        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("company,referral_name,contact at,notes\n"));
        assert_eq!(ReferralStore::load(&path).unwrap().all(), store.all());
    }

    #[test]
    fn test_add_requires_company_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReferralStore::load(&dir.path().join("referrals.csv")).unwrap();
        let err = store.add(referral("Acme", "  ", "")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_search_is_case_insensitive_on_any_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReferralStore::load(&dir.path().join("referrals.csv")).unwrap();
        store.add(referral("Acme", "Sam", "Met at RustConf")).unwrap();
        store.add(referral("Globex", "Alex", "")).unwrap();

        let hits = store.search("rustconf");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
        assert_eq!(store.search("GLOBEX")[0].1.referral_name, "Alex");
        assert_eq!(store.search("").len(), 2);
        assert!(store.search("initech").is_empty());
    }

    #[test]
    fn test_failed_save_leaves_table_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let mut store = ReferralStore::load(&data_dir.join("referrals.csv")).unwrap();
        store.add(referral("Acme", "Sam", "")).unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, b"").unwrap();

        assert!(store.add(referral("Globex", "Alex", "")).is_err());
        assert!(store.update(0, referral("Acme", "Sam", "Intro sent")).is_err());
        assert_eq!(store.all(), &[referral("Acme", "Sam", "")][..]);
        assert_eq!(store.search("").len(), 1);
    }

    #[test]
    fn test_update_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.csv");
        let mut store = ReferralStore::load(&path).unwrap();
        store.add(referral("Acme", "Sam", "")).unwrap();
        store.update(0, referral("Acme", "Sam", "Intro sent")).unwrap();
        assert_eq!(ReferralStore::load(&path).unwrap().all()[0].notes, "Intro sent");

        let err = store.update(5, referral("Acme", "Sam", "")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
