use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::llm_client::{LlmSettings, DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub data_dir: PathBuf,
    pub soffice_bin: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_key = require_env("LLM_API_KEY").or_else(|_| require_env("GROQ_API_KEY"))?;

        Ok(Config {
            llm: LlmSettings {
                api_url: env_or("LLM_API_URL", DEFAULT_API_URL),
                api_key,
                model: env_or("LLM_MODEL", DEFAULT_MODEL),
                temperature: 0.0,
            },
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            soffice_bin: env_or("SOFFICE_BIN", "soffice"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Flat-file layout under the data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub resume_dir: PathBuf,
    pub master_resume: PathBuf,
    pub jobs_csv: PathBuf,
    pub referrals_csv: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        let resume_dir = data_dir.join("resumes");
        Self {
            data_dir: data_dir.to_path_buf(),
            master_resume: resume_dir.join("master_resume.docx"),
            resume_dir,
            jobs_csv: data_dir.join("jobs.csv"),
            referrals_csv: data_dir.join("referrals.csv"),
        }
    }

    /// Creates the data and resume directories if they do not exist yet.
    pub fn bootstrap(&self) -> Result<()> {
        std::fs::create_dir_all(&self.resume_dir)
            .with_context(|| format!("Failed to create {}", self.resume_dir.display()))?;
        info!("Data directory ready at {}", self.data_dir.display());
        Ok(())
    }
}
