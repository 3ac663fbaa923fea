//! Resume Advisor: the pluggable seam for scoring a resume and suggesting
//! bullet rewrites against a job description.
//!
//! `LlmAdvisor` is the production backend. `AppState` holds an
//! `Arc<dyn ResumeAdvisor>` so the pipeline can be exercised without a network.

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::docx::RewritePair;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{parse_json_reply, LlmClient};
use crate::tailoring::prompts::{render, RESUME_SCORE_PROMPT, RESUME_TAILOR_PROMPT};

/// Match score of the master resume against a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8, // 0 – 100
    #[serde(rename = "scoreRationale", alias = "rationale")]
    pub rationale: String,
    #[serde(rename = "keywordGaps", default)]
    pub keyword_gaps: Vec<String>,
    #[serde(rename = "visaSponsorship", default)]
    pub visa_sponsorship: bool,
}

/// Accepts integers, floats (rounded) and numeric strings; rejects anything
/// outside 0–100.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| de::Error::custom(format!("score must be a number, got {value}")))?
    .round();

    if !(0.0..=100.0).contains(&score) {
        return Err(de::Error::custom(format!("score {score} is outside 0-100")));
    }
    Ok(score as u8)
}

#[async_trait]
pub trait ResumeAdvisor: Send + Sync {
    async fn score(&self, resume_text: &str, jd_text: &str) -> Result<ScoreReport, AppError>;

    async fn suggest_rewrites(
        &self,
        resume_text: &str,
        jd_text: &str,
    ) -> Result<Vec<RewritePair>, AppError>;
}

/// Hosted-LLM advisor using the scoring and tailoring prompt templates.
pub struct LlmAdvisor(pub LlmClient);

#[async_trait]
impl ResumeAdvisor for LlmAdvisor {
    async fn score(&self, resume_text: &str, jd_text: &str) -> Result<ScoreReport, AppError> {
        let prompt = render(RESUME_SCORE_PROMPT, resume_text, jd_text);
        let reply = self
            .0
            .call(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Resume scoring failed: {e}")))?;
        let report = parse_score(&reply)?;
        info!("Resume scored {}/100", report.score);
        Ok(report)
    }

    async fn suggest_rewrites(
        &self,
        resume_text: &str,
        jd_text: &str,
    ) -> Result<Vec<RewritePair>, AppError> {
        let prompt = render(RESUME_TAILOR_PROMPT, resume_text, jd_text);
        let reply = self
            .0
            .call(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Rewrite suggestion failed: {e}")))?;
        let rewrites = parse_rewrites(&reply)?;
        info!("LLM suggested {} bullet rewrites", rewrites.len());
        Ok(rewrites)
    }
}

pub fn parse_score(reply: &str) -> Result<ScoreReport, AppError> {
    parse_json_reply(reply).map_err(|e| AppError::Llm(format!("Malformed score response: {e}")))
}

pub fn parse_rewrites(reply: &str) -> Result<Vec<RewritePair>, AppError> {
    parse_json_reply(reply).map_err(|e| AppError::Llm(format!("Malformed rewrite response: {e}")))
}
