// Resume tailoring: score the master resume against a job description, get
// bullet rewrites, apply them to a per-job copy and export it as PDF.
// All LLM calls go through llm_client via the ResumeAdvisor seam.

pub mod advisor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use advisor::{LlmAdvisor, ResumeAdvisor, ScoreReport};
pub use pipeline::{tailor_resume, TailorOutcome, TailorRequest};
