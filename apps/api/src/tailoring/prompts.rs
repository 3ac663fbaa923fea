// LLM prompt templates for resume tailoring.
// Both templates take {resume_context} and {jd_context}.

/// Scoring prompt. Expects a single JSON object back.
pub const RESUME_SCORE_PROMPT: &str = r#"Analyze the resume against the job description and return ONLY valid JSON with this exact structure:
{
  "score": <integer 0-100>,
  "scoreRationale": "<1-2 sentence explanation>",
  "keywordGaps": ["keyword1", "keyword2"],
  "visaSponsorship": <true if the job description offers or allows visa sponsorship, otherwise false>
}

keywordGaps lists important keywords present in the job description but missing from the resume.

Resume context:
{resume_context}

Job Description context:
{jd_context}"#;

/// Rewrite prompt. Expects a JSON array of {original, rewritten} objects back.
/// Replace {truthfulness_instruction} as well.
pub const RESUME_TAILOR_PROMPT: &str = r#"Analyze the resume against the job description and return ONLY a JSON array of objects with this exact structure:
[
  {
    "original": "<bullet point copied EXACTLY, character for character, from the resume>",
    "rewritten": "<the improved bullet point tailored to the job description>"
  }
]

Include 3-6 of the most impactful bullet rewrites.
{truthfulness_instruction}
The "original" text must match a whole bullet from the resume verbatim, or it cannot be applied.

Resume context:
{resume_context}

Job Description context:
{jd_context}"#;

/// Fills a tailoring template with the resume and job description text.
/// Placeholders are only recognised in the template itself, never inside
/// the inserted text.
pub fn render(template: &str, resume_text: &str, jd_text: &str) -> String {
    let fills = [
        (
            "{truthfulness_instruction}",
            crate::llm_client::prompts::TRUTHFULNESS_INSTRUCTION,
        ),
        ("{resume_context}", resume_text),
        ("{jd_context}", jd_text),
    ];

    let mut out = String::with_capacity(template.len() + resume_text.len() + jd_text.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match fills.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
