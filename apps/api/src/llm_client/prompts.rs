// Shared prompt fragments. Each module that calls the LLM keeps its own
// prompts.rs alongside it and reuses these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are an expert resume coach. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to any prompt that rewrites resume content.
pub const TRUTHFULNESS_INSTRUCTION: &str = "\
    Keep rewrites truthful to the original: enhance language, never fabricate experience, \
    employers, metrics or technologies that are not already in the resume.";
