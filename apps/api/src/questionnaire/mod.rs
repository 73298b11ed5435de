// ─────────────────────────────────────────────
// Questionnaire pipeline: prompt → MCQ sets → nested bank
// ─────────────────────────────────────────────

pub mod prompts;
pub mod reorganize;
pub mod synthesizer;
