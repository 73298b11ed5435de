// ─────────────────────────────────────────────
// Adaptive revision: score analysis → roadmap annotations
// ─────────────────────────────────────────────

pub mod prompts;
pub mod reviser;
