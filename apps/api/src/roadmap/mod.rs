// ─────────────────────────────────────────────
// Roadmap pipeline: profile → prompt → canonical document
// ─────────────────────────────────────────────

pub mod handlers;
pub mod prompts;
pub mod synthesizer;
