//! Completion service client — the single point of entry for all generative
//! model calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the model API directly.
//! Callers depend on the [`CompletionService`] trait and receive raw text;
//! all JSON extraction lives in [`extract`] so it can be unit-tested against
//! canned fixtures with no network dependency.
//!
//! The client makes exactly one attempt per call. Retry policy belongs to
//! the caller; only the Questionnaire Synthesizer retries, and only on
//! errors classified transient by [`CompletionError::is_transient`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod extract;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls. Hardcoded to prevent drift.
pub const MODEL: &str = "gemini-2.5-flash-lite";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion returned empty content")]
    EmptyContent,
}

impl CompletionError {
    /// Heuristic transiency check: service-overload markers in the error
    /// signature ("503"/"UNAVAILABLE"), rate limiting, or connection-level
    /// failures. Everything else is terminal for the current unit of work.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Api { status, message } => {
                *status == 503
                    || *status == 429
                    || message.contains("503")
                    || message.contains("UNAVAILABLE")
            }
            CompletionError::Http(e) => e.is_timeout() || e.is_connect(),
            CompletionError::EmptyContent => false,
        }
    }
}

/// Boundary trait for the external generative text service:
/// prompt in, raw text out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

// ── Gemini wire types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini-backed completion client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!("{GEMINI_API_URL}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .filter(|t| !t.is_empty())
            .ok_or(CompletionError::EmptyContent)?;

        debug!("Completion call succeeded: {} chars", text.len());
        Ok(text)
    }
}

// ── Test double ─────────────────────────────────────────────────────────
