use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::adaptive::reviser::revise_roadmap;
use crate::assessment::{load_questions, record_answer, AnswerOutcome};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/tests/:user_id/:phase/:milestone_id/:subtopic_id
pub async fn get_test_handler(
    State(state): State<AppState>,
    Path((user_id, phase, milestone_id, subtopic_id)): Path<(i32, String, String, String)>,
) -> Result<Json<Value>, AppError> {
    let set = load_questions(&state.store, user_id, &phase, &milestone_id, &subtopic_id)?;
    Ok(Json(json!({ "user_id": user_id, "test": set })))
}

#[derive(Debug, Deserialize)]
pub struct SubmittedAnswer {
    pub question_number: u32,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    pub user_id: i32,
    pub phase: String,
    pub milestone_id: String,
    pub subtopic_id: String,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize)]
pub struct SubmitTestResponse {
    pub user_id: i32,
    pub subtopic_id: String,
    pub correct: usize,
    pub total: usize,
    pub results: Vec<AnswerOutcome>,
    /// Subtopics re-annotated by the revision pass, when it ran cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapted_subtopics: Option<Vec<String>>,
}

/// POST /api/v1/tests/submit
///
/// Records every answer, then triggers an adaptive revision of the roadmap.
/// Recording failures fail the request; a revision failure does not, because
/// the answers are already durable and the next submission retries it.
pub async fn submit_test_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitTestRequest>,
) -> Result<Json<SubmitTestResponse>, AppError> {
    if request.answers.is_empty() {
        return Err(AppError::Validation("No answers submitted".to_string()));
    }

    let mut results = Vec::with_capacity(request.answers.len());
    for answer in &request.answers {
        results.push(record_answer(
            &state.store,
            request.user_id,
            &request.phase,
            &request.milestone_id,
            &request.subtopic_id,
            answer.question_number,
            &answer.answer,
        )?);
    }
    let correct = results.iter().filter(|r| r.is_correct).count();

    let adapted_subtopics =
        match revise_roadmap(&state.store, state.llm.as_ref(), request.user_id).await {
            Ok(outcome) => Some(outcome.modified_subtopics),
            Err(e) => {
                warn!(
                    "Adaptive revision after submission failed for user {}: {e}",
                    request.user_id
                );
                None
            }
        };

    Ok(Json(SubmitTestResponse {
        user_id: request.user_id,
        subtopic_id: request.subtopic_id,
        correct,
        total: results.len(),
        results,
        adapted_subtopics,
    }))
}
