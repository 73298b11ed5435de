use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::questionnaire::synthesizer::synthesize_question_banks;
use crate::roadmap::synthesizer::synthesize_roadmap;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRoadmapRequest {
    pub user_id: i32,
}

/// POST /api/v1/roadmap/generate
///
/// Fire-and-poll: validates the profile up front, enqueues a background job,
/// and returns 202 immediately. Clients follow up on the status endpoint.
/// A user with a finished roadmap gets `completed` back without a new job;
/// regeneration is not supported through this endpoint.
pub async fn generate_roadmap_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRoadmapRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = request.user_id;

    if state.store.roadmap_exists(user_id) {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "user_id": user_id,
                "status": "completed",
                "message": "Roadmap already generated"
            })),
        ));
    }

    // Missing profiles fail here with a 404 instead of inside the job.
    let profile = state.profiles.lookup(user_id).await?;

    let Some(job_id) = state.jobs.try_enqueue(user_id) else {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "user_id": user_id,
                "status": "in_progress",
                "message": "Roadmap generation already running"
            })),
        ));
    };

    let jobs = state.jobs.clone();
    let store = state.store.clone();
    let llm = state.llm.clone();
    tokio::spawn(async move {
        jobs.mark_running(user_id);
        let result = async {
            let roadmap = synthesize_roadmap(&store, llm.as_ref(), &profile).await?;
            synthesize_question_banks(&store, llm.as_ref(), user_id, &roadmap).await
        }
        .await;

        match result {
            Ok(report) => {
                jobs.mark_completed(user_id);
                info!(
                    "Roadmap pipeline finished for user {user_id}: {} generated, {} pending",
                    report.generated, report.pending
                );
            }
            Err(e) => {
                error!("Roadmap pipeline failed for user {user_id}: {e}");
                jobs.mark_failed(user_id, e.to_string());
            }
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "user_id": user_id,
            "job_id": job_id,
            "status": "queued"
        })),
    ))
}

/// GET /api/v1/roadmap/:user_id/status
pub async fn roadmap_status_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    if let Some(record) = state.jobs.status(user_id) {
        return Ok(Json(json!({ "user_id": user_id, "job": record })));
    }
    // A roadmap on disk with no live job means generation finished in an
    // earlier process lifetime.
    if state.store.roadmap_exists(user_id) {
        return Ok(Json(json!({ "user_id": user_id, "job": { "state": "completed" } })));
    }
    Err(AppError::NotFound(format!(
        "No roadmap generation found for user {user_id}"
    )))
}

/// GET /api/v1/roadmap/:user_id
pub async fn get_roadmap_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let roadmap = state
        .store
        .load_roadmap(user_id)?
        .ok_or_else(|| AppError::NotFound(format!("No roadmap found for user {user_id}")))?;
    Ok(Json(json!({ "user_id": user_id, "roadmap": roadmap })))
}

/// GET /api/v1/roadmap/:user_id/recommendations
pub async fn get_recommendations_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let roadmap = state
        .store
        .load_roadmap(user_id)?
        .ok_or_else(|| AppError::NotFound(format!("No roadmap found for user {user_id}")))?;

    let recommendations = roadmap.personalized_recommendations.ok_or_else(|| {
        AppError::NotFound(format!(
            "Roadmap for user {user_id} has no personalized recommendations"
        ))
    })?;

    Ok(Json(json!({
        "user_id": user_id,
        "career_title": roadmap.career_title,
        "personalized_recommendations": recommendations
    })))
}
