//! Roadmap Synthesizer — one prompt, one completion call, one document.
//!
//! Failure modes: a completion-service error propagates as
//! `GenerationFailed`; an unparseable response as `MalformedResponse`. No
//! retry at this layer — retries, if any, are the caller's concern.

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{extract, CompletionService};
use crate::models::profile::PsychometricProfile;
use crate::models::roadmap::RoadmapDocument;
use crate::roadmap::prompts::build_roadmap_prompt;
use crate::store::FileStore;

/// Generates a roadmap for the profile's recommended career and persists it,
/// replacing any prior roadmap for the user in full.
pub async fn synthesize_roadmap(
    store: &FileStore,
    llm: &dyn CompletionService,
    profile: &PsychometricProfile,
) -> Result<RoadmapDocument, AppError> {
    let career = profile.career_choice.as_deref().ok_or_else(|| {
        AppError::Validation(format!(
            "No career recommendation on profile for user {}",
            profile.id
        ))
    })?;

    info!("Generating roadmap for user {} (career: {career})", profile.id);

    let profile_json = serde_json::to_string_pretty(&profile.to_prompt_json())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    let prompt = build_roadmap_prompt(career, &profile_json, &Utc::now().to_rfc3339());

    let raw = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::GenerationFailed(format!("Roadmap completion call failed: {e}")))?;

    let value = extract::extract_json_object(&raw)?;
    let mut roadmap = RoadmapDocument::from_model_response(career, value)?;
    if roadmap.created_at.is_none() {
        roadmap.created_at = Some(Utc::now().to_rfc3339());
    }

    store.save_roadmap(profile.id, &roadmap)?;
    info!(
        "Roadmap for user {} saved ({} phases, {} subtopics)",
        profile.id,
        roadmap.phases.len(),
        roadmap.subtopic_count()
    );

    Ok(roadmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompletions;
    use crate::llm_client::CompletionError;
    use crate::models::profile::sample_profile;

    fn roadmap_response() -> String {
        serde_json::json!({
            "career_title": "Data Analyst",
            "roadmap_data": {
                "phases": [{
                    "phase_number": 1,
                    "phase_name": "Foundations",
                    "milestones": [{
                        "milestone_id": "M1.1",
                        "milestone_title": "Core Data Skills",
                        "subtopics": [{
                            "subtopic_id": "ST1.1.1",
                            "title": "SQL Basics",
                            "duration": "5 days",
                            "topic_list": ["SELECT", "JOIN"]
                        }]
                    }]
                }]
            },
            "personalized_recommendations": {"study_schedule": {"session_length": "45 minutes"}}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_successful_synthesis_persists_normalized_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let llm = ScriptedCompletions::new(vec![Ok(format!("```json\n{}\n```", roadmap_response()))]);

        let roadmap = synthesize_roadmap(&store, &llm, &sample_profile(7, "Data Analyst"))
            .await
            .unwrap();

        assert_eq!(roadmap.career_title, "Data Analyst");
        assert_eq!(roadmap.subtopic_count(), 1);
        assert!(roadmap.personalized_recommendations.is_some());

        let persisted = store.load_roadmap(7).unwrap().unwrap();
        assert_eq!(persisted.phases[0].milestones[0].milestone_id, "M1.1");
    }

    #[tokio::test]
    async fn test_service_error_is_generation_failed_with_no_retry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let llm = ScriptedCompletions::new(vec![Err(CompletionError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })]);

        let err = synthesize_roadmap(&store, &llm, &sample_profile(7, "Data Analyst"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationFailed(_)));
        assert_eq!(llm.call_count(), 1);
        assert!(store.load_roadmap(7).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prose_only_response_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let llm =
            ScriptedCompletions::new(vec![Ok("I'm sorry, I can't produce that.".to_string())]);

        let err = synthesize_roadmap(&store, &llm, &sample_profile(7, "Data Analyst"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_profile_without_career_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let llm = ScriptedCompletions::new(vec![]);

        let mut profile = sample_profile(7, "Data Analyst");
        profile.career_choice = None;

        let err = synthesize_roadmap(&store, &llm, &profile).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.call_count(), 0);
    }
}
