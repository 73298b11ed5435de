//! Questionnaire Synthesizer — one MCQ set per roadmap subtopic.
//!
//! Resumable by construction: the work list is every subtopic whose id is
//! absent from the user's existing question-set list, and the full flat list
//! is persisted after each per-subtopic success, so an interrupted run loses
//! at most one subtopic's worth of completion work.
//!
//! Retry policy per subtopic: up to [`MAX_ATTEMPTS`] attempts with
//! exponential back-off (2^attempt seconds), applied only to transient
//! failures. A non-transient failure skips the subtopic immediately; a
//! subtopic that exhausts its retries is recorded as a `pending` stub.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{extract, CompletionService};
use crate::models::questions::{QuestionSet, TestDocument};
use crate::models::roadmap::RoadmapDocument;
use crate::questionnaire::prompts::{build_question_prompt, QuestionPromptParams};
use crate::questionnaire::reorganize::reorganize;
use crate::store::FileStore;

const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_BASE_SECS: u64 = 2;

/// One subtopic still needing a question set.
#[derive(Debug, Clone)]
struct WorkItem {
    phase_number: u32,
    milestone_id: String,
    subtopic_id: String,
    subtopic_name: String,
    topic_list: Vec<String>,
}

/// Outcome counts for one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    pub generated: usize,
    pub pending: usize,
    pub skipped: usize,
    pub already_present: usize,
}

/// Generates question sets for every subtopic not yet covered, persists the
/// flat list incrementally, then reorganizes it into the nested test bank.
pub async fn synthesize_question_banks(
    store: &FileStore,
    llm: &dyn CompletionService,
    user_id: i32,
    roadmap: &RoadmapDocument,
) -> Result<SynthesisReport, AppError> {
    let mut sets = store
        .load_tests(user_id)?
        .map(|doc| doc.question_sets())
        .unwrap_or_default();

    let existing_ids: HashSet<String> = sets.iter().map(|s| s.subtopic_id.clone()).collect();
    let work_list: Vec<WorkItem> = roadmap
        .subtopics()
        .filter(|(_, _, subtopic)| !existing_ids.contains(&subtopic.subtopic_id))
        .map(|(phase, milestone, subtopic)| WorkItem {
            phase_number: phase.phase_number,
            milestone_id: milestone.milestone_id.clone(),
            subtopic_id: subtopic.subtopic_id.clone(),
            subtopic_name: subtopic.title.clone(),
            topic_list: subtopic.topic_list.clone(),
        })
        .collect();

    let mut report = SynthesisReport {
        already_present: existing_ids.len(),
        ..SynthesisReport::default()
    };

    if work_list.is_empty() {
        info!("All questionnaires already generated for user {user_id}");
    } else {
        info!(
            "Starting test generation for {} subtopics (user {user_id})",
            work_list.len()
        );
    }

    for item in work_list {
        match generate_with_retry(llm, &item, &roadmap.career_title).await {
            SubtopicOutcome::Generated(set) => {
                sets.push(set);
                store.save_tests(user_id, &TestDocument::Flat(sets.clone()))?;
                report.generated += 1;
                info!("Generated test for subtopic: {}", item.subtopic_name);
            }
            SubtopicOutcome::Pending => {
                sets.push(QuestionSet::pending(
                    item.phase_number,
                    &item.milestone_id,
                    &item.subtopic_id,
                    &item.subtopic_name,
                    &roadmap.career_title,
                ));
                store.save_tests(user_id, &TestDocument::Flat(sets.clone()))?;
                report.pending += 1;
                warn!(
                    "Marked subtopic '{}' pending after {MAX_ATTEMPTS} attempts",
                    item.subtopic_name
                );
            }
            SubtopicOutcome::Skipped(reason) => {
                report.skipped += 1;
                warn!(
                    "Failed to generate questionnaire for subtopic '{}': {reason}",
                    item.subtopic_name
                );
            }
        }
    }

    // Fold the flat list into the nested bank. One-way: the flat shape is
    // not retained after this point.
    let bank = reorganize(sets);
    store.save_tests(user_id, &TestDocument::Bank(bank))?;
    info!(
        "Organized test data for user {user_id}: {} generated, {} pending, {} skipped",
        report.generated, report.pending, report.skipped
    );

    Ok(report)
}

enum SubtopicOutcome {
    Generated(QuestionSet),
    /// Every attempt failed with a transient error.
    Pending,
    /// A terminal error; the subtopic is left without an entry.
    Skipped(String),
}

async fn generate_with_retry(
    llm: &dyn CompletionService,
    item: &WorkItem,
    career: &str,
) -> SubtopicOutcome {
    let prompt = build_question_prompt(&QuestionPromptParams {
        phase_number: item.phase_number,
        milestone_id: &item.milestone_id,
        subtopic_id: &item.subtopic_id,
        subtopic_name: &item.subtopic_name,
        topics: &item.topic_list,
        career,
        created_at: &Utc::now().to_rfc3339(),
    });

    for attempt in 0..MAX_ATTEMPTS {
        match llm.complete(&prompt).await {
            Ok(raw) => match extract::parse_structured::<QuestionSet>(&raw) {
                Ok(set) => return SubtopicOutcome::Generated(set),
                Err(e) => return SubtopicOutcome::Skipped(e.to_string()),
            },
            Err(e) if e.is_transient() => {
                if attempt + 1 < MAX_ATTEMPTS {
                    let delay = Duration::from_secs(BACKOFF_BASE_SECS.pow(attempt));
                    warn!(
                        "Completion service overloaded; retrying '{}' in {}s",
                        item.subtopic_name,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return SubtopicOutcome::Skipped(e.to_string()),
        }
    }

    SubtopicOutcome::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompletions;
    use crate::llm_client::CompletionError;
    use crate::models::roadmap::sample_roadmap;

    fn question_set_response(phase: u32, milestone: &str, subtopic_id: &str, name: &str) -> String {
        serde_json::json!({
            "phase_number": phase,
            "milestone_id": milestone,
            "subtopic_id": subtopic_id,
            "subtopic_name": name,
            "career_title": "Data Analyst",
            "created_at": "2026-08-30T00:00:00Z",
            "mcqs": [{
                "question": "Which clause filters rows?",
                "options": {"1": "SELECT", "2": "WHERE", "3": "ORDER BY"},
                "answer": "2",
                "topic_label": name,
                "difficulty": "easy"
            }]
        })
        .to_string()
    }

    fn overloaded() -> CompletionError {
        CompletionError::Api {
            status: 503,
            message: "The model is overloaded. UNAVAILABLE".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_run_covers_every_subtopic() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let roadmap = sample_roadmap();
        let llm = ScriptedCompletions::new(vec![
            Ok(question_set_response(1, "M1.1", "ST1.1.1", "SQL Basics")),
            Ok(question_set_response(1, "M1.1", "ST1.1.2", "Data Visualization")),
        ]);

        let report = synthesize_question_banks(&store, &llm, 7, &roadmap)
            .await
            .unwrap();

        assert_eq!(report.generated, 2);
        assert_eq!(report.pending, 0);
        assert_eq!(llm.call_count(), 2);

        // Referential completeness: N subtopics, N entries, all from the roadmap.
        let doc = store.load_tests(7).unwrap().unwrap();
        let sets = doc.question_sets();
        assert_eq!(sets.len(), roadmap.subtopic_count());
        let roadmap_ids: HashSet<&str> = roadmap
            .subtopics()
            .map(|(_, _, s)| s.subtopic_id.as_str())
            .collect();
        assert!(sets.iter().all(|s| roadmap_ids.contains(s.subtopic_id.as_str())));
        assert!(doc.as_bank().is_some(), "run must end with the nested bank");
    }

    #[tokio::test]
    async fn test_rerun_makes_zero_completion_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let roadmap = sample_roadmap();
        let llm = ScriptedCompletions::new(vec![
            Ok(question_set_response(1, "M1.1", "ST1.1.1", "SQL Basics")),
            Ok(question_set_response(1, "M1.1", "ST1.1.2", "Data Visualization")),
        ]);
        synthesize_question_banks(&store, &llm, 7, &roadmap)
            .await
            .unwrap();
        let before = serde_json::to_value(store.load_tests(7).unwrap().unwrap()).unwrap();

        let rerun = ScriptedCompletions::new(vec![]);
        let report = synthesize_question_banks(&store, &rerun, 7, &roadmap)
            .await
            .unwrap();

        assert_eq!(rerun.call_count(), 0);
        assert_eq!(report.generated, 0);
        assert_eq!(report.already_present, 2);
        let after = serde_json::to_value(store.load_tests(7).unwrap().unwrap()).unwrap();
        assert_eq!(before, after, "question-set list must be unchanged");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_back_off_then_mark_pending() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let roadmap = sample_roadmap();
        // Second subtopic succeeds so the pending stub is clearly isolated.
        let llm = ScriptedCompletions::new(vec![
            Err(overloaded()),
            Err(overloaded()),
            Err(overloaded()),
            Err(overloaded()),
            Err(overloaded()),
            Ok(question_set_response(1, "M1.1", "ST1.1.2", "Data Visualization")),
        ]);

        let started = tokio::time::Instant::now();
        let report = synthesize_question_banks(&store, &llm, 7, &roadmap)
            .await
            .unwrap();

        // Waits 2^0 + 2^1 + 2^2 + 2^3 seconds between the five attempts;
        // no sleep after the final failure.
        assert_eq!(started.elapsed(), Duration::from_secs(1 + 2 + 4 + 8));
        assert_eq!(llm.call_count(), 6);
        assert_eq!(report.pending, 1);
        assert_eq!(report.generated, 1);

        let sets = store.load_tests(7).unwrap().unwrap().question_sets();
        let stub = sets.iter().find(|s| s.subtopic_id == "ST1.1.1").unwrap();
        assert!(stub.is_pending());
        assert!(stub.mcqs.is_empty());
    }

    #[tokio::test]
    async fn test_terminal_failure_skips_without_retry_or_stub() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let roadmap = sample_roadmap();
        let llm = ScriptedCompletions::new(vec![
            Err(CompletionError::Api {
                status: 400,
                message: "prompt rejected".to_string(),
            }),
            Ok(question_set_response(1, "M1.1", "ST1.1.2", "Data Visualization")),
        ]);

        let report = synthesize_question_banks(&store, &llm, 7, &roadmap)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.generated, 1);
        assert_eq!(llm.call_count(), 2, "terminal errors must not retry");

        let sets = store.load_tests(7).unwrap().unwrap().question_sets();
        assert!(sets.iter().all(|s| s.subtopic_id != "ST1.1.1"));
    }

    #[tokio::test]
    async fn test_partial_run_resumes_only_missing_subtopics() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let roadmap = sample_roadmap();

        // First run: one success, one terminal skip.
        let llm = ScriptedCompletions::new(vec![
            Ok(question_set_response(1, "M1.1", "ST1.1.1", "SQL Basics")),
            Err(CompletionError::Api {
                status: 400,
                message: "prompt rejected".to_string(),
            }),
        ]);
        synthesize_question_banks(&store, &llm, 7, &roadmap)
            .await
            .unwrap();

        // Second run attempts only the missing subtopic.
        let resume = ScriptedCompletions::new(vec![Ok(question_set_response(
            1,
            "M1.1",
            "ST1.1.2",
            "Data Visualization",
        ))]);
        let report = synthesize_question_banks(&store, &resume, 7, &roadmap)
            .await
            .unwrap();

        assert_eq!(resume.call_count(), 1);
        assert_eq!(report.generated, 1);
        assert_eq!(report.already_present, 1);
        assert_eq!(store.load_tests(7).unwrap().unwrap().question_sets().len(), 2);
    }
}
