//! Adaptive Reviser — turns test scores into roadmap annotations.
//!
//! Two analysis paths feed one merge step. The primary path asks the
//! completion service to classify subtopics; when that call fails or returns
//! unparseable output, the deterministic threshold fallback produces the same
//! `ScoreAnalysis` shape. Either way the merge annotates matching subtopics
//! in place (joined by title), appends one adaptation event per modified
//! subtopic, stamps the document's adaptive metadata, and persists the
//! roadmap wholesale.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::adaptive::prompts::build_analysis_prompt;
use crate::errors::AppError;
use crate::llm_client::{extract, CompletionService};
use crate::models::adaptation::{AdaptationEvent, AnalysisSummary, ScoreAnalysis, SubtopicChange};
use crate::models::roadmap::{AdaptiveMetadata, AdaptiveStatus, Priority, RoadmapDocument};
use crate::models::scores::{aggregate_by_label, SubtopicPerformance};
use crate::store::FileStore;

const WEAK_THRESHOLD: f64 = 0.60;
const MASTERY_THRESHOLD: f64 = 0.85;
const WEAK_EXTRA_TIME: &str = "3 days";

/// Result of one revision run.
#[derive(Debug, Clone)]
pub struct RevisionOutcome {
    pub modified_subtopics: Vec<String>,
    pub total_changes: usize,
    pub analysis: ScoreAnalysis,
}

/// Re-analyzes the user's score log and rewrites the roadmap's adaptive
/// annotations. No-op (returns an empty outcome) when no answers exist yet.
pub async fn revise_roadmap(
    store: &FileStore,
    llm: &dyn CompletionService,
    user_id: i32,
) -> Result<RevisionOutcome, AppError> {
    let mut roadmap = store
        .load_roadmap(user_id)?
        .ok_or_else(|| AppError::NotFound(format!("No roadmap found for user {user_id}")))?;

    let scores = store.load_scores(user_id)?;
    let performance = aggregate_by_label(&scores);
    if performance.is_empty() {
        return Ok(RevisionOutcome {
            modified_subtopics: Vec::new(),
            total_changes: 0,
            analysis: ScoreAnalysis::default(),
        });
    }

    let analysis = match analyze_with_model(llm, &roadmap, &performance).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Score analysis via completion service failed, using threshold fallback: {e}");
            fallback_analysis(&performance)
        }
    };

    let events = apply_analysis(&mut roadmap, &analysis);
    let modified: Vec<String> = events.iter().map(|e| e.affected_subtopic.clone()).collect();

    roadmap.adaptive_metadata = Some(AdaptiveMetadata {
        user_id,
        last_updated: Utc::now(),
        ai_analysis_summary: serde_json::to_value(&analysis.summary)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize summary: {e}")))?,
        subtopics_modified: modified.clone(),
        total_changes: events.len(),
    });

    let total_changes = events.len();
    store.append_adaptations(user_id, events)?;
    store.save_roadmap(user_id, &roadmap)?;

    info!(
        "Adaptive revision for user {user_id}: {total_changes} subtopic(s) modified"
    );

    Ok(RevisionOutcome {
        modified_subtopics: modified,
        total_changes,
        analysis,
    })
}

async fn analyze_with_model(
    llm: &dyn CompletionService,
    roadmap: &RoadmapDocument,
    performance: &BTreeMap<String, SubtopicPerformance>,
) -> Result<ScoreAnalysis, AppError> {
    let lines: Vec<String> = performance
        .iter()
        .map(|(label, perf)| {
            format!(
                "- {label}: {:.1}% ({}/{} correct)",
                perf.accuracy() * 100.0,
                perf.correct,
                perf.total
            )
        })
        .collect();
    let titles: Vec<String> = roadmap
        .subtopics()
        .map(|(_, _, s)| s.title.clone())
        .collect();

    let prompt = build_analysis_prompt(&roadmap.career_title, &lines.join("\n"), &titles);
    let raw = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::GenerationFailed(format!("Score analysis call failed: {e}")))?;
    extract::parse_structured::<ScoreAnalysis>(&raw)
}

/// Deterministic classification used when the completion service cannot be
/// consulted. Strict inequalities: exactly 60% and exactly 85% are both left
/// untouched.
pub fn fallback_analysis(performance: &BTreeMap<String, SubtopicPerformance>) -> ScoreAnalysis {
    let mut analysis = ScoreAnalysis {
        summary: AnalysisSummary {
            total_analyzed: performance.len(),
            ..AnalysisSummary::default()
        },
        overall_strategy: "Threshold-based revision (completion service unavailable)".to_string(),
        ..ScoreAnalysis::default()
    };

    for (label, perf) in performance {
        let accuracy = perf.accuracy();
        if accuracy < WEAK_THRESHOLD {
            analysis.summary.weak_subtopics.push(label.clone());
            analysis.subtopic_changes.push(SubtopicChange {
                subtopic_title: label.clone(),
                current_accuracy: accuracy * 100.0,
                status: AdaptiveStatus::NeedsReview,
                priority: Priority::High,
                recommendations: vec![
                    format!("Review the fundamentals of {label} before moving on"),
                    "Retake the test after revising the weakest topics".to_string(),
                ],
                add_study_time: WEAK_EXTRA_TIME.to_string(),
                block_progression: true,
                ai_notes: String::new(),
            });
        } else if accuracy > MASTERY_THRESHOLD {
            analysis.summary.strong_subtopics.push(label.clone());
            analysis.subtopic_changes.push(SubtopicChange {
                subtopic_title: label.clone(),
                current_accuracy: accuracy * 100.0,
                status: AdaptiveStatus::Mastered,
                priority: Priority::Low,
                recommendations: Vec::new(),
                add_study_time: "0 days".to_string(),
                block_progression: false,
                ai_notes: String::new(),
            });
        }
    }

    analysis
}

/// Writes each change onto every roadmap subtopic whose title matches,
/// returning one event per subtopic actually modified.
fn apply_analysis(roadmap: &mut RoadmapDocument, analysis: &ScoreAnalysis) -> Vec<AdaptationEvent> {
    let mut events = Vec::new();

    for change in &analysis.subtopic_changes {
        for phase in &mut roadmap.phases {
            for milestone in &mut phase.milestones {
                for subtopic in &mut milestone.subtopics {
                    if subtopic.title != change.subtopic_title {
                        continue;
                    }

                    let prior_status = subtopic.adaptive_status;
                    subtopic.adaptive_status = Some(change.status);
                    subtopic.adaptive_priority = Some(change.priority);
                    subtopic.performance_accuracy = Some(change.current_accuracy);
                    subtopic.ai_recommendations = Some(change.recommendations.clone());
                    subtopic.ai_notes = Some(change.ai_notes.clone());
                    subtopic.block_progression = Some(change.block_progression);

                    if change.add_study_time != "0 days" {
                        let original = subtopic
                            .original_duration
                            .clone()
                            .or_else(|| subtopic.duration.clone())
                            .unwrap_or_else(|| "unspecified".to_string());
                        subtopic.adjusted_duration =
                            Some(format!("{original} + {}", change.add_study_time));
                        subtopic.original_duration = Some(original);
                    }

                    events.push(AdaptationEvent {
                        timestamp: Utc::now(),
                        affected_subtopic: subtopic.title.clone(),
                        prior_status,
                        new_status: change.status,
                        accuracy: change.current_accuracy,
                        change_description: format!(
                            "Status changed to {}",
                            match change.status {
                                AdaptiveStatus::NeedsReview => "needs_review",
                                AdaptiveStatus::Mastered => "mastered",
                                AdaptiveStatus::Neutral => "neutral",
                            }
                        ),
                        reason: format!(
                            "User performance: {:.1}% accuracy",
                            change.current_accuracy
                        ),
                    });
                }
            }
        }
    }

    events
}
