//! Score analysis and adaptation-log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::roadmap::{AdaptiveStatus, Priority};

/// Headline counts from a score analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub weak_subtopics: Vec<String>,
    pub strong_subtopics: Vec<String>,
    pub total_analyzed: usize,
}

/// One per-subtopic classification, produced either by the completion
/// service or by the deterministic threshold fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtopicChange {
    pub subtopic_title: String,
    /// Accuracy as a percentage, 0.0 - 100.0.
    pub current_accuracy: f64,
    pub status: AdaptiveStatus,
    pub priority: Priority,
    pub recommendations: Vec<String>,
    pub add_study_time: String,
    pub block_progression: bool,
    #[serde(default)]
    pub ai_notes: String,
}

/// Full analysis result merged into the roadmap by the Adaptive Reviser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreAnalysis {
    #[serde(default)]
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub subtopic_changes: Vec<SubtopicChange>,
    #[serde(default)]
    pub overall_strategy: String,
}

/// Immutable log entry appended whenever a subtopic's annotation changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptationEvent {
    pub timestamp: DateTime<Utc>,
    pub affected_subtopic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_status: Option<AdaptiveStatus>,
    pub new_status: AdaptiveStatus,
    /// Accuracy as a percentage at the time of the change.
    pub accuracy: f64,
    pub change_description: String,
    pub reason: String,
}

/// Per-user adaptation history document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptationLog {
    pub user_id: i32,
    pub adaptations: Vec<AdaptationEvent>,
}

impl AdaptationLog {
    pub fn new(user_id: i32) -> Self {
        AdaptationLog {
            user_id,
            adaptations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_analysis_deserializes_model_output() {
        let json = r#"{
            "summary": {
                "weak_subtopics": ["SQL Basics"],
                "strong_subtopics": [],
                "total_analyzed": 2
            },
            "subtopic_changes": [{
                "subtopic_title": "SQL Basics",
                "current_accuracy": 25.0,
                "status": "needs_review",
                "priority": "high",
                "recommendations": ["Review fundamental concepts"],
                "add_study_time": "3 days",
                "block_progression": true,
                "ai_notes": "Focus on joins"
            }],
            "overall_strategy": "Shore up foundations first"
        }"#;
        let analysis: ScoreAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.summary.weak_subtopics, vec!["SQL Basics"]);
        assert_eq!(analysis.subtopic_changes[0].status, AdaptiveStatus::NeedsReview);
        assert_eq!(analysis.subtopic_changes[0].priority, Priority::High);
    }

    #[test]
    fn test_score_analysis_tolerates_missing_sections() {
        let analysis: ScoreAnalysis = serde_json::from_str("{}").unwrap();
        assert!(analysis.subtopic_changes.is_empty());
        assert_eq!(analysis.summary.total_analyzed, 0);
    }
}
