//! Roadmap document model.
//!
//! The completion service is prompted for one canonical shape, but in
//! practice the phases array arrives under `roadmap.roadmap_data`,
//! `roadmap_data`, `roadmap`, or at the top level. All of that variance is
//! absorbed once, at ingestion, by [`RoadmapDocument::from_model_response`];
//! the rest of the pipeline only ever sees the canonical shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Adaptation status attached to a subtopic by the Adaptive Reviser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveStatus {
    NeedsReview,
    Mastered,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A single subtopic: the unit tests and adaptations are keyed on.
/// `subtopic_id` is the join key across the test bank and score log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtopic {
    pub subtopic_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub topic_list: Vec<String>,

    // Annotation block, absent until the Adaptive Reviser writes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive_status: Option<AdaptiveStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive_priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_progression: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_duration: Option<String>,

    /// Model-supplied fields we do not interpret (resources, projects, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub milestone_id: String,
    pub milestone_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub phase_number: u32,
    pub phase_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata block written by the Adaptive Reviser on each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveMetadata {
    pub user_id: i32,
    pub last_updated: DateTime<Utc>,
    pub ai_analysis_summary: Value,
    pub subtopics_modified: Vec<String>,
    pub total_changes: usize,
}

/// The canonical per-user roadmap document. Owned by exactly one user id and
/// always persisted as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapDocument {
    pub career_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychometric_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalized_recommendations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_metrics: Option<Value>,
    pub phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive_metadata: Option<AdaptiveMetadata>,
}

impl RoadmapDocument {
    /// Normalizes a raw model response into the canonical document shape.
    ///
    /// Accepts phases under `roadmap.roadmap_data.phases`,
    /// `roadmap_data.phases`, `roadmap.phases`, or `phases`. Returns
    /// `MalformedResponse` when no phases array can be located or a phase
    /// fails to deserialize.
    pub fn from_model_response(career: &str, mut value: Value) -> Result<Self, AppError> {
        let phases_value = take_phases(&mut value).ok_or_else(|| AppError::MalformedResponse {
            reason: "no 'phases' array found in response".to_string(),
            snippet: truncate(&value.to_string(), 80),
        })?;

        let phases: Vec<Phase> =
            serde_json::from_value(phases_value).map_err(|e| AppError::MalformedResponse {
                reason: format!("phases array does not match schema: {e}"),
                snippet: String::new(),
            })?;

        let career_title = value
            .get("career_title")
            .and_then(Value::as_str)
            .unwrap_or(career)
            .to_string();

        Ok(RoadmapDocument {
            career_title,
            created_at: value
                .get("created_at")
                .and_then(Value::as_str)
                .map(str::to_string),
            summary: value
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string),
            psychometric_analysis: value.get("psychometric_analysis").cloned(),
            personalized_recommendations: value.get("personalized_recommendations").cloned(),
            success_metrics: value.get("success_metrics").cloned(),
            phases,
            adaptive_metadata: None,
        })
    }

    /// Every subtopic in phase order, with its owning phase/milestone.
    pub fn subtopics(&self) -> impl Iterator<Item = (&Phase, &Milestone, &Subtopic)> {
        self.phases.iter().flat_map(|phase| {
            phase.milestones.iter().flat_map(move |milestone| {
                milestone
                    .subtopics
                    .iter()
                    .map(move |subtopic| (phase, milestone, subtopic))
            })
        })
    }

    pub fn subtopic_count(&self) -> usize {
        self.subtopics().count()
    }
}

/// Pulls the phases array out of whichever nesting the model chose.
fn take_phases(value: &mut Value) -> Option<Value> {
    let candidates: [&[&str]; 4] = [
        &["roadmap", "roadmap_data", "phases"],
        &["roadmap_data", "phases"],
        &["roadmap", "phases"],
        &["phases"],
    ];

    for path in candidates {
        let mut cursor = Some(&mut *value);
        for key in &path[..path.len() - 1] {
            cursor = cursor.and_then(|node| node.get_mut(*key));
        }
        if let Some(node) = cursor {
            if let Some(phases) = node.get_mut(*path.last().unwrap()) {
                if phases.is_array() {
                    return Some(phases.take());
                }
            }
        }
    }
    None
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
pub(crate) fn sample_roadmap() -> RoadmapDocument {
    let value = serde_json::json!({
        "career_title": "Data Analyst",
        "roadmap_data": {
            "phases": [{
                "phase_number": 1,
                "phase_name": "Foundations",
                "duration": "Months 1-3",
                "milestones": [{
                    "milestone_id": "M1.1",
                    "milestone_title": "Core Data Skills",
                    "duration": "4 weeks",
                    "subtopics": [
                        {
                            "subtopic_id": "ST1.1.1",
                            "title": "SQL Basics",
                            "duration": "5 days",
                            "topic_list": ["SELECT statements", "JOINs", "Aggregations"]
                        },
                        {
                            "subtopic_id": "ST1.1.2",
                            "title": "Data Visualization",
                            "duration": "4 days",
                            "topic_list": ["Chart types", "Dashboards"]
                        }
                    ]
                }]
            }]
        }
    });
    RoadmapDocument::from_model_response("Data Analyst", value).unwrap()
}
