//! Score log model: per-user, append-only record of test answers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::questions::Difficulty;

/// One submitted answer. Appended, never rewritten; re-answering the same
/// question adds another record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_number: u32,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub topic_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub answered_at: DateTime<Utc>,
}

/// Leaf of the score log: one subtopic's answer history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtopicScores {
    pub subtopic_name: String,
    /// Timestamp of the first answer recorded for this subtopic.
    pub attempted_at: DateTime<Utc>,
    pub answers: Vec<AnswerRecord>,
}

/// Mirrors the test bank nesting: phase → milestone → subtopic → scores.
pub type ScoreLog = BTreeMap<String, BTreeMap<String, BTreeMap<String, SubtopicScores>>>;

/// Aggregated per-subtopic performance, keyed by subtopic label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtopicPerformance {
    pub correct: u32,
    pub total: u32,
}

impl SubtopicPerformance {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// Flattens the score log into `(correct, total)` per subtopic label.
///
/// The aggregation key is the subtopic *name*, not the id — the format the
/// recommendation prompt and the roadmap merge both key on. Two subtopics
/// sharing a title are deliberately conflated here.
pub fn aggregate_by_label(log: &ScoreLog) -> BTreeMap<String, SubtopicPerformance> {
    let mut performance: BTreeMap<String, SubtopicPerformance> = BTreeMap::new();
    for milestones in log.values() {
        for subtopics in milestones.values() {
            for scores in subtopics.values() {
                let entry = performance.entry(scores.subtopic_name.clone()).or_default();
                for answer in &scores.answers {
                    entry.total += 1;
                    if answer.is_correct {
                        entry.correct += 1;
                    }
                }
            }
        }
    }
    performance
}
