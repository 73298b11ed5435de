//! Question set and test bank models.
//!
//! The per-user test document lives in one slot and has two shapes over its
//! lifetime: a flat array of question sets while the Questionnaire
//! Synthesizer is filling it, and a nested phase → milestone → subtopic map
//! after the Hierarchy Reorganizer runs. [`TestDocument`] deserializes both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One multiple-choice question. `options` maps short keys ("1".."5") to
/// option text; `answer` is the correct key, matched exactly on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub answer: String,
    pub topic_label: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSetStatus {
    /// Generation was attempted but exhausted its transient-failure retries.
    Pending,
}

/// One question set per subtopic. Owning identifiers are denormalized so the
/// reorganizer can key the nested bank without consulting the roadmap.
/// Created once; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub phase_number: u32,
    pub milestone_id: String,
    pub subtopic_id: String,
    pub subtopic_name: String,
    pub career_title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub mcqs: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QuestionSetStatus>,
}

impl QuestionSet {
    /// Stub recorded when generation for a subtopic gave up on transient
    /// failures. Distinguishes "tried and deferred" from "never attempted".
    pub fn pending(
        phase_number: u32,
        milestone_id: &str,
        subtopic_id: &str,
        subtopic_name: &str,
        career_title: &str,
    ) -> Self {
        QuestionSet {
            phase_number,
            milestone_id: milestone_id.to_string(),
            subtopic_id: subtopic_id.to_string(),
            subtopic_name: subtopic_name.to_string(),
            career_title: career_title.to_string(),
            created_at: Utc::now(),
            mcqs: Vec::new(),
            status: Some(QuestionSetStatus::Pending),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(QuestionSetStatus::Pending)
    }
}

/// Nested lookup: phase_number (stringified — JSON keys) → milestone_id →
/// subtopic_id → QuestionSet.
pub type TestBank = BTreeMap<String, BTreeMap<String, BTreeMap<String, QuestionSet>>>;

/// The on-disk test document in either lifecycle shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestDocument {
    Flat(Vec<QuestionSet>),
    Bank(TestBank),
}

impl TestDocument {
    /// Flattens either shape back to the question-set list. Used by the
    /// Questionnaire Synthesizer's idempotency check, which must also see
    /// sets already folded into a bank by a previous completed run.
    pub fn question_sets(&self) -> Vec<QuestionSet> {
        match self {
            TestDocument::Flat(sets) => sets.clone(),
            TestDocument::Bank(bank) => bank
                .values()
                .flat_map(|milestones| milestones.values())
                .flat_map(|subtopics| subtopics.values())
                .cloned()
                .collect(),
        }
    }

    pub fn as_bank(&self) -> Option<&TestBank> {
        match self {
            TestDocument::Bank(bank) => Some(bank),
            TestDocument::Flat(_) => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_question_set(
    phase_number: u32,
    milestone_id: &str,
    subtopic_id: &str,
    subtopic_name: &str,
) -> QuestionSet {
    let question = Question {
        question: format!("What is covered by {subtopic_name}?"),
        options: BTreeMap::from([
            ("1".to_string(), "Option A".to_string()),
            ("2".to_string(), "Option B".to_string()),
            ("3".to_string(), "Option C".to_string()),
            ("4".to_string(), "Option D".to_string()),
        ]),
        answer: "2".to_string(),
        topic_label: subtopic_name.to_string(),
        difficulty: Difficulty::Easy,
    };
    QuestionSet {
        phase_number,
        milestone_id: milestone_id.to_string(),
        subtopic_id: subtopic_id.to_string(),
        subtopic_name: subtopic_name.to_string(),
        career_title: "Data Analyst".to_string(),
        created_at: Utc::now(),
        mcqs: vec![question],
        status: None,
    }
}
