use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `psychometry_data` table: the full psychometric survey
/// result for a user plus the recommended career label. Loaded externally
/// from CSV; read-only to this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PsychometricProfile {
    pub id: i32,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub openness: Option<i32>,
    pub conscientiousness: Option<i32>,
    pub extraversion: Option<i32>,
    pub agreeableness: Option<i32>,
    pub neuroticism: Option<i32>,
    pub emotional: Option<i32>,
    pub risk_tolerance: Option<i32>,
    pub stress_resilience: Option<i32>,
    pub decision_making_style: Option<String>,
    pub motivation_type: Option<String>,
    pub logical_reasoning: Option<String>,
    pub verbal_ability: Option<String>,
    pub numerical_ability: Option<String>,
    pub creativity: Option<String>,
    pub memory_attention_span: Option<String>,
    pub learning_style: Option<String>,
    pub analytical: Option<String>,
    pub communication: Option<String>,
    pub leadership: Option<String>,
    // Column names below keep the spelling used by the CSV loader.
    #[sqlx(rename = "proble_solving")]
    #[serde(rename = "problem_solving")]
    pub problem_solving: Option<String>,
    pub technical_programming: Option<String>,
    pub artistic_design: Option<String>,
    #[sqlx(rename = "empathy_and_counciling_ability")]
    #[serde(rename = "empathy_and_counseling_ability")]
    pub empathy_and_counseling_ability: Option<String>,
    #[sqlx(rename = "negotiation_persuation")]
    #[serde(rename = "negotiation_persuasion")]
    pub negotiation_persuasion: Option<String>,
    pub entrepreneurial_drive: Option<i32>,
    #[sqlx(rename = "domain_specefic_skills")]
    #[serde(rename = "domain_specific_skills")]
    pub domain_specific_skills: Option<String>,
    pub interests: Option<String>,
    #[sqlx(rename = "prefered_work_environment")]
    #[serde(rename = "preferred_work_environment")]
    pub preferred_work_environment: Option<String>,
    pub values_and_motivators: Option<String>,
    pub career_choice: Option<String>,
}

impl PsychometricProfile {
    /// Serializes the profile for embedding into a generation prompt.
    pub fn to_prompt_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Builds a fully-populated profile for tests.
#[cfg(test)]
pub(crate) fn sample_profile(id: i32, career: &str) -> PsychometricProfile {
    PsychometricProfile {
        id,
        age: Some(24),
        gender: Some("F".to_string()),
        education: Some("Bachelors".to_string()),
        openness: Some(7),
        conscientiousness: Some(8),
        extraversion: Some(4),
        agreeableness: Some(6),
        neuroticism: Some(3),
        emotional: Some(7),
        risk_tolerance: Some(5),
        stress_resilience: Some(6),
        decision_making_style: Some("Analytical".to_string()),
        motivation_type: Some("Intrinsic".to_string()),
        logical_reasoning: Some("High".to_string()),
        verbal_ability: Some("Medium".to_string()),
        numerical_ability: Some("High".to_string()),
        creativity: Some("Medium".to_string()),
        memory_attention_span: Some("High".to_string()),
        learning_style: Some("Visual".to_string()),
        analytical: Some("High".to_string()),
        communication: Some("Medium".to_string()),
        leadership: Some("Medium".to_string()),
        problem_solving: Some("High".to_string()),
        technical_programming: Some("Medium".to_string()),
        artistic_design: Some("Low".to_string()),
        empathy_and_counseling_ability: Some("Medium".to_string()),
        negotiation_persuasion: Some("Low".to_string()),
        entrepreneurial_drive: Some(4),
        domain_specific_skills: Some("SQL".to_string()),
        interests: Some("Data".to_string()),
        preferred_work_environment: Some("Remote".to_string()),
        values_and_motivators: Some("Growth".to_string()),
        career_choice: Some(career.to_string()),
    }
}
