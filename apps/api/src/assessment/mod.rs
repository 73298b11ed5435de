//! Test engine: question lookup and answer recording.
//!
//! Questions are served from the nested test bank only. A flat test document
//! means the questionnaire pipeline has not finished for this user, and is
//! reported the same as a missing one. Answers are graded by exact match on
//! the option key and appended to the score log, never rewritten.

pub mod handlers;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::questions::QuestionSet;
use crate::models::scores::{AnswerRecord, ScoreLog, SubtopicScores};
use crate::store::FileStore;

/// Grading result for one submitted answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub question_number: u32,
    pub is_correct: bool,
    pub correct_answer: String,
}

/// Loads the question set at (phase, milestone, subtopic) from the user's
/// test bank.
pub fn load_questions(
    store: &FileStore,
    user_id: i32,
    phase: &str,
    milestone_id: &str,
    subtopic_id: &str,
) -> Result<QuestionSet, AppError> {
    let not_found = || {
        AppError::TestNotFound(format!(
            "No test for user {user_id} at {phase}/{milestone_id}/{subtopic_id}"
        ))
    };

    let doc = store.load_tests(user_id)?.ok_or_else(not_found)?;
    let bank = doc.as_bank().ok_or_else(not_found)?;

    bank.get(phase)
        .and_then(|milestones| milestones.get(milestone_id))
        .and_then(|subtopics| subtopics.get(subtopic_id))
        .cloned()
        .ok_or_else(not_found)
}

/// Grades one answer against the bank and appends it to the score log.
///
/// The score-log path for the subtopic is created lazily on the first answer;
/// later answers append to it. Re-answering a question adds a new record
/// rather than replacing the old one.
pub fn record_answer(
    store: &FileStore,
    user_id: i32,
    phase: &str,
    milestone_id: &str,
    subtopic_id: &str,
    question_number: u32,
    user_answer: &str,
) -> Result<AnswerOutcome, AppError> {
    let set = load_questions(store, user_id, phase, milestone_id, subtopic_id)?;

    let index = usize::try_from(question_number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| {
            AppError::Validation(format!("Invalid question number: {question_number}"))
        })?;
    let question = set.mcqs.get(index).ok_or_else(|| {
        AppError::Validation(format!(
            "Question {question_number} does not exist in {subtopic_id} ({} questions)",
            set.mcqs.len()
        ))
    })?;

    let is_correct = question.answer == user_answer;
    let record = AnswerRecord {
        question_number,
        question: question.question.clone(),
        user_answer: user_answer.to_string(),
        correct_answer: question.answer.clone(),
        is_correct,
        topic_label: question.topic_label.clone(),
        difficulty: Some(question.difficulty),
        answered_at: Utc::now(),
    };

    let mut scores = store.load_scores(user_id)?;
    scores
        .entry(phase.to_string())
        .or_default()
        .entry(milestone_id.to_string())
        .or_default()
        .entry(subtopic_id.to_string())
        .or_insert_with(|| SubtopicScores {
            subtopic_name: set.subtopic_name.clone(),
            attempted_at: Utc::now(),
            answers: Vec::new(),
        })
        .answers
        .push(record);
    store.save_scores(user_id, &scores)?;

    info!(
        "Recorded answer for user {user_id} {subtopic_id} q{question_number}: {}",
        if is_correct { "correct" } else { "incorrect" }
    );

    Ok(AnswerOutcome {
        question_number,
        is_correct,
        correct_answer: question.answer.clone(),
    })
}

#[cfg(test)]
pub(crate) fn seed_bank(store: &FileStore, user_id: i32, sets: Vec<QuestionSet>) {
    use crate::models::questions::TestDocument;
    use crate::questionnaire::reorganize::reorganize;
    store
        .save_tests(user_id, &TestDocument::Bank(reorganize(sets)))
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::{sample_question_set, TestDocument};

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_questions_finds_bank_leaf() {
        let (_dir, store) = store();
        seed_bank(&store, 7, vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);

        let set = load_questions(&store, 7, "1", "M1.1", "ST1.1.1").unwrap();
        assert_eq!(set.subtopic_name, "SQL Basics");
        assert_eq!(set.mcqs.len(), 1);
    }

    #[test]
    fn test_missing_paths_are_test_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            load_questions(&store, 7, "1", "M1.1", "ST1.1.1"),
            Err(AppError::TestNotFound(_))
        ));

        seed_bank(&store, 7, vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);
        assert!(matches!(
            load_questions(&store, 7, "1", "M1.1", "ST9.9.9"),
            Err(AppError::TestNotFound(_))
        ));
        assert!(matches!(
            load_questions(&store, 7, "2", "M1.1", "ST1.1.1"),
            Err(AppError::TestNotFound(_))
        ));
    }

    #[test]
    fn test_flat_document_reads_as_not_found() {
        let (_dir, store) = store();
        store
            .save_tests(
                7,
                &TestDocument::Flat(vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]),
            )
            .unwrap();
        assert!(matches!(
            load_questions(&store, 7, "1", "M1.1", "ST1.1.1"),
            Err(AppError::TestNotFound(_))
        ));
    }

    #[test]
    fn test_record_answer_grades_by_exact_key_match() {
        let (_dir, store) = store();
        // sample_question_set's correct answer key is "2"
        seed_bank(&store, 7, vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);

        let wrong = record_answer(&store, 7, "1", "M1.1", "ST1.1.1", 1, "1").unwrap();
        assert!(!wrong.is_correct);
        assert_eq!(wrong.correct_answer, "2");

        let right = record_answer(&store, 7, "1", "M1.1", "ST1.1.1", 1, "2").unwrap();
        assert!(right.is_correct);
    }

    #[test]
    fn test_score_log_grows_append_only() {
        let (_dir, store) = store();
        seed_bank(&store, 7, vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);

        for answer in ["1", "2", "1"] {
            record_answer(&store, 7, "1", "M1.1", "ST1.1.1", 1, answer).unwrap();
        }

        let scores = store.load_scores(7).unwrap();
        let subtopic = &scores["1"]["M1.1"]["ST1.1.1"];
        assert_eq!(subtopic.subtopic_name, "SQL Basics");
        assert_eq!(subtopic.answers.len(), 3);
        assert_eq!(
            subtopic.answers.iter().filter(|a| a.is_correct).count(),
            1
        );
    }

    #[test]
    fn test_out_of_range_question_number_is_validation_error() {
        let (_dir, store) = store();
        seed_bank(&store, 7, vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);

        assert!(matches!(
            record_answer(&store, 7, "1", "M1.1", "ST1.1.1", 0, "1"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            record_answer(&store, 7, "1", "M1.1", "ST1.1.1", 5, "1"),
            Err(AppError::Validation(_))
        ));
        assert!(store.load_scores(7).unwrap().is_empty());
    }
}
