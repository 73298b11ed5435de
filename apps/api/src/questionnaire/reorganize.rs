//! Hierarchy Reorganizer — folds the flat question-set list into the nested
//! test bank keyed by (phase_number, milestone_id, subtopic_id).
//!
//! Pure projection: same input list, same bank, regardless of list order —
//! except that the last entry for a duplicate key wins. Duplicates should
//! not occur given the synthesizer's idempotency check; they are not
//! detected here.

use crate::models::questions::{QuestionSet, TestBank};

pub fn reorganize(sets: Vec<QuestionSet>) -> TestBank {
    let mut bank = TestBank::new();
    for set in sets {
        bank.entry(set.phase_number.to_string())
            .or_default()
            .entry(set.milestone_id.clone())
            .or_default()
            .insert(set.subtopic_id.clone(), set);
    }
    bank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::sample_question_set;

    #[test]
    fn test_groups_by_phase_milestone_subtopic() {
        let sets = vec![
            sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics"),
            sample_question_set(1, "M1.1", "ST1.1.2", "Data Visualization"),
            sample_question_set(2, "M2.1", "ST2.1.1", "Statistics"),
        ];
        let bank = reorganize(sets);

        assert_eq!(bank.len(), 2);
        assert_eq!(bank["1"]["M1.1"].len(), 2);
        assert_eq!(bank["1"]["M1.1"]["ST1.1.1"].subtopic_name, "SQL Basics");
        assert_eq!(bank["2"]["M2.1"]["ST2.1.1"].subtopic_name, "Statistics");
    }

    #[test]
    fn test_metadata_is_preserved_in_leaves() {
        let bank = reorganize(vec![sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics")]);
        let leaf = &bank["1"]["M1.1"]["ST1.1.1"];
        assert_eq!(leaf.career_title, "Data Analyst");
        assert_eq!(leaf.mcqs.len(), 1);
    }

    #[test]
    fn test_order_independent_for_distinct_keys() {
        let a = sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics");
        let b = sample_question_set(1, "M1.1", "ST1.1.2", "Data Visualization");

        let forward = reorganize(vec![a.clone(), b.clone()]);
        let reverse = reorganize(vec![b, a]);

        assert_eq!(
            serde_json::to_value(&forward).unwrap(),
            serde_json::to_value(&reverse).unwrap()
        );
    }

    #[test]
    fn test_last_duplicate_wins() {
        let mut first = sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics");
        first.career_title = "First".to_string();
        let mut second = first.clone();
        second.career_title = "Second".to_string();

        let bank = reorganize(vec![first, second]);
        assert_eq!(bank["1"]["M1.1"]["ST1.1.1"].career_title, "Second");
    }

    #[test]
    fn test_reorganize_is_idempotent_through_flatten() {
        let sets = vec![
            sample_question_set(1, "M1.1", "ST1.1.1", "SQL Basics"),
            sample_question_set(2, "M2.1", "ST2.1.1", "Statistics"),
        ];
        let bank = reorganize(sets);
        let flattened = crate::models::questions::TestDocument::Bank(bank.clone()).question_sets();
        let rebuilt = reorganize(flattened);

        assert_eq!(
            serde_json::to_value(&bank).unwrap(),
            serde_json::to_value(&rebuilt).unwrap()
        );
    }
}
