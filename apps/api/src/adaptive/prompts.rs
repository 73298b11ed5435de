// Prompt constants for score analysis.

/// Score-analysis prompt. Replace `{career}`, `{performance_lines}`, and
/// `{subtopic_titles}` before sending.
pub const SCORE_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an adaptive learning engine. Analyze the user's test performance for the "{career}" roadmap and decide which subtopics need intervention.

**Performance by subtopic:**
{performance_lines}

**Roadmap subtopics (titles):**
{subtopic_titles}

**Rules:**
1. Accuracy below 60%: status "needs_review", priority "high", block progression, add study time (e.g. "3 days"), give 2-3 concrete recommendations
2. Accuracy above 85%: status "mastered", priority "low", add_study_time "0 days"
3. Otherwise leave the subtopic out of subtopic_changes
4. `subtopic_title` must match a roadmap subtopic title exactly

**Output Format:**
{
    "summary": {
        "weak_subtopics": ["..."],
        "strong_subtopics": ["..."],
        "total_analyzed": 0
    },
    "subtopic_changes": [
        {
            "subtopic_title": "...",
            "current_accuracy": 55.0,
            "status": "needs_review",
            "priority": "high",
            "recommendations": ["...", "..."],
            "add_study_time": "3 days",
            "block_progression": true,
            "ai_notes": "..."
        }
    ],
    "overall_strategy": "..."
}

**Output valid JSON only. No explanations.**"#;

pub fn build_analysis_prompt(
    career: &str,
    performance_lines: &str,
    subtopic_titles: &[String],
) -> String {
    SCORE_ANALYSIS_PROMPT_TEMPLATE
        .replace("{career}", career)
        .replace("{performance_lines}", performance_lines)
        .replace("{subtopic_titles}", &format!("{subtopic_titles:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_performance_and_titles() {
        let prompt = build_analysis_prompt(
            "Data Analyst",
            "- SQL Basics: 25.0% (1/4 correct)",
            &["SQL Basics".to_string(), "Data Visualization".to_string()],
        );
        assert!(prompt.contains("\"Data Analyst\" roadmap"));
        assert!(prompt.contains("- SQL Basics: 25.0% (1/4 correct)"));
        assert!(prompt.contains("Data Visualization"));
        assert!(!prompt.contains("{performance_lines}"));
    }
}
