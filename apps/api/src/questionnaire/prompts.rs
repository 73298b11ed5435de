// Prompt constants for questionnaire synthesis.

/// MCQ generation prompt. Replace `{phase_number}`, `{milestone_id}`,
/// `{subtopic_id}`, `{subtopic_name}`, `{topics}`, `{career}`, and
/// `{created_at}` before sending.
pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"Generate MCQ-based questions covering all topics in the given subtopic.

**Input Structure:**
- phase_number: {phase_number}
- milestone_id: {milestone_id}
- subtopic_id: {subtopic_id}
- subtopic_name: {subtopic_name}
- topics: {topics}

**Requirements:**
1. Cover **all topics** with MCQs
2. **Difficulty distribution**: 50% easy, 30% medium, 20% hard
3. **Minimum questions needed** to cover all topics (avoid overwhelming users)
4. Each MCQ must include:
   - `question`: Clear, specific question text
   - `options`: 3-5 choices keyed "1", "2", ...
   - `answer`: Correct option key (exact match from options)
   - `topic_label`: Source topic from input
   - `difficulty`: "easy", "medium", or "hard"

**Output Format:**
{
    "phase_number": {phase_number},
    "milestone_id": "{milestone_id}",
    "subtopic_id": "{subtopic_id}",
    "subtopic_name": "{subtopic_name}",
    "career_title": "{career}",
    "created_at": "{created_at}",
    "mcqs": [
        {
            "question": "...",
            "options": {
                "1": "...",
                "2": "...",
                "3": "...",
                "4": "..."
            },
            "answer": "1",
            "topic_label": "...",
            "difficulty": "easy"
        }
    ]
}

**Output valid JSON only. No explanations.**"#;

pub struct QuestionPromptParams<'a> {
    pub phase_number: u32,
    pub milestone_id: &'a str,
    pub subtopic_id: &'a str,
    pub subtopic_name: &'a str,
    pub topics: &'a [String],
    pub career: &'a str,
    pub created_at: &'a str,
}

pub fn build_question_prompt(params: &QuestionPromptParams<'_>) -> String {
    QUESTION_SET_PROMPT_TEMPLATE
        .replace("{phase_number}", &params.phase_number.to_string())
        .replace("{milestone_id}", params.milestone_id)
        .replace("{subtopic_id}", params.subtopic_id)
        .replace("{subtopic_name}", params.subtopic_name)
        .replace("{topics}", &format!("{:?}", params.topics))
        .replace("{career}", params.career)
        .replace("{created_at}", params.created_at)
}
