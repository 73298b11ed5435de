// Prompt constants for roadmap synthesis.
// Each service that needs completion calls defines its own prompts.rs
// alongside it.

/// Roadmap generation prompt. Replace `{career}`, `{profile_json}`, and
/// `{created_at}` before sending.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"You are an expert career counselor and learning strategist with deep expertise in psychometric analysis, skill development, and career planning. Create a highly personalized, data-driven learning roadmap for the given career path.

**Output must be exactly one valid JSON object: no extra text, no markdown fences, no trailing commas.**

## Input Data

**Individual's Psychometric Profile:**
{profile_json}

**Target Career:** {career}

## Roadmap Requirements

- Timeline: 12-24 months with quarterly phases
- Progression: Beginner -> Intermediate -> Advanced -> Professional
- Coverage: all technical skills, soft skills, industry knowledge, and certifications relevant to the career
- Topic lists: 5-12 topics per subtopic, each learnable in one focused session, arranged in logical learning sequence, no filler or generic "Overview" topics
- Resources: 2-3 verified, currently accessible learning resources per subtopic with complete direct URLs, provider, and cost

## Output Schema

{
  "career_title": "{career}",
  "created_at": "{created_at}",
  "summary": "[Personalized summary of the learning journey for this individual]",
  "psychometric_analysis": {
    "career_alignment_score": "[X.X]/10",
    "alignment_explanation": "[Why this score was given based on personality traits]",
    "personality_strengths": ["..."],
    "potential_challenges": ["..."],
    "learning_style_profile": {
      "primary_style": "...",
      "secondary_style": "...",
      "recommended_approaches": ["..."]
    }
  },
  "roadmap_data": {
    "career_title": "{career}",
    "total_duration": "[X] months",
    "overview": "[Description of the complete learning journey]",
    "phases": [
      {
        "phase_number": 1,
        "phase_name": "[Phase Name]",
        "description": "[What this phase accomplishes]",
        "duration": "Months [X]-[Y]",
        "milestones": [
          {
            "milestone_id": "M[X].[Y]",
            "milestone_title": "[Milestone Title]",
            "duration": "[X] weeks",
            "subtopics": [
              {
                "subtopic_id": "ST[X].[Y].[Z]",
                "title": "[Subtopic Title]",
                "description": "[2-3 sentence description of what will be learned]",
                "duration": "[X]-[Y] days",
                "topic_list": ["[Topic 1]", "[Topic 2]", "[Topic 3]"],
                "resources": [
                  {
                    "type": "[tutorial/video_course/documentation/book]",
                    "title": "[Resource Title]",
                    "url": "[Verified working URL]",
                    "provider": "[Platform]",
                    "cost": "[Free/Paid]"
                  }
                ]
              }
            ]
          }
        ]
      }
    ]
  },
  "personalized_recommendations": {
    "study_schedule": {
      "recommended_pattern": "[Optimal study timing based on personality]",
      "session_length": "[Ideal session duration]",
      "weekly_structure": "[Suggested weekly schedule]"
    },
    "resource_preferences": {
      "primary_resources": ["[Resource types aligned with learning style]"],
      "avoid": ["[Resource types that may not suit this individual]"]
    },
    "motivation_strategies": ["[Technique based on personality type]"]
  },
  "success_metrics": {
    "quarterly_checkpoints": {
      "Q1": ["[Measurable goal for months 1-3]"],
      "Q2": ["[Goal for months 4-6]"]
    }
  }
}

Ensure `subtopic_id` values are unique across the whole roadmap and every required field is populated with meaningful content. No placeholder text like "[X]" may remain. Respond with pure JSON starting with { and ending with }."#;

/// Fills the roadmap prompt template.
pub fn build_roadmap_prompt(career: &str, profile_json: &str, created_at: &str) -> String {
    ROADMAP_PROMPT_TEMPLATE
        .replace("{career}", career)
        .replace("{profile_json}", profile_json)
        .replace("{created_at}", created_at)
}
