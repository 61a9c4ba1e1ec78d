//! Instruction builders for the distortion-analysis model calls.
//!
//! The catalog is embedded verbatim so the model's classification
//! vocabulary stays closed to known names, and the expected JSON output
//! shape is spelled out at the end of every prompt.

use crate::catalog::DistortionCatalog;

/// Output contract for a simple (no-context) analysis.
const SIMPLE_FORMAT_INSTRUCTIONS: &str = r#"You MUST respond with valid JSON only. No markdown, no explanations outside JSON.

```json
{
  "cognitive_distortions_issue": [
    {
      "name": "Exact catalog name of the distortion",
      "explanation": "How this distortion shows up in my issue, in second person",
      "questions": ["Challenge questions adjusted to my issue"]
    }
  ]
}
```

Use only distortion names that appear in the catalog above. If no distortions are present, return an empty array for cognitive_distortions_issue."#;

/// Output contract for a context-augmented analysis.
const CONTEXT_FORMAT_INSTRUCTIONS: &str = r#"You MUST respond with valid JSON only. No markdown, no explanations outside JSON.

```json
{
  "cognitive_distortions_issue": [
    {
      "name": "Exact catalog name of the distortion",
      "explanation": "How this distortion shows up in my current issue, in second person",
      "questions": ["Challenge questions adjusted to my issue"]
    }
  ],
  "cognitive_distortions_context": [
    {
      "name": "Exact catalog name of the distortion",
      "explanation": "How this distortion shows up in my past journal entries, in second person",
      "questions": []
    }
  ],
  "comparison": "Situations or events that are similar between the context and the issue that seem to trigger these distortions, and overall themes"
}
```

Use only distortion names that appear in the catalog above. Return empty arrays when nothing is identified."#;

/// Build the instruction for a direct analysis of the user's issue.
pub fn simple_analysis_prompt(catalog: &DistortionCatalog, question: &str) -> String {
    format!(
        "You are a Cognitive Behavioral Therapist. You are assisting me with identifying \
negative thinking patterns or cognitive distortions that usually prevent me from seeing \
situations as they really are.\n\n\
The following is a JSON catalog of common cognitive distortions, their descriptions, and \
questions to help challenge them:\n\n{catalog_json}\n\n\
Your task is to:\n\n\
1. From the catalog above, identify the cognitive distortions present in my issue, \
providing an explanation of how each one relates to my issue.\n\n\
2. For each identified distortion, help me challenge it by adjusting its catalog \
questions to be relevant to my issue.\n\n\
Issue: {question}\n\n\
Your response should be directed in second person format, directed at me.\n\n\
{format_instructions}",
        catalog_json = catalog_json(catalog),
        question = question,
        format_instructions = SIMPLE_FORMAT_INSTRUCTIONS,
    )
}

/// Build the instruction for a context-augmented, comparative analysis.
///
/// The current issue and the historical context are delimited into
/// clearly labelled sections so the model can populate both result lists
/// and the comparison.
pub fn context_analysis_prompt(
    catalog: &DistortionCatalog,
    question: &str,
    context: &str,
) -> String {
    format!(
        "You are a Cognitive Behavioral Therapist. You are assisting me with identifying \
negative thinking patterns or cognitive distortions that usually prevent me from seeing \
situations as they really are.\n\n\
The following is a JSON catalog of common cognitive distortions and their descriptions:\n\n\
{catalog_json}\n\n\
The context below consists of my past journal entries.\n\n\
Your task is to:\n\n\
1. From the catalog above, identify the cognitive distortions present in my current \
issue, providing an explanation of how each one relates to the issue.\n\n\
2. Identify the cognitive distortions present in the context, providing an explanation \
of how each one relates to the context.\n\n\
3. Identify situations or events that are similar between the context and the issue \
that seem to trigger these cognitive distortions, as well as overall themes. Do not \
provide advice, simply state the similarities.\n\n\
=== CURRENT ISSUE ===\n{question}\n\n\
=== HISTORICAL CONTEXT ===\n{context}\n\n\
Your response should be directed in second person format, directed at me.\n\n\
{format_instructions}",
        catalog_json = catalog_json(catalog),
        question = question,
        context = context,
        format_instructions = CONTEXT_FORMAT_INSTRUCTIONS,
    )
}

fn catalog_json(catalog: &DistortionCatalog) -> String {
    serde_json::to_string_pretty(catalog.definitions()).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_prompt_enumerates_every_catalog_name() {
        let catalog = DistortionCatalog::embedded().unwrap();
        let prompt = simple_analysis_prompt(&catalog, "I failed my exam, I am a failure");
        for name in catalog.names() {
            assert!(prompt.contains(name), "prompt missing catalog name {name}");
        }
        assert!(prompt.contains("I failed my exam"));
        assert!(prompt.contains("valid JSON only"));
    }

    #[test]
    fn simple_prompt_is_deterministic() {
        let catalog = DistortionCatalog::embedded().unwrap();
        let a = simple_analysis_prompt(&catalog, "same question");
        let b = simple_analysis_prompt(&catalog, "same question");
        assert_eq!(a, b);
    }

    #[test]
    fn context_prompt_delimits_issue_and_context() {
        let catalog = DistortionCatalog::embedded().unwrap();
        let prompt = context_analysis_prompt(&catalog, "today's worry", "yesterday's entry");
        let issue_pos = prompt.find("=== CURRENT ISSUE ===").unwrap();
        let context_pos = prompt.find("=== HISTORICAL CONTEXT ===").unwrap();
        assert!(issue_pos < context_pos);
        assert!(prompt.contains("today's worry"));
        assert!(prompt.contains("yesterday's entry"));
        assert!(prompt.contains("cognitive_distortions_context"));
        assert!(prompt.contains("comparison"));
    }
}
