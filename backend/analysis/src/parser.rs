//! Defensive parsing of model output into the fixed result schema.
//!
//! Models wrap JSON in markdown fences, prepend prose, or emit curly
//! quotes. The extractor peels those away; the parse step then validates
//! field shapes and enriches issue items with catalog question lists.
//! Anything unrecoverable is a `ReframeError::Parse`; nothing is
//! fabricated on the caller's behalf.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use reframe_core::{AnalysisResult, IdentifiedDistortion, ReframeError};

use crate::catalog::DistortionCatalog;

/// Fallback used when context-mode output carries no comparison.
pub const NO_COMPARISON_FALLBACK: &str = "No comparison available.";

static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Model-shaped item before validation/enrichment.
#[derive(Debug, Deserialize)]
struct RawDistortion {
    name: String,
    explanation: String,
    #[serde(default)]
    questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawSimpleAnalysis {
    cognitive_distortions_issue: Vec<RawDistortion>,
}

#[derive(Debug, Deserialize)]
struct RawContextAnalysis {
    #[serde(default)]
    cognitive_distortions_issue: Vec<RawDistortion>,
    cognitive_distortions_context: Vec<RawDistortion>,
    #[serde(default)]
    comparison: Option<String>,
}

/// Locate the JSON payload inside raw model text.
///
/// Order of attempts: fenced ```json block, then the outermost `{...}`
/// span, then the trimmed text itself. Curly quotes are normalized to
/// straight quotes in all cases.
pub fn extract_json_payload(raw: &str) -> String {
    let trimmed = raw.trim();

    let candidate = if let Some(caps) = JSON_FENCE_RE.captures(trimmed) {
        caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed)
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end { &trimmed[start..=end] } else { trimmed }
    } else {
        trimmed
    };

    candidate.replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Parse simple-mode model output into an `AnalysisResult`.
pub fn parse_simple_analysis(
    raw: &str,
    catalog: &DistortionCatalog,
) -> Result<AnalysisResult, ReframeError> {
    let payload = extract_json_payload(raw);
    let parsed: RawSimpleAnalysis = serde_json::from_str(&payload).map_err(|e| {
        warn!(error = %e, payload = %truncate(&payload, 200), "Simple analysis JSON parse failed");
        ReframeError::Parse(format!("model output is not a valid analysis: {e}"))
    })?;

    Ok(AnalysisResult {
        cognitive_distortions_issue: enrich_issue_items(parsed.cognitive_distortions_issue, catalog),
        cognitive_distortions_context: None,
        comparison: None,
    })
}

/// Parse context-mode model output into an `AnalysisResult`.
pub fn parse_context_analysis(
    raw: &str,
    catalog: &DistortionCatalog,
) -> Result<AnalysisResult, ReframeError> {
    let payload = extract_json_payload(raw);
    let parsed: RawContextAnalysis = serde_json::from_str(&payload).map_err(|e| {
        warn!(error = %e, payload = %truncate(&payload, 200), "Context analysis JSON parse failed");
        ReframeError::Parse(format!("model output is not a valid comparative analysis: {e}"))
    })?;

    let context_items = parsed
        .cognitive_distortions_context
        .into_iter()
        .filter(|d| is_usable(d))
        .map(|d| IdentifiedDistortion {
            name: d.name,
            explanation: d.explanation,
            questions: d.questions.unwrap_or_default(),
        })
        .collect();

    let comparison = parsed
        .comparison
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| NO_COMPARISON_FALLBACK.to_string());

    Ok(AnalysisResult {
        cognitive_distortions_issue: enrich_issue_items(parsed.cognitive_distortions_issue, catalog),
        cognitive_distortions_context: Some(context_items),
        comparison: Some(comparison),
    })
}

/// Drop unusable items and attach catalog question lists by name match.
///
/// A name present in the catalog carries that catalog's questions;
/// unmatched names pass through with an empty list.
fn enrich_issue_items(
    items: Vec<RawDistortion>,
    catalog: &DistortionCatalog,
) -> Vec<IdentifiedDistortion> {
    items
        .into_iter()
        .filter(|d| is_usable(d))
        .map(|d| {
            let questions = catalog
                .find(&d.name)
                .map(|definition| definition.questions.clone())
                .unwrap_or_default();
            IdentifiedDistortion {
                name: d.name,
                explanation: d.explanation,
                questions,
            }
        })
        .collect()
}

fn is_usable(item: &RawDistortion) -> bool {
    let usable = !item.name.trim().is_empty() && !item.explanation.trim().is_empty();
    if !usable {
        warn!(name = %item.name, "Dropping distortion item with empty fields");
    }
    usable
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DistortionCatalog {
        DistortionCatalog::embedded().unwrap()
    }

    #[test]
    fn extracts_clean_json_unchanged() {
        let input = r#"{"cognitive_distortions_issue": []}"#;
        assert_eq!(extract_json_payload(input), input);
    }

    #[test]
    fn extracts_from_json_fence() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(input), r#"{"a": 1}"#);
    }

    #[test]
    fn extracts_from_bare_fence() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(input), r#"{"a": 1}"#);
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let input = "Here is your analysis:\n{\"a\": 1}\nHope this helps!";
        assert_eq!(extract_json_payload(input), r#"{"a": 1}"#);
    }

    #[test]
    fn normalizes_curly_quotes() {
        let input = "{\u{201C}a\u{201D}: 1}";
        assert_eq!(extract_json_payload(input), r#"{"a": 1}"#);
    }

    #[test]
    fn simple_parse_attaches_catalog_questions() {
        let raw = r#"{
            "cognitive_distortions_issue": [
                {"name": "Catastrophising", "explanation": "You treat one setback as a disaster.", "questions": null}
            ]
        }"#;
        let result = parse_simple_analysis(raw, &catalog()).unwrap();
        assert_eq!(result.cognitive_distortions_issue.len(), 1);
        let item = &result.cognitive_distortions_issue[0];
        assert_eq!(item.name, "Catastrophising");
        assert!(!item.questions.is_empty());
        assert!(result.cognitive_distortions_context.is_none());
        assert!(result.comparison.is_none());
    }

    #[test]
    fn unmatched_name_passes_through_with_empty_questions() {
        let raw = r#"{
            "cognitive_distortions_issue": [
                {"name": "Doom Spiral", "explanation": "Not a catalog name.", "questions": ["model question"]}
            ]
        }"#;
        let result = parse_simple_analysis(raw, &catalog()).unwrap();
        let item = &result.cognitive_distortions_issue[0];
        assert_eq!(item.name, "Doom Spiral");
        assert!(item.questions.is_empty());
    }

    #[test]
    fn malformed_output_is_a_parse_error() {
        let err = parse_simple_analysis("the model rambled with no json at all", &catalog())
            .unwrap_err();
        assert!(matches!(err, ReframeError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let err = parse_simple_analysis(r#"{"cognitive_distortions_issue": "not-a-list"}"#, &catalog())
            .unwrap_err();
        assert!(matches!(err, ReframeError::Parse(_)));
    }

    #[test]
    fn items_with_empty_fields_are_dropped_not_fatal() {
        let raw = r#"{
            "cognitive_distortions_issue": [
                {"name": "", "explanation": "missing name"},
                {"name": "Labelling", "explanation": "You call yourself a failure."}
            ]
        }"#;
        let result = parse_simple_analysis(raw, &catalog()).unwrap();
        assert_eq!(result.cognitive_distortions_issue.len(), 1);
        assert_eq!(result.cognitive_distortions_issue[0].name, "Labelling");
    }

    #[test]
    fn context_parse_fills_comparison_fallback() {
        let raw = r#"{
            "cognitive_distortions_issue": [],
            "cognitive_distortions_context": [
                {"name": "Overgeneralisation", "explanation": "Your past entries repeat 'always'."}
            ]
        }"#;
        let result = parse_context_analysis(raw, &catalog()).unwrap();
        assert_eq!(result.comparison.as_deref(), Some(NO_COMPARISON_FALLBACK));
        let context = result.cognitive_distortions_context.unwrap();
        assert_eq!(context.len(), 1);
        assert!(context[0].questions.is_empty());
    }

    #[test]
    fn context_parse_keeps_model_comparison() {
        let raw = r#"```json
        {
            "cognitive_distortions_issue": [
                {"name": "Mind Reading", "explanation": "You assume your colleague disapproves."}
            ],
            "cognitive_distortions_context": [],
            "comparison": "Both involve work presentations."
        }
        ```"#;
        let result = parse_context_analysis(raw, &catalog()).unwrap();
        assert_eq!(result.comparison.as_deref(), Some("Both involve work presentations."));
        assert!(!result.cognitive_distortions_issue[0].questions.is_empty());
    }

    #[test]
    fn context_parse_requires_context_list() {
        let raw = r#"{"cognitive_distortions_issue": []}"#;
        assert!(matches!(
            parse_context_analysis(raw, &catalog()).unwrap_err(),
            ReframeError::Parse(_)
        ));
    }
}
