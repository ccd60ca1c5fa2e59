//! Input and model-response validation
//!
//! Model output is untrusted: every shape is checked here before a typed
//! payload is built. Only `suggestions` and `qualityFlags` are lenient.

use crate::error::{Error, Result};
use crate::model::{AiAssessment, AssessmentScale, Context, ContextField, Criterion};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Validate caller-supplied context. Absent, non-string and blank fields are missing.
pub fn validate_context(context: Option<&Value>) -> Result<Context> {
    let Some(object) = context.and_then(Value::as_object) else {
        return Err(Error::IncompleteContext {
            missing: ContextField::ALL.to_vec(),
        });
    };

    let mut validated = Context::default();
    let mut missing = Vec::new();
    for field in ContextField::ALL {
        match object.get(field.as_str()).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => validated.set(field, value),
            _ => missing.push(field),
        }
    }

    if missing.is_empty() {
        Ok(validated)
    } else {
        Err(Error::IncompleteContext { missing })
    }
}

/// Validate a criteria-extraction response. The caller attaches the scale.
pub fn validate_criteria_response(parsed: &Value) -> Result<Vec<Criterion>> {
    let items = parsed
        .get("criteria")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidResponse("expected criteria array".to_string()))?;

    if items.is_empty() {
        return Err(Error::InvalidResponse(
            "no criteria extracted from context".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut criteria = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = non_empty_str(item.get("id"));
        let description = non_empty_str(item.get("description"));
        let (Some(id), Some(description)) = (id, description) else {
            return Err(Error::InvalidCriteriaResponse {
                index,
                reason: "missing id or description".to_string(),
            });
        };

        if !seen.insert(id.clone()) {
            return Err(Error::InvalidCriteriaResponse {
                index,
                reason: format!("duplicate id {id}"),
            });
        }

        let extracted_from = item
            .get("extracted_from")
            .and_then(Value::as_str)
            .and_then(ContextField::parse);

        criteria.push(Criterion {
            id,
            description,
            extracted_from,
            scale: AssessmentScale::default(),
        });
    }

    Ok(criteria)
}

/// Validate an assessment response against the criteria that were asked for.
/// Each score must fall within its own criterion's scale.
pub fn validate_assessment_response(parsed: &Value, criteria: &[Criterion]) -> Result<AiAssessment> {
    let (Some(scores), Some(reasoning)) = (
        parsed.get("scores").and_then(Value::as_object),
        parsed.get("reasoning").and_then(Value::as_object),
    ) else {
        return Err(Error::InvalidResponse(
            "expected scores and reasoning objects".to_string(),
        ));
    };

    let missing: Vec<String> = criteria
        .iter()
        .filter(|c| !scores.contains_key(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompleteAssessment { missing });
    }

    let mut validated_scores = BTreeMap::new();
    for Criterion { id, scale, .. } in criteria {
        let value = &scores[id.as_str()];
        let score = value
            .as_i64()
            .filter(|s| scale.contains(*s))
            .and_then(|s| u8::try_from(s).ok())
            .ok_or_else(|| Error::InvalidScore {
                id: id.clone(),
                value: value.to_string(),
            })?;
        validated_scores.insert(id.clone(), score);
    }

    let reasoning = reasoning
        .iter()
        .filter_map(|(id, text)| text.as_str().map(|t| (id.clone(), t.to_string())))
        .collect();

    Ok(AiAssessment {
        scores: validated_scores,
        reasoning,
        suggestions: lenient_suggestions(parsed.get("suggestions")),
        quality_flags: lenient_quality_flags(parsed.get("qualityFlags")),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_suggestions(value: Option<&Value>) -> BTreeMap<String, Option<String>> {
    let Some(map) = value.and_then(Value::as_object) else {
        if value.is_some_and(|v| !v.is_null()) {
            tracing::warn!("Ignoring malformed suggestions in assessment response");
        }
        return BTreeMap::new();
    };
    suggestions_from_map(map)
}

fn suggestions_from_map(map: &Map<String, Value>) -> BTreeMap<String, Option<String>> {
    map.iter()
        .filter_map(|(id, suggestion)| match suggestion {
            Value::String(s) => Some((id.clone(), Some(s.clone()))),
            Value::Null => Some((id.clone(), None)),
            _ => None,
        })
        .collect()
}

fn lenient_quality_flags(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|flags| {
            flags
                .iter()
                .filter_map(Value::as_str)
                .filter(|f| !f.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn expected(list: &[&str]) -> Vec<Criterion> {
        list.iter().map(|id| Criterion::new(*id, "criterion")).collect()
    }

    #[test]
    fn test_context_reports_exact_missing_fields() {
        let err = validate_context(Some(&json!({
            "audience": "my manager",
            "intent": "   ",
            "type": 7
        })))
        .unwrap_err();

        match err {
            Error::IncompleteContext { missing } => assert_eq!(
                missing,
                vec![ContextField::Intent, ContextField::Concerns, ContextField::Type]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_absent_context_is_missing_everything() {
        for context in [None, Some(&json!("email")), Some(&Value::Null)] {
            match validate_context(context) {
                Err(Error::IncompleteContext { missing }) => assert_eq!(missing.len(), 4),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_valid_context() {
        let context = validate_context(Some(&json!({
            "audience": "my manager",
            "intent": "approve budget",
            "concerns": "sounding pushy",
            "type": "email"
        })))
        .unwrap();
        assert_eq!(context.kind, "email");
    }

    #[test]
    fn test_criteria_response_requires_non_empty_array() {
        assert!(matches!(
            validate_criteria_response(&json!({"criteria": []})),
            Err(Error::InvalidResponse(_))
        ));
        assert!(matches!(
            validate_criteria_response(&json!({"items": [1]})),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_criteria_response_reports_bad_index() {
        let parsed = json!({"criteria": [
            {"id": "1", "description": "The ask is explicit"},
            {"id": "2", "description": ""}
        ]});
        match validate_criteria_response(&parsed) {
            Err(Error::InvalidCriteriaResponse { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_criteria_response_rejects_duplicate_ids() {
        let parsed = json!({"criteria": [
            {"id": "1", "description": "a"},
            {"id": "1", "description": "b"}
        ]});
        assert!(matches!(
            validate_criteria_response(&parsed),
            Err(Error::InvalidCriteriaResponse { index: 1, .. })
        ));
    }

    #[test]
    fn test_criteria_response_parses_tags() {
        let parsed = json!({"criteria": [
            {"id": 1, "description": "a", "extracted_from": "intent"},
            {"id": "2", "description": "b", "extracted_from": "audience|intent"}
        ]});
        let criteria = validate_criteria_response(&parsed).unwrap();
        assert_eq!(criteria[0].id, "1");
        assert_eq!(criteria[0].extracted_from, Some(ContextField::Intent));
        assert_eq!(criteria[1].extracted_from, None);
    }

    #[test]
    fn test_assessment_missing_scores_fail_without_partial_result() {
        let parsed = json!({
            "scores": {"c1": 4},
            "reasoning": {"c1": "Clear ask"}
        });
        match validate_assessment_response(&parsed, &expected(&["c1", "c2", "c3"])) {
            Err(Error::IncompleteAssessment { missing }) => assert_eq!(missing, ids(&["c2", "c3"])),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_assessment_requires_objects() {
        let parsed = json!({"scores": {"c1": 4}, "reasoning": "fine"});
        assert!(matches!(
            validate_assessment_response(&parsed, &expected(&["c1"])),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_assessment_rejects_out_of_scale_scores() {
        for bad in [json!(6), json!(0), json!(3.5), json!("4"), Value::Null] {
            let parsed = json!({"scores": {"c1": bad}, "reasoning": {}});
            assert!(matches!(
                validate_assessment_response(&parsed, &expected(&["c1"])),
                Err(Error::InvalidScore { .. })
            ));
        }
    }

    #[test]
    fn test_assessment_uses_each_criterion_scale() {
        let mut criteria = expected(&["c1", "c2"]);
        criteria[0].scale = AssessmentScale::new(1, 7);

        let parsed = json!({"scores": {"c1": 6, "c2": 5}, "reasoning": {}});
        let assessment = validate_assessment_response(&parsed, &criteria).unwrap();
        assert_eq!(assessment.scores["c1"], 6);

        let parsed = json!({"scores": {"c1": 6, "c2": 6}, "reasoning": {}});
        match validate_assessment_response(&parsed, &criteria) {
            Err(Error::InvalidScore { id, value }) => {
                assert_eq!(id, "c2");
                assert_eq!(value, "6");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields_default_leniently() {
        let parsed = json!({
            "scores": {"c1": 2, "extra": 9},
            "reasoning": {"c1": "Buried ask", "c2": 5},
            "suggestions": ["not", "a", "map"],
            "qualityFlags": "not a list"
        });
        let assessment =
            validate_assessment_response(&parsed, &expected(&["c1"]))
                .unwrap();

        assert_eq!(assessment.scores.len(), 1);
        assert_eq!(assessment.reasoning.len(), 1);
        assert!(assessment.suggestions.is_empty());
        assert!(assessment.quality_flags.is_empty());
    }

    #[test]
    fn test_suggestions_and_flags_are_filtered() {
        let parsed = json!({
            "scores": {"c1": 5, "c2": 1},
            "reasoning": {"c1": "a", "c2": "b"},
            "suggestions": {"c1": null, "c2": "What does Sam need to say yes?", "c3": 4},
            "qualityFlags": ["", "   ", "Draft ends mid-sentence", 3]
        });
        let assessment =
            validate_assessment_response(&parsed, &expected(&["c1", "c2"]))
                .unwrap();

        assert_eq!(assessment.suggestions.get("c1"), Some(&None));
        assert_eq!(
            assessment.suggestions.get("c2"),
            Some(&Some("What does Sam need to say yes?".to_string()))
        );
        assert!(!assessment.suggestions.contains_key("c3"));
        assert_eq!(assessment.quality_flags, vec!["Draft ends mid-sentence"]);
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let parsed = json!({
            "scores": {"c1": 3, "c2": 4},
            "reasoning": {"c1": "a", "c2": "b"},
            "suggestions": {"c1": "Why?", "c2": null},
            "qualityFlags": ["short"]
        });
        let criteria = expected(&["c1", "c2"]);

        let first = validate_assessment_response(&parsed, &criteria).unwrap();
        let reparsed = serde_json::to_value(&first).unwrap();
        let second = validate_assessment_response(&reparsed, &criteria).unwrap();
        assert_eq!(first, second);
    }
}
