//! Domain types shared by the request handlers, the API and the session

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the four pre-draft questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextField {
    Audience,
    Intent,
    Concerns,
    Type,
}

impl ContextField {
    pub const ALL: [ContextField; 4] = [
        ContextField::Audience,
        ContextField::Intent,
        ContextField::Concerns,
        ContextField::Type,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextField::Audience => "audience",
            ContextField::Intent => "intent",
            ContextField::Concerns => "concerns",
            ContextField::Type => "type",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(tag.trim()))
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers to the pre-draft questions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub audience: String,
    pub intent: String,
    pub concerns: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Context {
    pub fn new(
        audience: impl Into<String>,
        intent: impl Into<String>,
        concerns: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            audience: audience.into(),
            intent: intent.into(),
            concerns: concerns.into(),
            kind: kind.into(),
        }
    }

    pub fn get(&self, field: ContextField) -> &str {
        match field {
            ContextField::Audience => &self.audience,
            ContextField::Intent => &self.intent,
            ContextField::Concerns => &self.concerns,
            ContextField::Type => &self.kind,
        }
    }

    pub fn set(&mut self, field: ContextField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContextField::Audience => self.audience = value,
            ContextField::Intent => self.intent = value,
            ContextField::Concerns => self.concerns = value,
            ContextField::Type => self.kind = value,
        }
    }

    /// Fields that are blank after trimming, in question order
    pub fn missing_fields(&self) -> Vec<ContextField> {
        ContextField::ALL
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }
}

/// Inclusive integer bounds for a score, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct AssessmentScale {
    pub min: u8,
    pub max: u8,
}

impl AssessmentScale {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: i64) -> bool {
        score >= i64::from(self.min) && score <= i64::from(self.max)
    }
}

impl Default for AssessmentScale {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

impl From<[u8; 2]> for AssessmentScale {
    fn from([min, max]: [u8; 2]) -> Self {
        Self { min, max }
    }
}

impl From<AssessmentScale> for [u8; 2] {
    fn from(scale: AssessmentScale) -> Self {
        [scale.min, scale.max]
    }
}

/// A single rateable statement derived from the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_from: Option<ContextField>,
    #[serde(default)]
    pub scale: AssessmentScale,
}

impl Criterion {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            extracted_from: None,
            scale: AssessmentScale::default(),
        }
    }
}

/// Models and clients sometimes send criterion ids as bare numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

/// Criterion id to score
pub type Scores = BTreeMap<String, u8>;

/// The user's own rating of every criterion
pub type SelfAssessment = Scores;

/// Validated model assessment of one draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAssessment {
    pub scores: Scores,
    pub reasoning: BTreeMap<String, String>,
    #[serde(default)]
    pub suggestions: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub quality_flags: Vec<String>,
}

/// What the assessment prompt needs from the previous iteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAssessment {
    pub scores: Scores,
    #[serde(default)]
    pub reasoning: BTreeMap<String, String>,
}

impl From<&AiAssessment> for PriorAssessment {
    fn from(assessment: &AiAssessment) -> Self {
        Self {
            scores: assessment.scores.clone(),
            reasoning: assessment.reasoning.clone(),
        }
    }
}

/// Everything needed to assess one draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessDraftRequest {
    pub draft: String,
    pub criteria: Vec<Criterion>,
    pub context: Context,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub criterion_notes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_assessment: Option<PriorAssessment>,
}

impl AssessDraftRequest {
    /// The scale every criterion uses, or `None` when they differ
    pub fn shared_scale(&self) -> Option<AssessmentScale> {
        let first = self.criteria.first()?.scale;
        self.criteria
            .iter()
            .all(|c| c.scale == first)
            .then_some(first)
    }
}
