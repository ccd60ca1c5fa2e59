//! Prompt templates for criteria extraction and draft assessment

use crate::config::{AppConfig, CriteriaLimits};
use crate::error::Result;
use crate::model::{AssessDraftRequest, AssessmentScale, Context};
use serde::Serialize;
use tera::Tera;

const CRITERIA_TEMPLATE: &str = "criteria";
const ASSESSMENT_TEMPLATE: &str = "assessment";

const CRITERIA_SOURCE: &str = r#"You are a writing coach helping someone get ready to write. From their answers below, extract {{ criteria_min }}-{{ criteria_max }} specific criteria they can use to judge whether their draft works.

**Audience:** {{ audience }}
**Intent (what the reader should think, feel or do):** {{ intent }}
**Concerns:** {{ concerns }}
**Writing type:** {{ writing_type }}

Each criterion must:
- Be specific enough to rate on a {{ scale_min }}-{{ scale_max }} scale
- Come from what the writer said matters, not from generic writing advice
- Cover both goals to reach and concerns to avoid
- Read as a statement to agree or disagree with (e.g., "The tone feels supportive, not condescending")

Respond with JSON only, no other text:
{
  "criteria": [
    {
      "id": "1",
      "description": "criterion statement",
      "extracted_from": "audience|intent|concerns|type"
    }
  ]
}"#;

const ASSESSMENT_SOURCE: &str = r#"You are a writing coach assessing a draft. Score how well it meets each criterion on {% if mixed_scales %}the scale listed next to it, where the lowest score means the criterion is not met at all and the highest means it is fully met{% else %}a {{ scale_min }}-{{ scale_max }} scale, where {{ scale_min }} means the criterion is not met at all and {{ scale_max }} means it is fully met{% endif %}.

**Context:**
- Audience: {{ audience }}
- Intent: {{ intent }}
- Concerns: {{ concerns }}
- Type: {{ writing_type }}

**Criteria to assess:**
{% for row in rows %}{{ loop.index }}. [ID: {{ row.id }}] {{ row.description }}{% if mixed_scales %} (scale {{ row.scale_min }}-{{ row.scale_max }}){% endif %}
{% if row.note %}   Writer's note on this criterion: {{ row.note }}
{% endif %}{% endfor %}
**Draft to assess:**
{{ draft }}
{% if has_previous %}
**Assessment of the previous revision:**
{% for row in rows %}{% if row.previous_score is number %}- [ID: {{ row.id }}] scored {{ row.previous_score }}{% if row.previous_reasoning %}: {{ row.previous_reasoning }}{% endif %}
{% endif %}{% endfor %}
Where a score changes, say in the reasoning what improved or regressed since the previous revision.
{% endif %}
For each criterion, provide:
- A score ({% if mixed_scales %}within that criterion's scale{% else %}{{ scale_min }}-{{ scale_max }}{% endif %})
- Brief reasoning (1-2 sentences citing specific passages from the draft)
- A suggestion: one question the writer can ask themselves to improve, or null if the criterion is fully met

Also list any quality flags about the draft as a whole (for example: it looks unfinished, or it does not match the stated type). Use an empty list when there are none.

Respond with JSON only, no other text:
{
  "scores": {"criterion_id": score_number},
  "reasoning": {"criterion_id": "explanation"},
  "suggestions": {"criterion_id": "question or null"},
  "qualityFlags": []
}"#;

#[derive(Debug, Serialize)]
struct CriterionRow<'a> {
    id: &'a str,
    description: &'a str,
    scale_min: u8,
    scale_max: u8,
    note: Option<&'a str>,
    previous_score: Option<u8>,
    previous_reasoning: Option<&'a str>,
}

/// Renders model instructions. Output is deterministic for the same input.
pub struct PromptBuilder {
    tera: Tera,
    scale: AssessmentScale,
    limits: CriteriaLimits,
}

impl PromptBuilder {
    pub fn new(scale: AssessmentScale, limits: CriteriaLimits) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(CRITERIA_TEMPLATE, CRITERIA_SOURCE)?;
        tera.add_raw_template(ASSESSMENT_TEMPLATE, ASSESSMENT_SOURCE)?;

        Ok(Self {
            tera,
            scale,
            limits,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.assessment_scale, config.criteria)
    }

    pub fn criteria_prompt(&self, context: &Context) -> Result<String> {
        let mut ctx = self.base_context(context);
        ctx.insert("criteria_min", &self.limits.min);
        ctx.insert("criteria_max", &self.limits.max);
        Ok(self.tera.render(CRITERIA_TEMPLATE, &ctx)?)
    }

    pub fn assessment_prompt(&self, request: &AssessDraftRequest) -> Result<String> {
        let previous = request.previous_assessment.as_ref();
        let rows: Vec<CriterionRow<'_>> = request
            .criteria
            .iter()
            .map(|c| CriterionRow {
                id: &c.id,
                description: &c.description,
                scale_min: c.scale.min,
                scale_max: c.scale.max,
                note: request
                    .criterion_notes
                    .get(&c.id)
                    .map(|n| n.trim())
                    .filter(|n| !n.is_empty()),
                previous_score: previous.and_then(|p| p.scores.get(&c.id).copied()),
                previous_reasoning: previous
                    .and_then(|p| p.reasoning.get(&c.id))
                    .map(String::as_str),
            })
            .collect();

        let shared = request.shared_scale();
        let mut ctx = self.base_context(&request.context);
        if let Some(scale) = shared {
            ctx.insert("scale_min", &scale.min);
            ctx.insert("scale_max", &scale.max);
        }
        ctx.insert("mixed_scales", &shared.is_none());
        ctx.insert("rows", &rows);
        ctx.insert("draft", request.draft.trim());
        ctx.insert("has_previous", &previous.is_some());
        Ok(self.tera.render(ASSESSMENT_TEMPLATE, &ctx)?)
    }

    fn base_context(&self, context: &Context) -> tera::Context {
        let mut ctx = tera::Context::new();
        ctx.insert("audience", context.audience.trim());
        ctx.insert("intent", context.intent.trim());
        ctx.insert("concerns", context.concerns.trim());
        ctx.insert("writing_type", context.kind.trim());
        ctx.insert("scale_min", &self.scale.min);
        ctx.insert("scale_max", &self.scale.max);
        ctx
    }
}
