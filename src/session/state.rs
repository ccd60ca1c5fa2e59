//! Session state machine implementation
//!
//! `Session` is a plain serializable value. Every transition is a method that
//! either rejects the input with a [`SessionError`] or mutates the session and
//! returns the [`Effect`] the caller has to run next.

use crate::error::join_fields;
use crate::model::{
    AiAssessment, AssessDraftRequest, Context, ContextField, Criterion, PriorAssessment,
    SelfAssessment,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Where the session stands, derived from its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingContext,
    AwaitingFirstDraft,
    AwaitingSelfAssessment,
    AwaitingAiAssessment,
    ReadyForNextIteration,
}

/// Only the first iteration collects a self-assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IterationKind {
    First {
        self_assessment: Option<SelfAssessment>,
    },
    Subsequent,
}

/// One draft and its assessments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    pub id: u32,
    pub draft: String,
    pub kind: IterationKind,
    pub ai_assessment: Option<AiAssessment>,
    pub submitted_at: DateTime<Utc>,
}

impl Iteration {
    pub fn self_assessment(&self) -> Option<&SelfAssessment> {
        match &self.kind {
            IterationKind::First { self_assessment } => self_assessment.as_ref(),
            IterationKind::Subsequent => None,
        }
    }

    pub fn needs_self_assessment(&self) -> bool {
        matches!(
            self.kind,
            IterationKind::First {
                self_assessment: None
            }
        )
    }

    pub fn is_assessed(&self) -> bool {
        self.ai_assessment.is_some()
    }
}

/// Request the caller must issue after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    ExtractCriteria(Context),
    AssessDraft {
        iteration_id: u32,
        request: AssessDraftRequest,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Context can no longer be edited once criteria exist")]
    ContextLocked,

    #[error("Missing required context fields: {}", join_fields(.missing))]
    IncompleteContext { missing: Vec<ContextField> },

    #[error("Criteria have not been extracted yet")]
    CriteriaNotReady,

    #[error("Criteria extraction returned no criteria")]
    NoCriteria,

    #[error("Draft is required and must be non-empty")]
    EmptyDraft,

    #[error("Iteration {0} is still awaiting assessment")]
    IterationInFlight(u32),

    #[error("Iteration {0} does not exist")]
    NoSuchIteration(u32),

    #[error("Iteration {0} is not awaiting a self-assessment")]
    NotAwaitingSelfAssessment(u32),

    #[error("Missing self-assessment scores for: {}", .0.join(", "))]
    IncompleteSelfAssessment(Vec<String>),

    #[error("Score {score} for criterion {id} is out of range")]
    ScoreOutOfRange { id: String, score: u8 },

    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),

    #[error("Assessment for iteration {0} arrived while it was not in flight")]
    StaleAssessment(u32),

    #[error("Assessment is missing scores for: {}", .0.join(", "))]
    IncompleteAssessment(Vec<String>),
}

/// A writing session: context, criteria, notes and the iteration history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    context: Context,
    criteria: Vec<Criterion>,
    criterion_notes: BTreeMap<String, String>,
    iterations: Vec<Iteration>,
    working_draft: String,
    in_flight: Option<u32>,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn criterion_notes(&self) -> &BTreeMap<String, String> {
        &self.criterion_notes
    }

    pub fn iterations(&self) -> &[Iteration] {
        &self.iterations
    }

    pub fn iteration(&self, id: u32) -> Option<&Iteration> {
        self.iterations.iter().find(|i| i.id == id)
    }

    pub fn latest_iteration(&self) -> Option<&Iteration> {
        self.iterations.last()
    }

    /// Last draft that came back assessed; seeds the next revision
    pub fn working_draft(&self) -> &str {
        &self.working_draft
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    pub fn editor_disabled(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if !self.has_criteria() {
            return Phase::AwaitingContext;
        }

        match self.in_flight.and_then(|id| self.iteration(id)) {
            Some(iteration) if iteration.needs_self_assessment() => Phase::AwaitingSelfAssessment,
            Some(_) => Phase::AwaitingAiAssessment,
            None if self.iterations.is_empty() => Phase::AwaitingFirstDraft,
            None => Phase::ReadyForNextIteration,
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn update_context(&mut self, context: Context) -> Result<(), SessionError> {
        if self.has_criteria() {
            return Err(SessionError::ContextLocked);
        }
        self.context = context;
        Ok(())
    }

    pub fn submit_context(&mut self) -> Result<Effect, SessionError> {
        if self.has_criteria() {
            return Err(SessionError::ContextLocked);
        }

        let missing = self.context.missing_fields();
        if !missing.is_empty() {
            return Err(SessionError::IncompleteContext { missing });
        }

        self.error = None;
        Ok(Effect::ExtractCriteria(self.context.clone()))
    }

    pub fn criteria_extracted(&mut self, criteria: Vec<Criterion>) -> Result<(), SessionError> {
        if self.has_criteria() {
            return Err(SessionError::ContextLocked);
        }
        if criteria.is_empty() {
            return Err(SessionError::NoCriteria);
        }

        self.criteria = criteria;
        self.error = None;
        Ok(())
    }

    /// Record a failed request. Nothing else changes.
    pub fn request_failed(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn submit_draft(&mut self, draft: &str) -> Result<Effect, SessionError> {
        if !self.has_criteria() {
            return Err(SessionError::CriteriaNotReady);
        }
        if let Some(id) = self.in_flight {
            return Err(SessionError::IterationInFlight(id));
        }
        if draft.trim().is_empty() {
            return Err(SessionError::EmptyDraft);
        }

        let id = self.iterations.len() as u32 + 1;
        let previous = self
            .iterations
            .last()
            .and_then(|i| i.ai_assessment.as_ref())
            .map(PriorAssessment::from);
        let kind = if self.iterations.is_empty() {
            IterationKind::First {
                self_assessment: None,
            }
        } else {
            IterationKind::Subsequent
        };

        self.iterations.push(Iteration {
            id,
            draft: draft.to_string(),
            kind: kind.clone(),
            ai_assessment: None,
            submitted_at: Utc::now(),
        });
        self.in_flight = Some(id);
        self.error = None;

        match kind {
            IterationKind::First { .. } => Ok(Effect::None),
            IterationKind::Subsequent => Ok(Effect::AssessDraft {
                iteration_id: id,
                request: self.assess_request(draft, previous),
            }),
        }
    }

    pub fn submit_self_assessment(
        &mut self,
        iteration_id: u32,
        scores: SelfAssessment,
    ) -> Result<Effect, SessionError> {
        if self.in_flight != Some(iteration_id) {
            return Err(SessionError::NotAwaitingSelfAssessment(iteration_id));
        }
        self.check_self_assessment(&scores)?;

        let iteration = self
            .iterations
            .iter_mut()
            .find(|i| i.id == iteration_id)
            .ok_or(SessionError::NoSuchIteration(iteration_id))?;
        if !iteration.needs_self_assessment() {
            return Err(SessionError::NotAwaitingSelfAssessment(iteration_id));
        }

        iteration.kind = IterationKind::First {
            self_assessment: Some(scores),
        };
        let draft = iteration.draft.clone();
        self.error = None;

        Ok(Effect::AssessDraft {
            iteration_id,
            request: self.assess_request(&draft, None),
        })
    }

    pub fn assessment_received(
        &mut self,
        iteration_id: u32,
        assessment: AiAssessment,
    ) -> Result<(), SessionError> {
        if self.in_flight != Some(iteration_id) {
            return Err(SessionError::StaleAssessment(iteration_id));
        }

        let missing: Vec<String> = self
            .criteria
            .iter()
            .filter(|c| !assessment.scores.contains_key(&c.id))
            .map(|c| c.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SessionError::IncompleteAssessment(missing));
        }

        let iteration = self
            .iterations
            .iter_mut()
            .find(|i| i.id == iteration_id)
            .ok_or(SessionError::NoSuchIteration(iteration_id))?;
        iteration.ai_assessment = Some(assessment);
        self.working_draft = iteration.draft.clone();
        self.in_flight = None;
        self.error = None;
        Ok(())
    }

    /// The in-flight slot is released; the draft and self-assessment stay.
    pub fn assessment_failed(
        &mut self,
        iteration_id: u32,
        message: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.in_flight != Some(iteration_id) {
            return Err(SessionError::StaleAssessment(iteration_id));
        }
        self.in_flight = None;
        self.error = Some(message.into());
        Ok(())
    }

    /// Blank text removes the note
    pub fn set_note(&mut self, criterion_id: &str, note: &str) -> Result<(), SessionError> {
        if !self.criteria.iter().any(|c| c.id == criterion_id) {
            return Err(SessionError::UnknownCriterion(criterion_id.to_string()));
        }

        let note = note.trim();
        if note.is_empty() {
            self.criterion_notes.remove(criterion_id);
        } else {
            self.criterion_notes
                .insert(criterion_id.to_string(), note.to_string());
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn check_self_assessment(&self, scores: &SelfAssessment) -> Result<(), SessionError> {
        if let Some(unknown) = scores
            .keys()
            .find(|id| !self.criteria.iter().any(|c| &c.id == *id))
        {
            return Err(SessionError::UnknownCriterion(unknown.clone()));
        }

        let mut missing = Vec::new();
        for criterion in &self.criteria {
            match scores.get(&criterion.id) {
                None => missing.push(criterion.id.clone()),
                Some(&score) if !criterion.scale.contains(i64::from(score)) => {
                    return Err(SessionError::ScoreOutOfRange {
                        id: criterion.id.clone(),
                        score,
                    });
                }
                Some(_) => {}
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SessionError::IncompleteSelfAssessment(missing))
        }
    }

    fn assess_request(&self, draft: &str, previous: Option<PriorAssessment>) -> AssessDraftRequest {
        AssessDraftRequest {
            draft: draft.to_string(),
            criteria: self.criteria.clone(),
            context: self.context.clone(),
            criterion_notes: self.criterion_notes.clone(),
            previous_assessment: previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, u8)]) -> BTreeMap<String, u8> {
        pairs.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    fn assessment(pairs: &[(&str, u8)]) -> AiAssessment {
        AiAssessment {
            scores: scores(pairs),
            reasoning: pairs
                .iter()
                .map(|(id, s)| (id.to_string(), format!("scored {s}")))
                .collect(),
            ..Default::default()
        }
    }

    fn ready_session() -> Session {
        let mut session = Session::new();
        session
            .update_context(Context::new(
                "my manager",
                "approve budget",
                "sounding pushy",
                "email",
            ))
            .unwrap();
        assert!(matches!(
            session.submit_context().unwrap(),
            Effect::ExtractCriteria(_)
        ));
        session
            .criteria_extracted(vec![
                Criterion::new("c1", "The ask is explicit"),
                Criterion::new("c2", "The tone is not pushy"),
            ])
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_awaits_context() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::AwaitingContext);
        assert!(!session.editor_disabled());
        assert!(!session.has_criteria());
    }

    #[test]
    fn test_incomplete_context_is_rejected_without_effect() {
        let mut session = Session::new();
        session
            .update_context(Context::new("my manager", "", "x", ""))
            .unwrap();
        assert_eq!(
            session.submit_context(),
            Err(SessionError::IncompleteContext {
                missing: vec![ContextField::Intent, ContextField::Type]
            })
        );
        assert_eq!(session.phase(), Phase::AwaitingContext);
    }

    #[test]
    fn test_failed_extraction_keeps_context_editable() {
        let mut session = Session::new();
        session
            .update_context(Context::new("a", "b", "c", "d"))
            .unwrap();
        session.submit_context().unwrap();
        session.request_failed("Failed to extract criteria");

        assert_eq!(session.phase(), Phase::AwaitingContext);
        assert_eq!(session.error(), Some("Failed to extract criteria"));
        assert!(session
            .update_context(Context::new("a2", "b", "c", "d"))
            .is_ok());
    }

    #[test]
    fn test_context_locked_after_criteria() {
        let mut session = ready_session();
        assert_eq!(session.phase(), Phase::AwaitingFirstDraft);
        assert_eq!(
            session.update_context(Context::default()),
            Err(SessionError::ContextLocked)
        );
    }

    #[test]
    fn test_first_draft_waits_for_self_assessment() {
        let mut session = ready_session();
        assert_eq!(session.submit_draft("Hi Sam").unwrap(), Effect::None);
        assert_eq!(session.phase(), Phase::AwaitingSelfAssessment);
        assert_eq!(session.in_flight(), Some(1));
        assert!(session.editor_disabled());
        assert_eq!(
            session.submit_draft("another"),
            Err(SessionError::IterationInFlight(1))
        );
    }

    #[test]
    fn test_self_assessment_must_be_complete_and_in_range() {
        let mut session = ready_session();
        session.submit_draft("Hi Sam").unwrap();

        assert_eq!(
            session.submit_self_assessment(1, scores(&[("c1", 3)])),
            Err(SessionError::IncompleteSelfAssessment(vec!["c2".to_string()]))
        );
        assert!(matches!(
            session.submit_self_assessment(1, scores(&[("c1", 3), ("c2", 6)])),
            Err(SessionError::ScoreOutOfRange { .. })
        ));
        assert_eq!(
            session.submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4), ("c9", 1)])),
            Err(SessionError::UnknownCriterion("c9".to_string()))
        );
        assert_eq!(session.phase(), Phase::AwaitingSelfAssessment);
    }

    #[test]
    fn test_self_assessment_issues_assessment_without_prior() {
        let mut session = ready_session();
        session.submit_draft("Hi Sam").unwrap();

        let effect = session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap();
        match effect {
            Effect::AssessDraft {
                iteration_id,
                request,
            } => {
                assert_eq!(iteration_id, 1);
                assert_eq!(request.draft, "Hi Sam");
                assert!(request.previous_assessment.is_none());
                assert_eq!(request.criteria.len(), 2);
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert_eq!(session.phase(), Phase::AwaitingAiAssessment);
        assert!(matches!(
            session.submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)])),
            Err(SessionError::NotAwaitingSelfAssessment(1))
        ));
    }

    #[test]
    fn test_assessment_completes_iteration() {
        let mut session = ready_session();
        session.submit_draft("Hi Sam").unwrap();
        session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap();
        session
            .assessment_received(1, assessment(&[("c1", 2), ("c2", 5)]))
            .unwrap();

        assert_eq!(session.phase(), Phase::ReadyForNextIteration);
        assert_eq!(session.working_draft(), "Hi Sam");
        assert!(!session.editor_disabled());
        assert!(session.iteration(1).unwrap().is_assessed());
    }

    #[test]
    fn test_second_draft_skips_self_assessment_and_carries_prior_ai() {
        let mut session = ready_session();
        session.submit_draft("v1").unwrap();
        session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap();
        session
            .assessment_received(1, assessment(&[("c1", 2), ("c2", 5)]))
            .unwrap();

        match session.submit_draft("v2").unwrap() {
            Effect::AssessDraft {
                iteration_id,
                request,
            } => {
                assert_eq!(iteration_id, 2);
                assert_eq!(request.draft, "v2");
                let prior = request.previous_assessment.unwrap();
                assert_eq!(prior.scores, scores(&[("c1", 2), ("c2", 5)]));
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert_eq!(session.phase(), Phase::AwaitingAiAssessment);
        assert_eq!(session.iteration(2).unwrap().kind, IterationKind::Subsequent);
    }

    #[test]
    fn test_failure_releases_in_flight_and_keeps_data() {
        let mut session = ready_session();
        session.submit_draft("v1").unwrap();
        session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap();
        session.assessment_failed(1, "network down").unwrap();

        assert_eq!(session.in_flight(), None);
        assert_eq!(session.error(), Some("network down"));
        let iteration = session.iteration(1).unwrap();
        assert_eq!(iteration.draft, "v1");
        assert_eq!(
            iteration.self_assessment(),
            Some(&scores(&[("c1", 3), ("c2", 4)]))
        );
        assert!(iteration.ai_assessment.is_none());

        assert!(matches!(
            session.submit_draft("v1 again").unwrap(),
            Effect::AssessDraft { iteration_id: 2, ref request } if request.previous_assessment.is_none()
        ));
    }

    #[test]
    fn test_stale_and_incomplete_assessments_rejected() {
        let mut session = ready_session();
        assert_eq!(
            session.assessment_received(1, assessment(&[("c1", 2), ("c2", 5)])),
            Err(SessionError::StaleAssessment(1))
        );

        session.submit_draft("v1").unwrap();
        session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap();
        assert_eq!(
            session.assessment_received(1, assessment(&[("c1", 2)])),
            Err(SessionError::IncompleteAssessment(vec!["c2".to_string()]))
        );
        assert_eq!(session.in_flight(), Some(1));
    }

    #[test]
    fn test_notes_are_set_trimmed_and_removed() {
        let mut session = ready_session();
        session.set_note("c1", "  Sam likes bullet points ").unwrap();
        assert_eq!(
            session.criterion_notes().get("c1").map(String::as_str),
            Some("Sam likes bullet points")
        );

        session.submit_draft("v1").unwrap();
        session.set_note("c2", "budget is tight").unwrap();
        match session
            .submit_self_assessment(1, scores(&[("c1", 3), ("c2", 4)]))
            .unwrap()
        {
            Effect::AssessDraft { request, .. } => assert_eq!(request.criterion_notes.len(), 2),
            other => panic!("unexpected effect: {other:?}"),
        }

        session.set_note("c1", "   ").unwrap();
        assert!(!session.criterion_notes().contains_key("c1"));
        assert_eq!(
            session.set_note("nope", "x"),
            Err(SessionError::UnknownCriterion("nope".to_string()))
        );
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut session = ready_session();
        session.submit_draft("v1").unwrap();
        session.reset();
        assert_eq!(session, Session::new());
        assert_eq!(session.phase(), Phase::AwaitingContext);
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let mut session = ready_session();
        session.submit_draft("v1").unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.phase(), Phase::AwaitingSelfAssessment);
    }
}
