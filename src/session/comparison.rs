//! Comparison views for an assessed iteration
//!
//! The first iteration compares the writer's self-assessment with the AI
//! scores (calibration). Later iterations compare the AI scores with the
//! previous iteration's AI scores (progress); self-scores never enter there.

use super::state::{Iteration, Session};
use crate::model::{Criterion, Scores};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationRow {
    pub criterion_id: String,
    pub description: String,
    pub self_score: u8,
    pub ai_score: u8,
    /// `ai - self`: negative when the writer rated themselves higher
    pub delta: i32,
    pub reasoning: Option<String>,
    pub suggestion: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRow {
    pub criterion_id: String,
    pub description: String,
    pub ai_score: u8,
    pub previous_score: Option<u8>,
    /// `current - previous`
    pub delta: Option<i32>,
    pub reasoning: Option<String>,
    pub suggestion: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Comparison {
    Calibration {
        iteration_id: u32,
        self_average: f64,
        ai_average: f64,
        rows: Vec<CalibrationRow>,
        quality_flags: Vec<String>,
    },
    Progress {
        iteration_id: u32,
        ai_average: f64,
        average_delta: Option<f64>,
        rows: Vec<ProgressRow>,
        quality_flags: Vec<String>,
    },
}

/// Build the view for an iteration. `None` until it has an AI assessment.
pub fn compare(session: &Session, iteration_id: u32) -> Option<Comparison> {
    let iterations = session.iterations();
    let index = iterations.iter().position(|i| i.id == iteration_id)?;
    let iteration = &iterations[index];
    let assessment = iteration.ai_assessment.as_ref()?;
    let criteria = session.criteria();
    let notes = session.criterion_notes();

    let details = |c: &Criterion| {
        (
            assessment.reasoning.get(&c.id).cloned(),
            assessment.suggestions.get(&c.id).cloned().flatten(),
            notes.get(&c.id).cloned(),
        )
    };

    if let Some(self_scores) = iteration.self_assessment() {
        let rows = criteria
            .iter()
            .map(|c| {
                let self_score = score_of(self_scores, &c.id);
                let ai_score = score_of(&assessment.scores, &c.id);
                let (reasoning, suggestion, note) = details(c);
                CalibrationRow {
                    criterion_id: c.id.clone(),
                    description: c.description.clone(),
                    self_score,
                    ai_score,
                    delta: i32::from(ai_score) - i32::from(self_score),
                    reasoning,
                    suggestion,
                    note,
                }
            })
            .collect();

        return Some(Comparison::Calibration {
            iteration_id,
            self_average: average(criteria, self_scores),
            ai_average: average(criteria, &assessment.scores),
            rows,
            quality_flags: assessment.quality_flags.clone(),
        });
    }

    let previous = previous_ai_scores(iterations, index);
    let rows = criteria
        .iter()
        .map(|c| {
            let ai_score = score_of(&assessment.scores, &c.id);
            let previous_score = previous.and_then(|p| p.get(&c.id).copied());
            let (reasoning, suggestion, note) = details(c);
            ProgressRow {
                criterion_id: c.id.clone(),
                description: c.description.clone(),
                ai_score,
                previous_score,
                delta: previous_score.map(|p| i32::from(ai_score) - i32::from(p)),
                reasoning,
                suggestion,
                note,
            }
        })
        .collect();

    let ai_average = average(criteria, &assessment.scores);
    Some(Comparison::Progress {
        iteration_id,
        ai_average,
        average_delta: previous.map(|p| ai_average - average(criteria, p)),
        rows,
        quality_flags: assessment.quality_flags.clone(),
    })
}

/// AI scores of the iteration before `index`, if it was assessed
fn previous_ai_scores(iterations: &[Iteration], index: usize) -> Option<&Scores> {
    index
        .checked_sub(1)
        .and_then(|i| iterations[i].ai_assessment.as_ref())
        .map(|a| &a.scores)
}

fn score_of(scores: &Scores, id: &str) -> u8 {
    scores.get(id).copied().unwrap_or(0)
}

/// Mean over all criteria; an unscored criterion counts as zero
pub fn average(criteria: &[Criterion], scores: &Scores) -> f64 {
    if criteria.is_empty() {
        return 0.0;
    }
    let total: u32 = criteria
        .iter()
        .map(|c| u32::from(score_of(scores, &c.id)))
        .sum();
    f64::from(total) / criteria.len() as f64
}
