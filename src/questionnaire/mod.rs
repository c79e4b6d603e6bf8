//! Questionnaire state machine
//!
//! Linear progression over the fixed steps. Every edit and every step change
//! is written through to the injected session repository.

pub mod steps;

pub use steps::{find_field, Condition, FieldDefinition, FieldKind, StepDefinition, STEPS};

use crate::error::{AnalysisError, FieldIssue};
use crate::models::QuestionnaireAnswers;
use crate::session::{SessionPatch, SessionRepository};
use crate::validation::ValidationEngine;
use crate::Result;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub struct QuestionnaireFlow {
    steps: &'static [StepDefinition],
    current_step: usize,
    answers: Map<String, Value>,
    session: Arc<dyn SessionRepository>,
}

impl QuestionnaireFlow {
    /// Continue the stored session if there is a live one, otherwise start fresh
    pub fn resume(session: Arc<dyn SessionRepository>) -> Self {
        match session.load() {
            Some(record) => {
                info!(
                    session_id = %record.session_id,
                    step = record.current_step,
                    "Resuming questionnaire session"
                );
                Self {
                    steps: STEPS,
                    current_step: record.current_step,
                    answers: record.form_data,
                    session,
                }
            }
            None => Self::start(session, None),
        }
    }

    /// Start a new session, discarding any stored one
    pub fn start(session: Arc<dyn SessionRepository>, user_name: Option<String>) -> Self {
        let record = session.create(user_name);
        info!(session_id = %record.session_id, "Started questionnaire session");

        Self {
            steps: STEPS,
            current_step: 0,
            answers: Map::new(),
            session,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// `None` once `next()` has moved past the last step
    pub fn current_step_definition(&self) -> Option<&'static StepDefinition> {
        self.steps.get(self.current_step)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.steps.len()
    }

    /// Completion percentage of the current position, 0..=100
    pub fn progress(&self) -> u8 {
        let done = (self.current_step + 1).min(self.steps.len());
        ((done * 100) / self.steps.len().max(1)) as u8
    }

    pub fn answers(&self) -> &Map<String, Value> {
        &self.answers
    }

    /// Fields of the current step that pass their visibility predicate
    pub fn visible_fields(&self) -> Vec<&'static FieldDefinition> {
        self.current_step_definition()
            .map(|step| {
                step.fields
                    .iter()
                    .filter(|field| field.is_visible(&self.answers))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Coerce and store one answer, then persist it to the session
    pub fn set_field(&mut self, id: &str, raw: Value) -> Result<Value> {
        let field = find_field(id).ok_or_else(|| {
            AnalysisError::Validation(vec![FieldIssue::new(id, "unknown field")])
        })?;

        let value = coerce(field, raw)?;
        debug!(field = id, "Questionnaire field updated");

        self.answers.insert(id.to_string(), value.clone());
        self.session.save(SessionPatch::field(id, value.clone()));
        Ok(value)
    }

    /// Advance one step. No upper bound; check `is_last_step()` before calling.
    pub fn next(&mut self) -> usize {
        self.current_step += 1;
        self.session.save(SessionPatch::step(self.current_step));
        self.current_step
    }

    /// Go back one step, floored at 0
    pub fn prev(&mut self) -> usize {
        self.current_step = self.current_step.saturating_sub(1);
        self.session.save(SessionPatch::step(self.current_step));
        self.current_step
    }

    /// Validate the collected answers and mark the session completed
    pub fn complete(&mut self, validator: &ValidationEngine) -> Result<QuestionnaireAnswers> {
        let answers = validator.validate(&Value::Object(self.answers.clone()))?;
        let record = self.session.save(SessionPatch::completed());
        info!(session_id = %record.session_id, "Questionnaire completed");
        Ok(answers)
    }

    /// Drop all answers and the stored session
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.answers.clear();
        self.session.clear();
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Render-time coercion of a raw input into the stored value
pub fn coerce(field: &FieldDefinition, raw: Value) -> Result<Value> {
    let reject = |message: &str| AnalysisError::Validation(vec![FieldIssue::new(field.id, message)]);

    match field.kind {
        FieldKind::Number { min } => {
            // empty, unparsable or zero input falls back to the minimum
            let value = parse_number(&raw).filter(|v| *v != 0.0).unwrap_or(min);
            Ok(Value::from(value.max(min)))
        }
        FieldKind::Slider { min, max, .. } => {
            let value = parse_number(&raw).unwrap_or(min);
            Ok(Value::from(value.clamp(min, max)))
        }
        FieldKind::Choice { options } => match raw.as_str() {
            Some(choice) if options.contains(&choice) => Ok(raw),
            _ => Err(reject("not one of the allowed options")),
        },
        FieldKind::MultiChoice { .. } => match &raw {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(raw),
            _ => Err(reject("expected a list of strings")),
        },
        FieldKind::Goals => match &raw {
            Value::Array(_) => Ok(raw),
            _ => Err(reject("expected a list of goals")),
        },
    }
}
