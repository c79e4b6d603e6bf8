//! Questionnaire schema validation
//!
//! Rules-based validation at the submission boundary.
//! Shape and enumerations are enforced by serde; ranges by rules.

use crate::error::{AnalysisError, FieldIssue};
use crate::models::{QuestionnaireAnswers, YesNo};
use crate::Result;
use serde_json::Value;
use tracing::{debug, info};

/// Trait for validation rules
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, answers: &QuestionnaireAnswers) -> Vec<FieldIssue>;
}

type FieldGetter = fn(&QuestionnaireAnswers) -> Option<f64>;

/// Numeric field bounded below (and optionally above)
pub struct RangeRule {
    field: &'static str,
    min: f64,
    max: Option<f64>,
    get: FieldGetter,
}

impl RangeRule {
    pub fn at_least(field: &'static str, min: f64, get: FieldGetter) -> Self {
        Self {
            field,
            min,
            max: None,
            get,
        }
    }

    pub fn between(field: &'static str, min: f64, max: f64, get: FieldGetter) -> Self {
        Self {
            field,
            min,
            max: Some(max),
            get,
        }
    }
}

impl ValidationRule for RangeRule {
    fn name(&self) -> &'static str {
        self.field
    }

    fn check(&self, answers: &QuestionnaireAnswers) -> Vec<FieldIssue> {
        let Some(value) = (self.get)(answers) else {
            return Vec::new();
        };

        if !value.is_finite() {
            return vec![FieldIssue::new(self.field, "must be a finite number")];
        }

        if value < self.min {
            return vec![FieldIssue::new(
                self.field,
                format!("must be at least {}", self.min),
            )];
        }

        match self.max {
            Some(max) if value > max => vec![FieldIssue::new(
                self.field,
                format!("must be at most {}", max),
            )],
            _ => Vec::new(),
        }
    }
}

/// Per-goal checks on the financial_goals list
pub struct GoalRule;

const MIN_GOAL_TARGET: f64 = 1_000.0;
const MAX_GOAL_TIMELINE_MONTHS: f64 = 120.0;

impl ValidationRule for GoalRule {
    fn name(&self) -> &'static str {
        "financial_goals"
    }

    fn check(&self, answers: &QuestionnaireAnswers) -> Vec<FieldIssue> {
        let mut issues = Vec::new();

        for (index, goal) in answers.financial_goals.iter().enumerate() {
            let field = |name: &str| format!("financial_goals[{}].{}", index, name);

            if goal.description.trim().is_empty() {
                issues.push(FieldIssue::new(field("description"), "must not be empty"));
            }
            if !(goal.target_amount >= MIN_GOAL_TARGET) {
                issues.push(FieldIssue::new(
                    field("target_amount"),
                    format!("must be at least {}", MIN_GOAL_TARGET),
                ));
            }
            if !(goal.current_amount >= 0.0) {
                issues.push(FieldIssue::new(field("current_amount"), "must not be negative"));
            }
            if !(1.0..=MAX_GOAL_TIMELINE_MONTHS).contains(&goal.timeline_months) {
                issues.push(FieldIssue::new(
                    field("timeline_months"),
                    format!("must be between 1 and {}", MAX_GOAL_TIMELINE_MONTHS),
                ));
            }
        }

        issues
    }
}

/// Loan fields are required once the user says they have loans
pub struct LoanDetailsRule;

impl ValidationRule for LoanDetailsRule {
    fn name(&self) -> &'static str {
        "loan_details"
    }

    fn check(&self, answers: &QuestionnaireAnswers) -> Vec<FieldIssue> {
        if answers.has_loans == YesNo::Yes && answers.loan_repayment.is_none() {
            return vec![FieldIssue::new(
                "loan_repayment",
                "is required when has_loans is Yes",
            )];
        }
        Vec::new()
    }
}

/// Validation engine that applies every rule and collects all issues
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Check typed answers against every rule
    pub fn check(&self, answers: &QuestionnaireAnswers) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            let found = rule.check(answers);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(), "Validation rule failed");
            }
            issues.extend(found);
        }
        issues
    }

    /// Parse a raw JSON body into answers and validate it
    pub fn validate(&self, raw: &Value) -> Result<QuestionnaireAnswers> {
        let answers: QuestionnaireAnswers = serde_json::from_value(raw.clone()).map_err(|e| {
            AnalysisError::Validation(vec![shape_issue(raw, &e)])
        })?;

        let issues = self.check(&answers);

        info!(
            rule_count = self.rules.len(),
            issue_count = issues.len(),
            "Questionnaire validation completed"
        );

        if issues.is_empty() {
            Ok(answers)
        } else {
            Err(AnalysisError::Validation(issues))
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort field attribution for serde errors ("missing field `x`" / "unknown variant")
fn shape_issue(raw: &Value, error: &serde_json::Error) -> FieldIssue {
    let message = error.to_string();

    if !raw.is_object() {
        return FieldIssue::new("body", "expected a JSON object");
    }

    let field = message
        .split('`')
        .nth(1)
        .filter(|_| message.starts_with("missing field"))
        .unwrap_or("body")
        .to_string();

    FieldIssue::new(field, message)
}

/// Create the questionnaire schema with its standard rules
pub fn create_default_validation_engine() -> ValidationEngine {
    let mut engine = ValidationEngine::new();

    let non_negative: [(&'static str, FieldGetter); 14] = [
        ("monthly_income", |a| Some(a.monthly_income)),
        ("side_income_amount", |a| a.side_income_amount),
        ("housing_expenses", |a| Some(a.housing_expenses)),
        ("utility_bills", |a| Some(a.utility_bills)),
        ("groceries_weekly", |a| Some(a.groceries_weekly)),
        ("dining_monthly", |a| Some(a.dining_monthly)),
        ("shopping_monthly", |a| Some(a.shopping_monthly)),
        ("subscription_cost", |a| Some(a.subscription_cost)),
        ("entertainment_hours", |a| Some(a.entertainment_hours)),
        ("commute_cost", |a| Some(a.commute_cost)),
        ("transport_monthly", |a| Some(a.transport_monthly)),
        ("loan_repayment", |a| a.loan_repayment),
        ("monthly_investment", |a| Some(a.monthly_investment)),
        ("preferred_savings", |a| Some(a.preferred_savings)),
    ];

    for (field, get) in non_negative {
        engine.add_rule(Box::new(RangeRule::at_least(field, 0.0, get)));
    }

    engine.add_rule(Box::new(RangeRule::at_least("household_size", 1.0, |a| {
        Some(a.household_size)
    })));

    let ratings: [(&'static str, f64, f64, FieldGetter); 5] = [
        ("impulse_shopping", 1.0, 5.0, |a| Some(a.impulse_shopping)),
        ("impulse_control", 1.0, 5.0, |a| Some(a.impulse_control)),
        ("saving_behavior", 1.0, 10.0, |a| Some(a.saving_behavior)),
        ("expense_reduction", 1.0, 10.0, |a| Some(a.expense_reduction)),
        ("financial_discipline", 1.0, 5.0, |a| Some(a.financial_discipline)),
    ];

    for (field, min, max, get) in ratings {
        engine.add_rule(Box::new(RangeRule::between(field, min, max, get)));
    }

    engine.add_rule(Box::new(GoalRule));
    engine.add_rule(Box::new(LoanDetailsRule));
    engine
}

//
// ================= Tests =================
//
