//! What-if simulation
//!
//! Applies a scenario to a copy of the stored answers and compares the
//! recomputed metrics against the baseline. Local arithmetic only; the
//! insight generator is never involved.

pub mod debounce;

pub use debounce::{Debouncer, LiveSimulator, DEFAULT_DEBOUNCE};

use crate::error::AnalysisError;
use crate::metrics::{
    compute_metrics, goal_projections, months_to_target, project_goal, BudgetMetrics,
};
use crate::models::QuestionnaireAnswers;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const PROJECTION_MONTHS: u32 = 24;
pub const MAX_GOAL_PROJECTION_MONTHS: u32 = 60;
/// Extra months plotted past the projected goal date
const GOAL_PROJECTION_TAIL_MONTHS: u32 = 6;

//
// ================= Scenario Inputs =================
//

/// Relative changes, all in percent
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PercentAdjustments {
    #[serde(default)]
    pub income_increase: f64,
    #[serde(default)]
    pub expense_reduction: f64,
    #[serde(default)]
    pub investment_boost: f64,
    /// Goal to project against; defaults to the primary goal's target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_target: Option<f64>,
}

/// Absolute replacements for individual answers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entertainment_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping_monthly: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dining_monthly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    Percent(PercentAdjustments),
    Overrides(FieldOverrides),
}

impl Scenario {
    fn check(&self) -> Result<()> {
        let values: Vec<(&str, f64)> = match self {
            Scenario::Percent(p) => {
                let mut values = vec![
                    ("incomeIncrease", p.income_increase),
                    ("expenseReduction", p.expense_reduction),
                    ("investmentBoost", p.investment_boost),
                ];
                values.extend(p.goal_target.map(|t| ("goalTarget", t)));
                values
            }
            Scenario::Overrides(o) => [
                ("preferred_savings", o.preferred_savings),
                ("subscription_cost", o.subscription_cost),
                ("entertainment_hours", o.entertainment_hours),
                ("shopping_monthly", o.shopping_monthly),
                ("dining_monthly", o.dining_monthly),
            ]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect(),
        };

        for (name, value) in values {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidSimulation(format!(
                    "{} must be a finite number",
                    name
                )));
            }
            if matches!(self, Scenario::Overrides(_)) && value < 0.0 {
                return Err(AnalysisError::InvalidSimulation(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }

        if let Scenario::Percent(PercentAdjustments {
            goal_target: Some(target),
            ..
        }) = self
        {
            if *target <= 0.0 {
                return Err(AnalysisError::InvalidSimulation(
                    "goalTarget must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Adjusted copy of `answers`; amounts never go below zero
    pub fn apply(&self, answers: &QuestionnaireAnswers) -> QuestionnaireAnswers {
        let mut adjusted = answers.clone();

        match self {
            Scenario::Percent(p) => {
                let grow = |value: f64, pct: f64| (value * (1.0 + pct / 100.0)).max(0.0);
                let cut = |value: f64| (value * (1.0 - p.expense_reduction / 100.0)).max(0.0);

                adjusted.monthly_income = grow(answers.monthly_income, p.income_increase);
                adjusted.monthly_investment = grow(answers.monthly_investment, p.investment_boost);
                adjusted.housing_expenses = cut(answers.housing_expenses);
                adjusted.dining_monthly = cut(answers.dining_monthly);
                adjusted.shopping_monthly = cut(answers.shopping_monthly);
                adjusted.subscription_cost = cut(answers.subscription_cost);
            }
            Scenario::Overrides(o) => {
                let set = |target: &mut f64, value: Option<f64>| {
                    if let Some(v) = value {
                        *target = v.max(0.0);
                    }
                };
                set(&mut adjusted.preferred_savings, o.preferred_savings);
                set(&mut adjusted.subscription_cost, o.subscription_cost);
                set(&mut adjusted.entertainment_hours, o.entertainment_hours);
                set(&mut adjusted.shopping_monthly, o.shopping_monthly);
                set(&mut adjusted.dining_monthly, o.dining_monthly);
            }
        }

        adjusted
    }

    fn goal_target(&self) -> Option<f64> {
        match self {
            Scenario::Percent(p) => p.goal_target,
            Scenario::Overrides(_) => None,
        }
    }
}

/// Body of `POST /api/simulate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub questionnaire_id: String,
    #[serde(default)]
    pub simulation: Option<PercentAdjustments>,
    #[serde(default)]
    pub adjustments: Option<FieldOverrides>,
}

impl SimulationRequest {
    /// The requested scenario; percentage adjustments win when both are present
    pub fn scenario(&self) -> Result<Scenario> {
        let scenario = match (&self.simulation, &self.adjustments) {
            (Some(p), _) => Scenario::Percent(*p),
            (None, Some(o)) => Scenario::Overrides(o.clone()),
            (None, None) => {
                return Err(AnalysisError::InvalidSimulation(
                    "either simulation or adjustments is required".to_string(),
                ))
            }
        };
        scenario.check()?;
        Ok(scenario)
    }
}

//
// ================= Simulation Output =================
//

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProjection {
    pub month: String,
    pub before_scenario: f64,
    pub after_scenario: f64,
    pub goal_target: f64,
    pub savings: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub month: String,
    pub current_progress: f64,
    pub projected_progress: f64,
    pub simulated_progress: f64,
    pub goal_target: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    pub monthly_data: Vec<MonthlyProjection>,
    pub goal_timeline: Vec<GoalProgress>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInsights {
    pub goal_achievability: String,
    pub time_to_goal: String,
    pub savings_impact: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub insights: SimulationInsights,
    pub projections: Projections,
    pub simulated: BudgetMetrics,
}

/// Run a scenario against the stored answers
pub fn simulate(answers: &QuestionnaireAnswers, scenario: &Scenario) -> SimulationResult {
    let baseline = compute_metrics(answers);
    let adjusted = scenario.apply(answers);
    let mut simulated = compute_metrics(&adjusted);

    let before = baseline.spending_breakdown.monthly_contribution();
    let after = committed_contribution(answers, &adjusted, &simulated);
    let goals = adjusted.financial_goals();
    simulated.goal_timeline = project_goal(&goals, after);
    simulated.goal_projections = goal_projections(&goals, after);
    let goal_target = scenario
        .goal_target()
        .unwrap_or(baseline.goal_timeline.target_amount);
    let time_to_goal = months_to_target(goal_target, after);

    let projections = Projections {
        monthly_data: monthly_projection(before, after, goal_target),
        goal_timeline: goal_projection(before, after, goal_target, time_to_goal),
    };

    let insights = SimulationInsights {
        goal_achievability: goal_achievability(after, adjusted.monthly_income),
        time_to_goal: format!(
            "Based on this scenario, you could reach your goal of ₹{} in approximately {} years and {} months ({} months total).",
            format_inr(goal_target),
            time_to_goal / 12,
            time_to_goal % 12,
            time_to_goal
        ),
        savings_impact: savings_impact(before, after),
        recommendations: recommendations(after - before),
    };

    SimulationResult {
        insights,
        projections,
        simulated,
    }
}

/// Recomputed contribution plus any change to the monthly savings commitment,
/// bounded by what the adjusted income can fund
fn committed_contribution(
    answers: &QuestionnaireAnswers,
    adjusted: &QuestionnaireAnswers,
    simulated: &BudgetMetrics,
) -> f64 {
    let computed = simulated.spending_breakdown.monthly_contribution();
    let commitment_change = adjusted.preferred_savings - answers.preferred_savings;
    (computed + commitment_change).clamp(0.0, adjusted.monthly_income.max(computed))
}

fn monthly_projection(before: f64, after: f64, goal_target: f64) -> Vec<MonthlyProjection> {
    (1..=PROJECTION_MONTHS)
        .map(|month| {
            let m = f64::from(month);
            MonthlyProjection {
                month: format!("Month {}", month),
                before_scenario: before * m,
                after_scenario: after * m,
                goal_target,
                savings: after,
                difference: (after - before) * m,
            }
        })
        .collect()
}

fn goal_projection(
    before: f64,
    after: f64,
    goal_target: f64,
    time_to_goal: u32,
) -> Vec<GoalProgress> {
    let months = time_to_goal
        .saturating_add(GOAL_PROJECTION_TAIL_MONTHS)
        .min(MAX_GOAL_PROJECTION_MONTHS);

    (1..=months)
        .map(|month| {
            let m = f64::from(month);
            GoalProgress {
                month: format!("Month {}", month),
                current_progress: before * m,
                projected_progress: before * m,
                simulated_progress: after * m,
                goal_target,
                milestone: (month % 12 == 0).then(|| format!("Year {}", month / 12)),
            }
        })
        .collect()
}

fn goal_achievability(monthly_contribution: f64, income: f64) -> String {
    if income <= 0.0 {
        return "Without a monthly income, goal progress depends entirely on existing savings."
            .to_string();
    }

    let rate = monthly_contribution / income * 100.0;
    let outlook = if rate >= 30.0 {
        "strong, and long-term goals are well within reach"
    } else if rate >= 15.0 {
        "healthy; staying consistent keeps your goals on track"
    } else {
        "tight; small recurring cuts will make a visible difference"
    };

    format!(
        "Saving and investing {:.1}% of income, your outlook is {}.",
        rate, outlook
    )
}

fn savings_impact(before: f64, after: f64) -> String {
    let delta = after - before;

    if delta.abs() < 0.5 {
        return "This scenario leaves your monthly savings unchanged.".to_string();
    }

    let direction = if delta > 0.0 { "add" } else { "remove" };
    let mut text = format!(
        "This scenario would {} ₹{} per month, ₹{} per year",
        direction,
        format_inr(delta.abs()),
        format_inr(delta.abs() * 12.0)
    );

    if before > 0.0 {
        text.push_str(&format!(
            ", a {:.1}% change in your savings rate.",
            delta / before * 100.0
        ));
    } else {
        text.push('.');
    }
    text
}

fn recommendations(delta: f64) -> Vec<String> {
    let first = if delta > 0.0 {
        format!(
            "Increase monthly savings by ₹{} to reach your goal faster",
            format_inr(delta)
        )
    } else {
        "Look for other expenses to trim before committing to this scenario".to_string()
    };

    vec![
        first,
        "Consider automated transfers to maintain disciplined saving habits".to_string(),
        "Diversify investments across multiple asset classes to reduce risk".to_string(),
        "Build an emergency fund covering 6-8 months of expenses".to_string(),
        "Review and optimize this plan quarterly for best results".to_string(),
    ]
}

/// Whole-rupee amount with Indian digit grouping (12,34,567)
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_answers;

    fn percent(income: f64, reduction: f64, boost: f64, target: Option<f64>) -> Scenario {
        Scenario::Percent(PercentAdjustments {
            income_increase: income,
            expense_reduction: reduction,
            investment_boost: boost,
            goal_target: target,
        })
    }

    #[test]
    fn test_percent_adjustments() {
        let answers = sample_answers();
        let adjusted = percent(10.0, 50.0, 20.0, None).apply(&answers);

        assert!((adjusted.monthly_income - 110_000.0).abs() < 1e-6);
        assert!((adjusted.monthly_investment - 12_000.0).abs() < 1e-6);
        assert_eq!(adjusted.housing_expenses, 10_000.0);
        assert_eq!(adjusted.shopping_monthly, 2_500.0);
        assert_eq!(adjusted.subscription_cost, 500.0);
        // untouched
        assert_eq!(adjusted.utility_bills, answers.utility_bills);
        assert_eq!(adjusted.transport_monthly, answers.transport_monthly);
    }

    #[test]
    fn test_reduction_above_hundred_floors_at_zero() {
        let adjusted = percent(0.0, 150.0, -200.0, None).apply(&sample_answers());
        assert_eq!(adjusted.housing_expenses, 0.0);
        assert_eq!(adjusted.monthly_investment, 0.0);
    }

    #[test]
    fn test_overrides_replace_fields() {
        let scenario = Scenario::Overrides(FieldOverrides {
            shopping_monthly: Some(2_500.0),
            entertainment_hours: Some(0.0),
            ..Default::default()
        });
        let answers = sample_answers();
        let adjusted = scenario.apply(&answers);

        assert_eq!(adjusted.shopping_monthly, 2_500.0);
        assert_eq!(adjusted.entertainment_hours, 0.0);
        assert_eq!(adjusted.dining_monthly, answers.dining_monthly);
    }

    #[test]
    fn test_simulation_does_not_mutate_input() {
        let answers = sample_answers();
        let snapshot = answers.clone();
        simulate(&answers, &percent(25.0, 25.0, 25.0, None));
        assert_eq!(answers, snapshot);
    }

    #[test]
    fn test_halving_shopping_scenario() {
        let answers = sample_answers();
        let scenario = Scenario::Overrides(FieldOverrides {
            shopping_monthly: Some(2_500.0),
            ..Default::default()
        });
        let result = simulate(&answers, &scenario);

        assert_eq!(result.simulated.spending_breakdown.savings, 49_500.0);
        let first = &result.projections.monthly_data[0];
        assert_eq!(first.difference, 2_500.0);
        assert!(result.insights.savings_impact.contains("add ₹2,500 per month"));
    }

    #[test]
    fn test_preferred_savings_override_changes_contribution() {
        let answers = sample_answers();
        let baseline = compute_metrics(&answers);
        let scenario = Scenario::Overrides(FieldOverrides {
            preferred_savings: Some(30_000.0),
            ..Default::default()
        });
        let result = simulate(&answers, &scenario);

        // 57,000 computed + 10,000 extra commitment
        assert_eq!(result.projections.monthly_data[0].difference, 10_000.0);
        assert_eq!(result.simulated.goal_timeline.monthly_contribution, 67_000.0);
        assert_eq!(result.simulated.goal_timeline.time_to_goal, 8);
        assert!(result.simulated.goal_timeline.time_to_goal < baseline.goal_timeline.time_to_goal);
        assert!(result.insights.savings_impact.contains("add ₹10,000 per month"));
    }

    #[test]
    fn test_preferred_savings_bounded_by_income() {
        let answers = sample_answers();
        let raised = simulate(
            &answers,
            &Scenario::Overrides(FieldOverrides {
                preferred_savings: Some(80_000.0),
                ..Default::default()
            }),
        );
        assert_eq!(raised.simulated.goal_timeline.monthly_contribution, 100_000.0);

        let lowered = simulate(
            &answers,
            &Scenario::Overrides(FieldOverrides {
                preferred_savings: Some(10_000.0),
                ..Default::default()
            }),
        );
        assert_eq!(lowered.simulated.goal_timeline.monthly_contribution, 47_000.0);
        assert!(lowered.insights.savings_impact.contains("remove ₹10,000 per month"));
    }

    #[test]
    fn test_projection_shapes() {
        let answers = sample_answers();
        let result = simulate(&answers, &percent(0.0, 0.0, 0.0, Some(1_000_000.0)));

        assert_eq!(result.projections.monthly_data.len(), 24);
        assert_eq!(result.projections.monthly_data[23].month, "Month 24");

        // 1,000,000 / 57,000 -> 18 months, plus 6
        assert_eq!(result.projections.goal_timeline.len(), 24);
        let milestones: Vec<_> = result
            .projections
            .goal_timeline
            .iter()
            .filter_map(|row| row.milestone.clone())
            .collect();
        assert_eq!(milestones, vec!["Year 1", "Year 2"]);
        assert!(result.insights.time_to_goal.contains("1 years and 6 months (18 months total)"));
        assert!(result.insights.time_to_goal.contains("₹10,00,000"));
    }

    #[test]
    fn test_goal_projection_capped_at_sixty_months() {
        let mut answers = sample_answers();
        answers.monthly_income = 0.0;
        answers.monthly_investment = 0.0;
        let result = simulate(&answers, &percent(0.0, 0.0, 0.0, None));

        assert_eq!(result.projections.goal_timeline.len(), 60);
        assert!(result.insights.goal_achievability.contains("Without a monthly income"));
        assert!(result.insights.savings_impact.contains("unchanged"));
    }

    #[test]
    fn test_request_requires_a_scenario() {
        let request: SimulationRequest =
            serde_json::from_value(serde_json::json!({"questionnaireId": "q"})).unwrap();
        assert!(matches!(
            request.scenario(),
            Err(AnalysisError::InvalidSimulation(_))
        ));

        let request: SimulationRequest = serde_json::from_value(serde_json::json!({
            "questionnaireId": "q",
            "simulation": {"incomeIncrease": 10, "expenseReduction": 5, "investmentBoost": 0}
        }))
        .unwrap();
        assert!(matches!(request.scenario(), Ok(Scenario::Percent(_))));
    }

    #[test]
    fn test_negative_override_rejected() {
        let request = SimulationRequest {
            questionnaire_id: "q".to_string(),
            simulation: None,
            adjustments: Some(FieldOverrides {
                dining_monthly: Some(-1.0),
                ..Default::default()
            }),
        };
        assert!(request.scenario().is_err());
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "0");
        assert_eq!(format_inr(999.4), "999");
        assert_eq!(format_inr(1_000.0), "1,000");
        assert_eq!(format_inr(500_000.0), "5,00,000");
        assert_eq!(format_inr(12_345_678.0), "1,23,45,678");
        assert_eq!(format_inr(-2_500.0), "-2,500");
    }
}
