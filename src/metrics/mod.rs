//! Budget metrics calculator
//!
//! Pure, deterministic functions over validated answers.
//! No I/O and no LLM here: what-if runs call these again with adjusted inputs.

use crate::models::{
    FinancialGoal, GoalMilestone, GoalProjection, GoalTimeline, Milestone, Needs,
    NeedsWantsAnalysis, QuestionnaireAnswers, SpendingBreakdown, Wants,
};

/// Weeks per month used to scale weekly grocery spend
const WEEKS_PER_MONTH: f64 = 4.0;

/// Entertainment heuristic: rupees per impulse-shopping level at 10 hours/month
const ENTERTAINMENT_RATE_PER_IMPULSE_LEVEL: f64 = 500.0;
const ENTERTAINMENT_REFERENCE_HOURS: f64 = 10.0;

/// Share of food spend counted as essential
const ESSENTIAL_FOOD_SHARE: f64 = 0.7;

/// Contribution floor for time-to-goal, avoids blow-up near zero savings
pub const MIN_MONTHLY_CONTRIBUTION: f64 = 1_000.0;

pub const MAX_TIMELINE_MONTHS: u32 = 240;
pub const MILESTONE_INTERVAL_MONTHS: u32 = 6;

/// Shares of a goal's target reported as per-goal milestones
pub const GOAL_MILESTONE_PERCENTAGES: [u32; 5] = [25, 50, 75, 90, 100];

/// Bundle of locally computed metrics for one answer set
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMetrics {
    pub spending_breakdown: SpendingBreakdown,
    pub needs_wants_analysis: NeedsWantsAnalysis,
    pub goal_timeline: GoalTimeline,
    pub goal_projections: Vec<GoalProjection>,
}

/// Compute breakdown, needs/wants split and goal timeline in one pass
pub fn compute_metrics(answers: &QuestionnaireAnswers) -> BudgetMetrics {
    let spending_breakdown = spending_breakdown(answers);
    let needs_wants_analysis = needs_wants(answers, &spending_breakdown);
    let goals = answers.financial_goals();
    let goal_timeline = goal_timeline(&goals, &spending_breakdown);
    let goal_projections = goal_projections(&goals, spending_breakdown.monthly_contribution());

    BudgetMetrics {
        spending_breakdown,
        needs_wants_analysis,
        goal_timeline,
        goal_projections,
    }
}

/// Heuristic entertainment cost, not measured spend
pub fn entertainment_cost(answers: &QuestionnaireAnswers) -> f64 {
    let base_rate = answers.impulse_shopping * ENTERTAINMENT_RATE_PER_IMPULSE_LEVEL;
    let frequency = answers.entertainment_hours / ENTERTAINMENT_REFERENCE_HOURS;
    (base_rate * frequency).round()
}

/// Monthly spending per category; savings is the residual, floored at 0
pub fn spending_breakdown(answers: &QuestionnaireAnswers) -> SpendingBreakdown {
    let mut breakdown = SpendingBreakdown {
        housing: answers.housing_expenses + answers.utility_bills,
        food: answers.groceries_weekly * WEEKS_PER_MONTH + answers.dining_monthly,
        transportation: answers.transport_monthly,
        entertainment: entertainment_cost(answers),
        shopping: answers.shopping_monthly,
        subscriptions: answers.subscription_cost,
        loans: answers.effective_loan_repayment(),
        investments: answers.monthly_investment,
        savings: 0.0,
        other: 0.0,
    };

    breakdown.savings = (answers.monthly_income - breakdown.total_outflow()).max(0.0);
    breakdown
}

/// Split spending into essential and discretionary buckets.
///
/// The housing line is the breakdown's housing figure (rent plus utilities)
/// and utilities are added again as their own essential line. A zero total
/// reports 0% / 0%.
pub fn needs_wants(answers: &QuestionnaireAnswers, spending: &SpendingBreakdown) -> NeedsWantsAnalysis {
    let needs = Needs {
        housing: spending.housing,
        food_essential: (spending.food * ESSENTIAL_FOOD_SHARE).round(),
        transportation: spending.transportation,
        utilities: answers.utility_bills,
        loan_payments: spending.loans,
    };

    let wants = Wants {
        dining_out: (spending.food * (1.0 - ESSENTIAL_FOOD_SHARE)).round(),
        entertainment: spending.entertainment,
        shopping: spending.shopping,
        subscriptions: spending.subscriptions,
        other: spending.other,
    };

    let total_needs = needs.total();
    let total_wants = wants.total();
    let total = total_needs + total_wants;

    let (needs_percentage, wants_percentage) = if total > 0.0 {
        (
            percentage(total_needs, total),
            percentage(total_wants, total),
        )
    } else {
        (0, 0)
    };

    NeedsWantsAnalysis {
        needs,
        wants,
        needs_percentage,
        wants_percentage,
    }
}

fn percentage(part: f64, total: f64) -> u32 {
    (part / total * 100.0).round().max(0.0) as u32
}

/// Stable sort by priority, high first. Equal priorities keep input order.
pub fn sort_goals_by_priority(goals: &[FinancialGoal]) -> Vec<FinancialGoal> {
    let mut sorted = goals.to_vec();
    sorted.sort_by_key(|goal| std::cmp::Reverse(goal.priority.weight()));
    sorted
}

/// Months to reach `target` at `contribution` per month, with the contribution floor applied
pub fn months_to_target(target: f64, contribution: f64) -> u32 {
    let effective = contribution.max(MIN_MONTHLY_CONTRIBUTION);
    let months = (target.max(0.0) / effective).ceil();
    if months.is_finite() {
        months as u32
    } else {
        u32::MAX
    }
}

/// Project the highest-priority goal against the monthly contribution
pub fn goal_timeline(goals: &[FinancialGoal], spending: &SpendingBreakdown) -> GoalTimeline {
    project_goal(goals, spending.monthly_contribution())
}

/// Same as [`goal_timeline`] for an explicit monthly contribution
pub fn project_goal(goals: &[FinancialGoal], monthly_contribution: f64) -> GoalTimeline {
    let primary = sort_goals_by_priority(goals)
        .into_iter()
        .next()
        .unwrap_or_else(FinancialGoal::default_emergency_fund);

    let time_to_goal = months_to_target(primary.target_amount, monthly_contribution);

    let timeline_months = primary
        .timeline_months
        .min(time_to_goal)
        .min(MAX_TIMELINE_MONTHS);

    let milestones = (MILESTONE_INTERVAL_MONTHS..=timeline_months)
        .step_by(MILESTONE_INTERVAL_MONTHS as usize)
        .map(|month| Milestone {
            month,
            amount: (monthly_contribution * f64::from(month)).round(),
            description: format!("{} month milestone", month),
        })
        .collect();

    GoalTimeline {
        goal_id: primary.id,
        goal_description: primary.description,
        current_savings: primary.current_amount,
        target_amount: primary.target_amount,
        monthly_contribution,
        time_to_goal,
        timeline_months,
        milestones,
    }
}

/// Project every goal, highest priority first, at the same monthly contribution.
///
/// Each goal only needs its remaining amount. Milestones at 25/50/75/90/100% of
/// the target are kept when they fall after month 0 and by the goal month.
pub fn goal_projections(goals: &[FinancialGoal], monthly_contribution: f64) -> Vec<GoalProjection> {
    let effective = monthly_contribution.max(MIN_MONTHLY_CONTRIBUTION);
    let mut cumulative_target = 0.0;

    sort_goals_by_priority(goals)
        .into_iter()
        .map(|goal| {
            let remaining_amount = (goal.target_amount - goal.current_amount).max(0.0);
            let months_to_goal = months_to_target(remaining_amount, monthly_contribution);
            cumulative_target += goal.target_amount;

            let milestones = GOAL_MILESTONE_PERCENTAGES
                .iter()
                .filter_map(|&percentage| {
                    let amount = goal.target_amount * f64::from(percentage) / 100.0;
                    let month = ((amount - goal.current_amount) / effective).ceil();
                    (month > 0.0 && month <= f64::from(months_to_goal)).then(|| GoalMilestone {
                        percentage,
                        month: month as u32,
                        amount,
                    })
                })
                .collect();

            GoalProjection {
                goal_id: goal.id,
                description: goal.description,
                priority: goal.priority,
                target_amount: goal.target_amount,
                current_amount: goal.current_amount,
                remaining_amount,
                months_to_goal,
                cumulative_target,
                milestones,
            }
        })
        .collect()
}
