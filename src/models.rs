//! Core data models for questionnaire answers and analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BonusPay {
    Yes,
    No,
    Sometimes,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HousingStatus {
    Rent,
    Own,
    #[serde(rename = "Living with family")]
    LivingWithFamily,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FoodOrdering {
    Daily,
    #[serde(rename = "Few times a week")]
    FewTimesAWeek,
    Rarely,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShoppingFrequency {
    Daily,
    Weekly,
    Monthly,
    Rarely,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportMode {
    #[serde(rename = "Public Transport")]
    PublicTransport,
    #[serde(rename = "Own Vehicle")]
    OwnVehicle,
    Both,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoanType {
    Education,
    Car,
    Home,
    Personal,
    #[serde(rename = "Credit Card")]
    CreditCard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskAppetite {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl GoalPriority {
    /// Sort weight: high=3, medium=2, low=1
    pub fn weight(self) -> u8 {
        match self {
            GoalPriority::High => 3,
            GoalPriority::Medium => 2,
            GoalPriority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Emergency,
    Investment,
    Purchase,
    Retirement,
    Education,
    #[default]
    Other,
}

//
// ================= Questionnaire =================
//

/// A goal as entered in the questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialGoalInput {
    pub description: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub timeline_months: f64,
    pub priority: GoalPriority,
    pub category: GoalCategory,
}

/// The full, validated answer set of one questionnaire submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireAnswers {
    // Salary & income
    pub monthly_income: f64,
    pub side_income: YesNo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_income_amount: Option<f64>,
    pub bonus_pay: BonusPay,

    // Living situation
    pub housing_status: HousingStatus,
    pub housing_expenses: f64,
    pub utility_bills: f64,
    pub household_size: f64,

    // Food & dining
    pub groceries_weekly: f64,
    pub dining_monthly: f64,
    pub food_ordering: FoodOrdering,

    // Shopping habits
    pub shopping_monthly: f64,
    pub impulse_shopping: f64,
    pub online_shopping: ShoppingFrequency,

    // Subscriptions & entertainment
    #[serde(default)]
    pub subscriptions: Vec<String>,
    pub subscription_cost: f64,
    pub entertainment_hours: f64,

    // Travel & transportation
    pub commute_cost: f64,
    pub transport_mode: TransportMode,
    pub transport_monthly: f64,

    // Debt / loans
    pub has_loans: YesNo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_repayment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,

    // Investments & goals
    #[serde(default)]
    pub investment_types: Vec<String>,
    pub monthly_investment: f64,
    #[serde(default)]
    pub financial_goals: Vec<FinancialGoalInput>,

    // Budgeting behaviour
    pub track_spending: YesNo,
    pub impulse_control: f64,
    pub saving_behavior: f64,
    pub risk_taking: RiskAppetite,

    // Commitment
    pub expense_reduction: f64,
    pub preferred_savings: f64,
    pub financial_discipline: f64,
}

impl QuestionnaireAnswers {
    /// Goals with ids assigned in input order.
    ///
    /// An empty goal list yields a single high-priority emergency fund goal.
    pub fn financial_goals(&self) -> Vec<FinancialGoal> {
        if self.financial_goals.is_empty() {
            return vec![FinancialGoal::default_emergency_fund()];
        }

        self.financial_goals
            .iter()
            .enumerate()
            .map(|(index, goal)| FinancialGoal {
                id: format!("goal_{}", index + 1),
                description: goal.description.clone(),
                target_amount: goal.target_amount,
                current_amount: goal.current_amount,
                timeline_months: goal.timeline_months.round().max(1.0) as u32,
                priority: goal.priority,
                category: goal.category,
            })
            .collect()
    }

    /// Loan repayment counted only when the user reports having loans
    pub fn effective_loan_repayment(&self) -> f64 {
        match self.has_loans {
            YesNo::Yes => self.loan_repayment.unwrap_or(0.0),
            YesNo::No => 0.0,
        }
    }
}

//
// ================= Goals =================
//

pub const DEFAULT_GOAL_TARGET: f64 = 500_000.0;
pub const DEFAULT_GOAL_TIMELINE_MONTHS: u32 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: String,
    pub description: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub timeline_months: u32,
    pub priority: GoalPriority,
    pub category: GoalCategory,
}

impl FinancialGoal {
    pub fn default_emergency_fund() -> Self {
        Self {
            id: "goal_1".to_string(),
            description: "Emergency Fund".to_string(),
            target_amount: DEFAULT_GOAL_TARGET,
            current_amount: 0.0,
            timeline_months: DEFAULT_GOAL_TIMELINE_MONTHS,
            priority: GoalPriority::High,
            category: GoalCategory::Emergency,
        }
    }
}

//
// ================= Derived Metrics =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpendingBreakdown {
    pub housing: f64,
    pub food: f64,
    pub transportation: f64,
    pub entertainment: f64,
    pub shopping: f64,
    pub subscriptions: f64,
    pub loans: f64,
    pub investments: f64,
    pub savings: f64,
    pub other: f64,
}

impl SpendingBreakdown {
    /// Everything except the residual savings
    pub fn total_outflow(&self) -> f64 {
        self.housing
            + self.food
            + self.transportation
            + self.entertainment
            + self.shopping
            + self.subscriptions
            + self.loans
            + self.investments
            + self.other
    }

    /// Savings plus investments, the amount that moves toward goals each month
    pub fn monthly_contribution(&self) -> f64 {
        self.savings + self.investments
    }

    /// (category, amount) pairs in display order
    pub fn categories(&self) -> [(&'static str, f64); 10] {
        [
            ("Housing", self.housing),
            ("Food", self.food),
            ("Transportation", self.transportation),
            ("Entertainment", self.entertainment),
            ("Shopping", self.shopping),
            ("Subscriptions", self.subscriptions),
            ("Loans", self.loans),
            ("Investments", self.investments),
            ("Savings", self.savings),
            ("Other", self.other),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Needs {
    pub housing: f64,
    pub food_essential: f64,
    pub transportation: f64,
    pub utilities: f64,
    pub loan_payments: f64,
}

impl Needs {
    pub fn total(&self) -> f64 {
        self.housing + self.food_essential + self.transportation + self.utilities + self.loan_payments
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Wants {
    pub dining_out: f64,
    pub entertainment: f64,
    pub shopping: f64,
    pub subscriptions: f64,
    pub other: f64,
}

impl Wants {
    pub fn total(&self) -> f64 {
        self.dining_out + self.entertainment + self.shopping + self.subscriptions + self.other
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NeedsWantsAnalysis {
    pub needs: Needs,
    pub wants: Wants,
    pub needs_percentage: u32,
    pub wants_percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub month: u32,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalTimeline {
    pub goal_id: String,
    pub goal_description: String,
    pub current_savings: f64,
    pub target_amount: f64,
    pub monthly_contribution: f64,
    /// Months to reach the target at the current contribution (uncapped)
    pub time_to_goal: u32,
    /// Projection horizon: min(preferred timeline, time_to_goal, 240)
    pub timeline_months: u32,
    pub milestones: Vec<Milestone>,
}

/// Month at which a goal reaches a share of its target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalMilestone {
    pub percentage: u32,
    pub month: u32,
    pub amount: f64,
}

/// Projection of one goal at the shared monthly contribution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub goal_id: String,
    pub description: String,
    pub priority: GoalPriority,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining_amount: f64,
    pub months_to_goal: u32,
    /// Sum of this and every higher-priority target
    pub cumulative_target: f64,
    pub milestones: Vec<GoalMilestone>,
}

//
// ================= Generated Narrative =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInsights {
    pub spending_patterns: String,
    pub optimization_opportunities: String,
    pub investment_recommendations: String,
    pub risk_analysis: String,
    pub goal_achievability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
    pub emergency_fund: String,
    pub investment_strategy: String,
}

//
// ================= Final Result =================
//

/// Combined metrics + narrative for one questionnaire submission.
/// Never updated in place; what-if runs build new values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub insights: FinancialInsights,
    pub spending_breakdown: SpendingBreakdown,
    pub needs_wants_analysis: NeedsWantsAnalysis,
    pub recommendations: Recommendations,
    pub goal_timeline: GoalTimeline,
    pub financial_goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub goal_projections: Vec<GoalProjection>,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskAppetite::Low => "Low",
            RiskAppetite::Medium => "Medium",
            RiskAppetite::High => "High",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalPriority::High => "high",
            GoalPriority::Medium => "medium",
            GoalPriority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalCategory::Emergency => "emergency",
            GoalCategory::Investment => "investment",
            GoalCategory::Purchase => "purchase",
            GoalCategory::Retirement => "retirement",
            GoalCategory::Education => "education",
            GoalCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// The worked example used across the test suite:
    /// income 100000, expenses 53000, savings 47000.
    pub fn sample_answers() -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            monthly_income: 100_000.0,
            side_income: YesNo::No,
            side_income_amount: None,
            bonus_pay: BonusPay::Sometimes,
            housing_status: HousingStatus::Rent,
            housing_expenses: 20_000.0,
            utility_bills: 3_000.0,
            household_size: 2.0,
            groceries_weekly: 2_000.0,
            dining_monthly: 2_000.0,
            food_ordering: FoodOrdering::FewTimesAWeek,
            shopping_monthly: 5_000.0,
            impulse_shopping: 2.0,
            online_shopping: ShoppingFrequency::Weekly,
            subscriptions: vec!["Netflix".to_string(), "Spotify".to_string()],
            subscription_cost: 1_000.0,
            entertainment_hours: 10.0,
            commute_cost: 1_500.0,
            transport_mode: TransportMode::PublicTransport,
            transport_monthly: 3_000.0,
            has_loans: YesNo::No,
            loan_repayment: None,
            loan_type: None,
            investment_types: vec!["Mutual Funds".to_string()],
            monthly_investment: 10_000.0,
            financial_goals: vec![FinancialGoalInput {
                description: "House down payment".to_string(),
                target_amount: 500_000.0,
                current_amount: 0.0,
                timeline_months: 60.0,
                priority: GoalPriority::High,
                category: GoalCategory::Purchase,
            }],
            track_spending: YesNo::Yes,
            impulse_control: 3.0,
            saving_behavior: 7.0,
            risk_taking: RiskAppetite::Medium,
            expense_reduction: 6.0,
            preferred_savings: 20_000.0,
            financial_discipline: 4.0,
        }
    }

    pub fn sample_answers_json() -> serde_json::Value {
        serde_json::to_value(sample_answers()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        let json = serde_json::to_value(HousingStatus::LivingWithFamily).unwrap();
        assert_eq!(json, "Living with family");

        let mode: TransportMode = serde_json::from_str("\"Own Vehicle\"").unwrap();
        assert_eq!(mode, TransportMode::OwnVehicle);

        assert!(serde_json::from_str::<YesNo>("\"Maybe\"").is_err());
    }

    #[test]
    fn test_default_goal_when_none_given() {
        let mut answers = fixtures::sample_answers();
        answers.financial_goals.clear();

        let goals = answers.financial_goals();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].description, "Emergency Fund");
        assert_eq!(goals[0].priority, GoalPriority::High);
        assert_eq!(goals[0].category, GoalCategory::Emergency);
    }

    #[test]
    fn test_goal_ids_follow_input_order() {
        let mut answers = fixtures::sample_answers();
        let mut second = answers.financial_goals[0].clone();
        second.description = "Laptop".to_string();
        answers.financial_goals.push(second);

        let goals = answers.financial_goals();
        assert_eq!(goals[0].id, "goal_1");
        assert_eq!(goals[1].id, "goal_2");
        assert_eq!(goals[1].description, "Laptop");
    }

    #[test]
    fn test_loan_repayment_ignored_without_loans() {
        let mut answers = fixtures::sample_answers();
        answers.loan_repayment = Some(4_000.0);
        assert_eq!(answers.effective_loan_repayment(), 0.0);

        answers.has_loans = YesNo::Yes;
        assert_eq!(answers.effective_loan_repayment(), 4_000.0);
    }

    #[test]
    fn test_result_keys_are_camel_case() {
        let json = serde_json::to_value(SpendingBreakdown::default()).unwrap();
        assert!(json.get("transportation").is_some());

        let nw = serde_json::to_value(NeedsWantsAnalysis::default()).unwrap();
        assert!(nw.get("needsPercentage").is_some());
        assert!(nw["needs"].get("food_essential").is_some());
    }
}
