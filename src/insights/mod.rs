//! Narrative insight generation
//!
//! The LLM only writes prose around numbers that were already computed locally.
//! It never produces metrics.

use crate::error::AnalysisError;
use crate::gemini::{clean_json_response, GeminiClient};
use crate::metrics::BudgetMetrics;
use crate::models::{FinancialInsights, QuestionnaireAnswers, Recommendations};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

/// Everything a generator may reference when writing narrative
pub struct InsightContext<'a> {
    pub answers: &'a QuestionnaireAnswers,
    pub metrics: &'a BudgetMetrics,
}

impl<'a> InsightContext<'a> {
    pub fn new(answers: &'a QuestionnaireAnswers, metrics: &'a BudgetMetrics) -> Self {
        Self { answers, metrics }
    }
}

/// Trait for narrative generation (LLM controlled)
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate_insights(&self, context: &InsightContext<'_>) -> Result<FinancialInsights>;

    async fn generate_recommendations(
        &self,
        context: &InsightContext<'_>,
    ) -> Result<Recommendations>;
}

//
// ================= Gemini =================
//

pub struct GeminiInsightGenerator {
    client: GeminiClient,
}

impl GeminiInsightGenerator {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: serde_json::Value,
    ) -> Result<T> {
        let response = self.client.generate_json(&prompt, schema).await?;
        parse_response(&response)
    }
}

#[async_trait]
impl InsightGenerator for GeminiInsightGenerator {
    async fn generate_insights(&self, context: &InsightContext<'_>) -> Result<FinancialInsights> {
        self.generate(insights_prompt(context)?, insights_schema()).await
    }

    async fn generate_recommendations(
        &self,
        context: &InsightContext<'_>,
    ) -> Result<Recommendations> {
        self.generate(recommendations_prompt(context)?, recommendations_schema())
            .await
    }
}

/// Parse a generator response into the expected shape
fn parse_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let cleaned = clean_json_response(response);
    debug!(bytes = cleaned.len(), "Parsing generator response");

    serde_json::from_str(cleaned).map_err(|e| {
        AnalysisError::LlmError(format!(
            "Failed to parse Gemini response: {} | raw={}",
            e, response
        ))
    })
}

fn insights_prompt(context: &InsightContext<'_>) -> Result<String> {
    let answers = context.answers;
    let metrics = context.metrics;
    let split = &metrics.needs_wants_analysis;
    let timeline = &metrics.goal_timeline;

    let investment_types = if answers.investment_types.is_empty() {
        "None".to_string()
    } else {
        answers.investment_types.join(", ")
    };

    Ok(format!(
        r#"Analyze this financial profile and provide insights:

Income: ₹{}
Spending Breakdown: {}
Needs vs Wants: {}% needs, {}% wants
Financial Discipline: {}/5
Risk Tolerance: {}
Investment Types: {}
Primary Goal: {} (target ₹{}, about {} months at ₹{} per month)

Provide insights in JSON format with these fields:
- spendingPatterns: analysis of spending behavior
- optimizationOpportunities: areas for improvement
- investmentRecommendations: investment advice based on risk profile
- riskAnalysis: financial risk assessment
- goalAchievability: assessment of goal achievability
"#,
        answers.monthly_income,
        serde_json::to_string(&metrics.spending_breakdown)?,
        split.needs_percentage,
        split.wants_percentage,
        answers.financial_discipline,
        answers.risk_taking,
        investment_types,
        timeline.goal_description,
        timeline.target_amount,
        timeline.time_to_goal,
        timeline.monthly_contribution,
    ))
}

fn recommendations_prompt(context: &InsightContext<'_>) -> Result<String> {
    let answers = context.answers;

    let goals = answers
        .financial_goals()
        .iter()
        .map(|goal| {
            format!(
                "{} (₹{}, {} months, {} priority)",
                goal.description, goal.target_amount, goal.timeline_months, goal.priority
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    Ok(format!(
        r#"Based on this financial profile, provide actionable recommendations:

Income: ₹{}
Spending: {}
Willingness to reduce expenses: {}/10
Financial goals: {}

Provide recommendations in JSON format:
- immediate: array of immediate actions (1-3 months)
- shortTerm: array of short-term goals (3-12 months)
- longTerm: array of long-term strategies (1+ years)
- emergencyFund: emergency fund recommendation
- investmentStrategy: investment strategy recommendation
"#,
        answers.monthly_income,
        serde_json::to_string(&context.metrics.spending_breakdown)?,
        answers.expense_reduction,
        goals,
    ))
}

fn insights_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "spendingPatterns": { "type": "string" },
            "optimizationOpportunities": { "type": "string" },
            "investmentRecommendations": { "type": "string" },
            "riskAnalysis": { "type": "string" },
            "goalAchievability": { "type": "string" }
        },
        "required": [
            "spendingPatterns",
            "optimizationOpportunities",
            "investmentRecommendations",
            "riskAnalysis",
            "goalAchievability"
        ]
    })
}

fn recommendations_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "immediate": { "type": "array", "items": { "type": "string" } },
            "shortTerm": { "type": "array", "items": { "type": "string" } },
            "longTerm": { "type": "array", "items": { "type": "string" } },
            "emergencyFund": { "type": "string" },
            "investmentStrategy": { "type": "string" }
        },
        "required": ["immediate", "shortTerm", "longTerm", "emergencyFund", "investmentStrategy"]
    })
}

//
// ================= Mock =================
//

/// Mock generator for development & testing.
/// Writes deterministic text from the computed metrics, no network.
pub struct MockInsightGenerator;

#[async_trait]
impl InsightGenerator for MockInsightGenerator {
    async fn generate_insights(&self, context: &InsightContext<'_>) -> Result<FinancialInsights> {
        let metrics = context.metrics;
        let split = &metrics.needs_wants_analysis;
        let timeline = &metrics.goal_timeline;

        Ok(FinancialInsights {
            spending_patterns: format!(
                "{}% of spending goes to needs and {}% to wants.",
                split.needs_percentage, split.wants_percentage
            ),
            optimization_opportunities: format!(
                "Shopping ({}) and subscriptions ({}) are the easiest lines to trim.",
                metrics.spending_breakdown.shopping, metrics.spending_breakdown.subscriptions
            ),
            investment_recommendations: format!(
                "Match investments to a {} risk appetite.",
                context.answers.risk_taking
            ),
            risk_analysis: format!(
                "Monthly surplus after all outflows is {}.",
                metrics.spending_breakdown.savings
            ),
            goal_achievability: format!(
                "{} is reachable in about {} months.",
                timeline.goal_description, timeline.time_to_goal
            ),
        })
    }

    async fn generate_recommendations(
        &self,
        context: &InsightContext<'_>,
    ) -> Result<Recommendations> {
        Ok(Recommendations {
            immediate: vec!["Track every expense for the next 30 days".to_string()],
            short_term: vec![format!(
                "Automate a monthly transfer of {}",
                context.metrics.goal_timeline.monthly_contribution
            )],
            long_term: vec!["Review the plan every quarter".to_string()],
            emergency_fund: "Hold 6 months of essential expenses in liquid savings".to_string(),
            investment_strategy: format!(
                "Diversify in line with a {} risk appetite",
                context.answers.risk_taking
            ),
        })
    }
}

/// Generator that always fails, as an unreachable upstream would
#[cfg(test)]
pub(crate) struct FailingInsightGenerator;

#[cfg(test)]
#[async_trait]
impl InsightGenerator for FailingInsightGenerator {
    async fn generate_insights(&self, _context: &InsightContext<'_>) -> Result<FinancialInsights> {
        Err(AnalysisError::LlmError("upstream unavailable".to_string()))
    }

    async fn generate_recommendations(
        &self,
        _context: &InsightContext<'_>,
    ) -> Result<Recommendations> {
        Err(AnalysisError::LlmError("upstream unavailable".to_string()))
    }
}
