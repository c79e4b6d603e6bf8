use balancify::{
    analysis::AnalysisOrchestrator,
    insights::MockInsightGenerator,
    questionnaire::QuestionnaireFlow,
    session::{SessionRepository, SessionStore},
    simulation::{FieldOverrides, LiveSimulator, Scenario},
    store::InMemoryAnalysisStore,
    validation::create_default_validation_engine,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn demo_profile() -> Value {
    json!({
        "monthly_income": 100000,
        "side_income": "No",
        "bonus_pay": "Sometimes",
        "housing_status": "Rent",
        "housing_expenses": 20000,
        "utility_bills": 3000,
        "household_size": 2,
        "groceries_weekly": 2000,
        "dining_monthly": 2000,
        "food_ordering": "Few times a week",
        "shopping_monthly": 5000,
        "impulse_shopping": 2,
        "online_shopping": "Weekly",
        "subscriptions": ["Netflix", "Spotify"],
        "subscription_cost": 1000,
        "entertainment_hours": 10,
        "commute_cost": 1500,
        "transport_mode": "Public Transport",
        "transport_monthly": 3000,
        "has_loans": "No",
        "investment_types": ["Mutual Funds"],
        "monthly_investment": 10000,
        "financial_goals": [{
            "description": "House down payment",
            "target_amount": 500000,
            "current_amount": 0,
            "timeline_months": 60,
            "priority": "high",
            "category": "purchase"
        }],
        "track_spending": "Yes",
        "impulse_control": 3,
        "saving_behavior": 7,
        "risk_taking": "Medium",
        "expense_reduction": 6,
        "preferred_savings": 20000,
        "financial_discipline": 4
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    info!("Balancify demo starting");

    // === QUESTIONNAIRE ===
    let session: Arc<dyn SessionRepository> = Arc::new(SessionStore::in_memory());
    let mut flow = QuestionnaireFlow::start(session.clone(), Some("Demo".to_string()));
    let profile = demo_profile();
    let validator = create_default_validation_engine();

    loop {
        for field in flow.visible_fields() {
            if let Some(value) = profile.get(field.id) {
                flow.set_field(field.id, value.clone())?;
            }
        }
        println!("Step {} ({}%)", flow.current_step() + 1, flow.progress());
        if flow.is_last_step() {
            break;
        }
        flow.next();
    }

    let answers = flow.complete(&validator)?;
    info!(
        session_completed = session.load().map(|s| s.is_completed).unwrap_or(false),
        "Questionnaire completed"
    );

    // === ANALYSIS ===
    let orchestrator = AnalysisOrchestrator::new(
        Box::new(MockInsightGenerator),
        validator,
        Box::new(InMemoryAnalysisStore::new()),
    );

    let response = orchestrator.submit(&serde_json::to_value(&answers)?).await?;
    let result = &response.result;

    println!("\n=== ANALYSIS RESULT ===");
    println!("Questionnaire ID: {}", response.questionnaire_id);
    for (category, amount) in result.spending_breakdown.categories() {
        println!("  {:<15} {:>10.0}", category, amount);
    }
    println!(
        "Needs / Wants: {}% / {}%",
        result.needs_wants_analysis.needs_percentage, result.needs_wants_analysis.wants_percentage
    );
    println!(
        "Goal '{}': {} months at {:.0}/month",
        result.goal_timeline.goal_description,
        result.goal_timeline.time_to_goal,
        result.goal_timeline.monthly_contribution
    );
    println!("Insight: {}", result.insights.goal_achievability);

    // === WHAT-IF ===
    let simulator = LiveSimulator::new(answers);
    let mut updates = simulator.subscribe();
    for shopping in [4_500.0, 3_500.0, 2_500.0] {
        simulator.update(Scenario::Overrides(FieldOverrides {
            shopping_monthly: Some(shopping),
            ..Default::default()
        }));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    updates.changed().await?;

    if let Some(simulated) = updates.borrow().clone() {
        println!("\n=== WHAT-IF: shopping 2500 ===");
        println!("{}", simulated.insights.savings_impact);
        println!("{}", simulated.insights.time_to_goal);
    }

    // === REPORT ===
    let pdf = orchestrator.report(&response.questionnaire_id).await?;
    println!("\nReport: {} bytes", pdf.len());

    Ok(())
}
