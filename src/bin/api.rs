use balancify::{
    analysis::AnalysisOrchestrator,
    api::start_server,
    config::AppConfig,
    gemini::GeminiClient,
    insights::GeminiInsightGenerator,
    store::InMemoryAnalysisStore,
    validation::create_default_validation_engine,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    if !config.has_api_key() {
        warn!("GEMINI_API_KEY not set; analysis requests will fail until it is configured");
    }

    info!("Balancify - API Server");
    info!(port = config.port, model = %config.gemini_model, "Configuration loaded");

    // Create components
    let client = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    )?;
    let generator = Box::new(GeminiInsightGenerator::new(client));
    let validator = create_default_validation_engine();
    let store = Box::new(InMemoryAnalysisStore::new());

    let orchestrator = Arc::new(AnalysisOrchestrator::new(generator, validator, store));

    info!("Orchestrator initialized, starting API server");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
