//! Balancify budget analysis service
//!
//! Collects a financial profile through a multi-step questionnaire and turns it into:
//! - Locally computed budget metrics (spending breakdown, needs/wants, goal timeline)
//! - LLM-written insights and recommendations around those numbers
//! - What-if simulations and a downloadable PDF report
//!
//! FLOW:
//! QUESTIONNAIRE → VALIDATE → COMPUTE → NARRATE → PERSIST → SIMULATE / REPORT

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod questionnaire;
pub mod report;
pub mod session;
pub mod simulation;
pub mod store;
pub mod validation;

pub use error::{AnalysisError, Result};

// Re-export common types
pub use analysis::AnalysisOrchestrator;
pub use config::AppConfig;
pub use models::*;
