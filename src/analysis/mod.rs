//! Analysis orchestrator
//!
//! VALIDATE → PERSIST → COMPUTE → NARRATE → PERSIST
//!
//! Metrics are always computed locally. The insight generator only adds
//! narrative, and any failure there fails the whole request.

use crate::error::AnalysisError;
use crate::insights::{InsightContext, InsightGenerator};
use crate::metrics::compute_metrics;
use crate::models::{AnalysisResult, QuestionnaireAnswers};
use crate::report::render_report;
use crate::simulation::{simulate, SimulationRequest, SimulationResult};
use crate::store::{AnalysisStore, StoredAnalysis, StoredQuestionnaire};
use crate::validation::ValidationEngine;
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Response for a completed submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub questionnaire_id: String,
    pub analysis_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Stored questionnaire together with its analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisLookup {
    pub questionnaire: StoredQuestionnaire,
    pub analysis: StoredAnalysis,
}

pub struct AnalysisOrchestrator {
    generator: Box<dyn InsightGenerator>,
    validator: ValidationEngine,
    store: Box<dyn AnalysisStore>,
}

impl AnalysisOrchestrator {
    pub fn new(
        generator: Box<dyn InsightGenerator>,
        validator: ValidationEngine,
        store: Box<dyn AnalysisStore>,
    ) -> Self {
        Self {
            generator,
            validator,
            store,
        }
    }

    /// Compute metrics and ask the generator for narrative around them
    pub async fn analyze(&self, answers: &QuestionnaireAnswers) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        let metrics = compute_metrics(answers);

        debug!(
            savings = metrics.spending_breakdown.savings,
            needs_percentage = metrics.needs_wants_analysis.needs_percentage,
            time_to_goal = metrics.goal_timeline.time_to_goal,
            "Metrics computed"
        );

        let context = InsightContext::new(answers, &metrics);
        let (insights, recommendations) = tokio::try_join!(
            self.generator.generate_insights(&context),
            self.generator.generate_recommendations(&context),
        )
        .map_err(|e| {
            error!("Insight generation failed: {}", e);
            e
        })?;

        info!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Analysis generated"
        );

        Ok(AnalysisResult {
            insights,
            spending_breakdown: metrics.spending_breakdown,
            needs_wants_analysis: metrics.needs_wants_analysis,
            recommendations,
            goal_timeline: metrics.goal_timeline,
            financial_goals: answers.financial_goals(),
            goal_projections: metrics.goal_projections,
            generated_at: Utc::now(),
        })
    }

    /// Validate a raw submission, analyze it and persist both sides
    pub async fn submit(&self, raw: &Value) -> Result<SubmissionResponse> {
        let answers = self.validator.validate(raw)?;
        self.persist_and_analyze(answers, None).await
    }

    async fn persist_and_analyze(
        &self,
        answers: QuestionnaireAnswers,
        session_id: Option<String>,
    ) -> Result<SubmissionResponse> {
        let questionnaire = StoredQuestionnaire::new(answers);
        let questionnaire_id = questionnaire.id.clone();
        self.store.save_questionnaire(questionnaire.clone()).await?;

        info!(questionnaire_id = %questionnaire_id, "Questionnaire stored");

        let result = self.analyze(&questionnaire.data).await?;

        let analysis = StoredAnalysis::new(&questionnaire_id, result.clone());
        let analysis_id = analysis.id.clone();
        self.store.save_analysis(analysis).await?;

        info!(
            questionnaire_id = %questionnaire_id,
            analysis_id = %analysis_id,
            "Analysis stored"
        );

        Ok(SubmissionResponse {
            questionnaire_id,
            analysis_id,
            session_id,
            result,
        })
    }

    /// Park raw form data under a new session id for a later analyze call
    pub async fn stash_session(&self, form_data: Value) -> Result<String> {
        let session_id = format!("session_{}", Uuid::new_v4().simple());
        self.store.save_session(&session_id, form_data).await?;

        info!(session_id = %session_id, "Financial session stored");
        Ok(session_id)
    }

    /// Validate and analyze a stashed session
    pub async fn analyze_session(&self, session_id: &str) -> Result<SubmissionResponse> {
        let form_data = self
            .store
            .load_session(session_id)
            .await?
            .ok_or_else(|| AnalysisError::SessionNotFound(session_id.to_string()))?;

        let answers = self.validator.validate(&form_data)?;
        self.persist_and_analyze(answers, Some(session_id.to_string()))
            .await
    }

    pub async fn get_analysis(&self, questionnaire_id: &str) -> Result<AnalysisLookup> {
        let questionnaire = self
            .store
            .load_questionnaire(questionnaire_id)
            .await?
            .ok_or_else(|| AnalysisError::QuestionnaireNotFound(questionnaire_id.to_string()))?;

        let analysis = self
            .store
            .load_analysis(questionnaire_id)
            .await?
            .ok_or_else(|| AnalysisError::AnalysisNotFound(questionnaire_id.to_string()))?;

        Ok(AnalysisLookup {
            questionnaire,
            analysis,
        })
    }

    /// What-if run against a stored questionnaire; never touches the stored data
    pub async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        let scenario = request.scenario()?;

        let questionnaire = self
            .store
            .load_questionnaire(&request.questionnaire_id)
            .await?
            .ok_or_else(|| {
                AnalysisError::QuestionnaireNotFound(request.questionnaire_id.clone())
            })?;

        let result = simulate(&questionnaire.data, &scenario);

        info!(
            questionnaire_id = %request.questionnaire_id,
            monthly_contribution = result.simulated.goal_timeline.monthly_contribution,
            time_to_goal = result.simulated.goal_timeline.time_to_goal,
            "Simulation completed"
        );

        Ok(result)
    }

    /// PDF report of the stored analysis
    pub async fn report(&self, questionnaire_id: &str) -> Result<Vec<u8>> {
        let analysis = self
            .store
            .load_analysis(questionnaire_id)
            .await?
            .ok_or_else(|| AnalysisError::AnalysisNotFound(questionnaire_id.to_string()))?;

        render_report(questionnaire_id, &analysis.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{FailingInsightGenerator, MockInsightGenerator};
    use crate::models::fixtures::sample_answers_json;
    use crate::simulation::{FieldOverrides, PercentAdjustments};
    use crate::store::InMemoryAnalysisStore;
    use crate::validation::create_default_validation_engine;
    use tokio_test::assert_ok;

    fn orchestrator(generator: Box<dyn InsightGenerator>) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(
            generator,
            create_default_validation_engine(),
            Box::new(InMemoryAnalysisStore::new()),
        )
    }

    #[tokio::test]
    async fn test_submit_persists_questionnaire_and_analysis() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        let response = assert_ok!(orchestrator.submit(&sample_answers_json()).await);

        assert_eq!(response.result.spending_breakdown.savings, 47_000.0);
        assert_eq!(response.result.goal_projections.len(), 1);
        assert_eq!(response.result.goal_projections[0].months_to_goal, 9);
        assert!(response.session_id.is_none());

        let lookup = assert_ok!(orchestrator.get_analysis(&response.questionnaire_id).await);
        assert_eq!(lookup.analysis.id, response.analysis_id);
        assert_eq!(lookup.analysis.result, response.result);
    }

    #[tokio::test]
    async fn test_invalid_submission_rejected() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        let mut raw = sample_answers_json();
        raw["household_size"] = serde_json::json!(0);

        let result = orchestrator.submit(&raw).await;
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[tokio::test]
    async fn test_generator_failure_is_fatal() {
        let orchestrator = orchestrator(Box::new(FailingInsightGenerator));
        let result = orchestrator.submit(&sample_answers_json()).await;
        assert!(matches!(result, Err(AnalysisError::LlmError(_))));
    }

    #[tokio::test]
    async fn test_two_phase_session_flow() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        let session_id = assert_ok!(orchestrator.stash_session(sample_answers_json()).await);
        assert!(session_id.starts_with("session_"));

        let response = assert_ok!(orchestrator.analyze_session(&session_id).await);
        assert_eq!(response.session_id.as_deref(), Some(session_id.as_str()));

        // stored like a regular submission
        assert_ok!(orchestrator.get_analysis(&response.questionnaire_id).await);
        assert_ok!(orchestrator.report(&response.questionnaire_id).await);
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_sessions() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        assert!(matches!(
            orchestrator.analyze_session("session_missing").await,
            Err(AnalysisError::SessionNotFound(_))
        ));

        let session_id = assert_ok!(
            orchestrator
                .stash_session(serde_json::json!({"monthly_income": 1000}))
                .await
        );
        assert!(matches!(
            orchestrator.analyze_session(&session_id).await,
            Err(AnalysisError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_lookups_for_unknown_ids() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        assert!(matches!(
            orchestrator.get_analysis("nope").await,
            Err(AnalysisError::QuestionnaireNotFound(_))
        ));
        assert!(matches!(
            orchestrator.report("nope").await,
            Err(AnalysisError::AnalysisNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_simulation_leaves_stored_data_untouched() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        let response = assert_ok!(orchestrator.submit(&sample_answers_json()).await);
        let before = assert_ok!(orchestrator.get_analysis(&response.questionnaire_id).await);

        let request = SimulationRequest {
            questionnaire_id: response.questionnaire_id.clone(),
            simulation: Some(PercentAdjustments {
                income_increase: 20.0,
                ..Default::default()
            }),
            adjustments: None,
        };
        let result = assert_ok!(orchestrator.simulate(&request).await);
        assert!(
            result.simulated.spending_breakdown.savings
                > before.analysis.result.spending_breakdown.savings
        );

        let after = assert_ok!(orchestrator.get_analysis(&response.questionnaire_id).await);
        assert_eq!(after.questionnaire, before.questionnaire);
        assert_eq!(after.analysis, before.analysis);
    }

    #[tokio::test]
    async fn test_simulation_errors() {
        let orchestrator = orchestrator(Box::new(MockInsightGenerator));
        let request = SimulationRequest {
            questionnaire_id: "nope".to_string(),
            simulation: None,
            adjustments: Some(FieldOverrides::default()),
        };
        assert!(matches!(
            orchestrator.simulate(&request).await,
            Err(AnalysisError::QuestionnaireNotFound(_))
        ));

        let request = SimulationRequest {
            adjustments: None,
            ..request
        };
        assert!(matches!(
            orchestrator.simulate(&request).await,
            Err(AnalysisError::InvalidSimulation(_))
        ));
    }
}
