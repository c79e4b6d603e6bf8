//! Analysis persistence layer
//!
//! Stores submitted questionnaires, their analyses and stashed form sessions.
//! Currently in-memory only; everything is lost on restart.

use crate::models::{AnalysisResult, QuestionnaireAnswers};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuestionnaire {
    pub id: String,
    pub data: QuestionnaireAnswers,
    pub created_at: DateTime<Utc>,
}

impl StoredQuestionnaire {
    pub fn new(data: QuestionnaireAnswers) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: String,
    pub questionnaire_id: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

impl StoredAnalysis {
    pub fn new(questionnaire_id: &str, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            questionnaire_id: questionnaire_id.to_string(),
            result,
            created_at: Utc::now(),
        }
    }
}

/// Trait for analysis persistence
#[async_trait::async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save_questionnaire(&self, questionnaire: StoredQuestionnaire) -> Result<()>;
    async fn load_questionnaire(&self, id: &str) -> Result<Option<StoredQuestionnaire>>;

    /// Last write wins per questionnaire id
    async fn save_analysis(&self, analysis: StoredAnalysis) -> Result<()>;
    async fn load_analysis(&self, questionnaire_id: &str) -> Result<Option<StoredAnalysis>>;

    /// Raw, unvalidated form data parked under a session id
    async fn save_session(&self, session_id: &str, form_data: Value) -> Result<()>;
    async fn load_session(&self, session_id: &str) -> Result<Option<Value>>;
}

/// In-memory analysis store
pub struct InMemoryAnalysisStore {
    questionnaires: Arc<RwLock<HashMap<String, StoredQuestionnaire>>>,
    analyses_by_questionnaire: Arc<RwLock<HashMap<String, StoredAnalysis>>>,
    sessions: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self {
            questionnaires: Arc::new(RwLock::new(HashMap::new())),
            analyses_by_questionnaire: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save_questionnaire(&self, questionnaire: StoredQuestionnaire) -> Result<()> {
        let mut questionnaires = self.questionnaires.write().await;
        questionnaires.insert(questionnaire.id.clone(), questionnaire);
        Ok(())
    }

    async fn load_questionnaire(&self, id: &str) -> Result<Option<StoredQuestionnaire>> {
        let questionnaires = self.questionnaires.read().await;
        Ok(questionnaires.get(id).cloned())
    }

    async fn save_analysis(&self, analysis: StoredAnalysis) -> Result<()> {
        let mut analyses = self.analyses_by_questionnaire.write().await;
        analyses.insert(analysis.questionnaire_id.clone(), analysis);
        Ok(())
    }

    async fn load_analysis(&self, questionnaire_id: &str) -> Result<Option<StoredAnalysis>> {
        let analyses = self.analyses_by_questionnaire.read().await;
        Ok(analyses.get(questionnaire_id).cloned())
    }

    async fn save_session(&self, session_id: &str, form_data: Value) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), form_data);
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<Value>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }
}
