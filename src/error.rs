//! Error types for the budget analysis service

use serde::Serialize;
use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A single schema violation, reported back to the client field by field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {

    // =============================
    // Request Errors
    // =============================

    #[error("Invalid questionnaire data: {} issue(s)", .0.len())]
    Validation(Vec<FieldIssue>),

    #[error("Invalid simulation request: {0}")]
    InvalidSimulation(String),

    #[error("Questionnaire not found: {0}")]
    QuestionnaireNotFound(String),

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // =============================
    // Upstream / Internal Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    /// HTTP status for this error class
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AnalysisError::Validation(_) | AnalysisError::InvalidSimulation(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::QuestionnaireNotFound(_)
            | AnalysisError::AnalysisNotFound(_)
            | AnalysisError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detail payload for the `{error, details}` response body
    pub fn details(&self) -> serde_json::Value {
        match self {
            AnalysisError::Validation(issues) => {
                serde_json::to_value(issues).unwrap_or(serde_json::Value::Null)
            }
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AnalysisError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalysisError::SessionNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AnalysisError::LlmError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_are_field_level() {
        let err = AnalysisError::Validation(vec![FieldIssue::new(
            "household_size",
            "must be at least 1",
        )]);
        let details = err.details();
        assert_eq!(details[0]["field"], "household_size");
        assert_eq!(err.to_string(), "Invalid questionnaire data: 1 issue(s)");
    }
}
