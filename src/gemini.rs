//! Gemini API client for structured JSON generation
//!
//! Uses a long-lived reqwest::Client for connection pooling.
//! Every call asks for `application/json` output constrained by a response schema.

use crate::error::AnalysisError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Generate a JSON document matching `response_schema`; returns the raw text
    pub async fn generate_json(
        &self,
        prompt: &str,
        response_schema: serde_json::Value,
    ) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(AnalysisError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        };

        info!(model = %self.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                AnalysisError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(AnalysisError::LlmError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AnalysisError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        let text = gemini_response.first_text().ok_or_else(|| {
            AnalysisError::LlmError("Empty response from AI model".to_string())
        })?;

        info!(model = %self.model, bytes = text.len(), "Gemini response received");

        Ok(text)
    }
}

/// Strip an optional ```json fence around a model response
pub fn clean_json_response(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|part| part.text.clone())
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "Analyze this financial profile".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: json!({"type": "object"}),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "object");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Analyze this financial profile");
    }

    #[test]
    fn test_first_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":1}"}]}}]
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("{\"a\":1}"));

        let empty: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(empty.first_text().is_none());

        let blank: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "  "}]}}]
        }))
        .unwrap();
        assert!(blank.first_text().is_none());
    }

    #[test]
    fn test_clean_json_response() {
        assert_eq!(clean_json_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_response("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("k", DEFAULT_MODEL, "http://localhost:9/v1beta/").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let client = GeminiClient::new("", DEFAULT_MODEL, DEFAULT_BASE_URL).unwrap();
        let result = client.generate_json("hi", json!({})).await;
        assert!(matches!(result, Err(AnalysisError::LlmError(_))));
    }
}
