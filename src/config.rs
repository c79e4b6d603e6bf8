//! Environment-driven configuration

use crate::error::AnalysisError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::Result;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Empty when unset; analysis requests then fail with an LLM error
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the process environment.
    /// Call `dotenv::dotenv().ok()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT").or_else(|| non_empty("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AnalysisError::ConfigError(format!("invalid port '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key: non_empty("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port,
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_port_precedence() {
        assert_eq!(config(&[("API_PORT", "9000")]).unwrap().port, 9000);
        assert_eq!(
            config(&[("PORT", "7000"), ("API_PORT", "9000")]).unwrap().port,
            7000
        );
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(AnalysisError::ConfigError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
        ])
        .unwrap();
        assert!(config.has_api_key());
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
    }
}
