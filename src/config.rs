//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Classifier API key (`API_KEY`, falling back to `GEMINI_API_KEY`)
    pub api_key: Option<String>,

    /// Gemini model name
    pub model: String,

    /// Gemini API base URL
    pub api_base: String,

    /// Per-call classifier timeout in seconds
    pub classifier_timeout_secs: u64,

    /// Generation temperature
    pub temperature: f32,

    /// Generation token cap
    pub max_output_tokens: u32,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            classifier_timeout_secs: 30,
            temperature: 0.1,
            max_output_tokens: 1000,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            api_key: non_blank("API_KEY").or_else(|| non_blank("GEMINI_API_KEY")),

            model: non_blank("GEMINI_MODEL").unwrap_or(defaults.model),

            api_base: non_blank("GEMINI_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),

            classifier_timeout_secs: env::var("CLASSIFIER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.classifier_timeout_secs),

            temperature: env::var("CLASSIFIER_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.temperature),

            max_output_tokens: env::var("CLASSIFIER_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.max_output_tokens),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if a classifier credential is present
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_blank(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
