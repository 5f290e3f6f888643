//! Assistant configuration
//!
//! Defaults live on each struct; `AssistantConfig::from_env` overlays
//! values from the process environment (and a `.env` file if present).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },
}

/// Configuration for the Gemini text-generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiConfig {
    /// API key, if supplied directly rather than through the credential store
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL for API (default: https://generativelanguage.googleapis.com)
    pub base_url: String,

    /// Model to use (default: gemini-1.5-flash)
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries on HTTP 429 before giving up
    pub max_retries: u32,

    /// Maximum characters of document context forwarded with a prompt
    pub max_context_chars: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
            max_retries: 3,
            max_context_chars: 4000,
        }
    }
}

/// Tunables for turning a response into a document write
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterializeConfig {
    /// Leading words that mark a chatty first line ("Sure, here is...")
    pub preamble_tokens: Vec<String>,

    /// Only treat a token as preamble when a word boundary follows it
    pub preamble_whole_word: bool,

    /// Words that turn a spreadsheet response into a chart request
    pub chart_keywords: Vec<String>,

    /// Localized words selecting a line chart (besides "line")
    pub line_synonyms: Vec<String>,

    /// Localized words selecting a bar chart (besides "bar")
    pub bar_synonyms: Vec<String>,

    /// Prefixes the chat layer puts on error replies; never written to a document
    pub error_markers: Vec<String>,

    /// Labels stripped from the first line of a single-slide response
    pub title_labels: Vec<String>,

    pub chart_title: String,

    /// Placeholder title for slides that came back without one
    pub untitled_slide: String,

    /// Insert text-editor responses as rich text first
    pub prefer_rich_text: bool,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            preamble_tokens: vec!["sure".to_string(), "here".to_string()],
            preamble_whole_word: false,
            chart_keywords: vec!["chart".to_string(), "grafik".to_string()],
            line_synonyms: vec!["çizgi".to_string()],
            bar_synonyms: vec!["çubuk".to_string()],
            error_markers: vec!["❌".to_string(), "⚠️".to_string()],
            title_labels: vec!["title".to_string(), "başlık".to_string()],
            chart_title: "Generated Chart".to_string(),
            untitled_slide: "No Title".to_string(),
            prefer_rich_text: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantConfig {
    pub gemini: GeminiConfig,
    pub materialize: MaterializeConfig,
}

impl AssistantConfig {
    /// Build a config from defaults plus environment overrides
    ///
    /// Reads `.env` first (missing file is fine), then:
    /// `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`,
    /// `GEMINI_TIMEOUT_SECS`, `OFFICE_ASSISTANT_MAX_CONTEXT_CHARS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` but with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            config.gemini.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            config.gemini.model = model.trim().to_string();
        }
        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            config.gemini.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = non_empty("GEMINI_TIMEOUT_SECS") {
            config.gemini.timeout_secs = parse_number("GEMINI_TIMEOUT_SECS", &secs)?;
        }
        if let Some(chars) = non_empty("OFFICE_ASSISTANT_MAX_CONTEXT_CHARS") {
            config.gemini.max_context_chars =
                parse_number("OFFICE_ASSISTANT_MAX_CONTEXT_CHARS", &chars)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var: var.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AssistantConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.materialize.chart_title, "Generated Chart");
    }

    #[test]
    fn test_env_overrides() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", " abc123 "),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_BASE_URL", "http://localhost:8080/"),
            ("GEMINI_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.base_url, "http://localhost:8080");
        assert_eq!(config.gemini.timeout_secs, 15);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = AssistantConfig::from_lookup(lookup_from(&[("GEMINI_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "GEMINI_TIMEOUT_SECS".to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let config: MaterializeConfig =
            serde_json::from_str(r#"{"chartTitle": "Sales"}"#).unwrap();
        assert_eq!(config.chart_title, "Sales");
        assert_eq!(config.untitled_slide, "No Title");
    }
}
