#![forbid(unsafe_code)]

//! HTTP client for the hosted text-generation service.
//!
//! One blocking `generateContent` call per [`PredictionSource::generate`].
//! It is only ever invoked from a background task, never from `update`.

use std::time::Duration;

use moraqaba_core::{PredictionError, PredictionSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(15),
            api_key: None,
        }
    }
}

impl GeminiConfig {
    pub fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    }
}

/// Text of the first candidate, parts concatenated. No text yields `""`.
pub fn parse_response(body: &str) -> Result<String, PredictionError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| PredictionError::Decode(e.to_string()))?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, PredictionError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl PredictionSource for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, PredictionError> {
        let Some(key) = self.config.api_key.as_deref() else {
            return Err(PredictionError::MissingCredential);
        };
        let _span = info_span!("gemini.generate", model = %self.config.model).entered();

        let response = self
            .http
            .post(self.config.url())
            .header("x-goog-api-key", key)
            .json(&request_body(prompt))
            .send()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "text generation request rejected");
            return Err(PredictionError::Status {
                code: status.as_u16(),
                body,
            });
        }
        debug!(bytes = body.len(), "text generation response received");
        parse_response(&body)
    }
}

/// Source used when the HTTP client could not be built: every call fails
/// with the construction error, so the fallback text is shown.
#[derive(Debug, Clone)]
pub struct Unavailable(pub PredictionError);

impl PredictionSource for Unavailable {
    fn generate(&self, _prompt: &str) -> Result<String, PredictionError> {
        Err(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_model() {
        let cfg = GeminiConfig {
            endpoint: "http://localhost:9000/".into(),
            ..GeminiConfig::default()
        };
        assert_eq!(
            cfg.url(),
            "http://localhost:9000/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let json = serde_json::to_value(request_body("bonjour")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "contents": [ { "parts": [ { "text": "bonjour" } ] } ] })
        );
    }

    #[test]
    fn parse_concatenates_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"Hausse "},{"text":"attendue."}]}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(parse_response(body).unwrap(), "Hausse attendue.");
    }

    #[test]
    fn parse_missing_text_is_empty() {
        assert_eq!(parse_response("{}").unwrap(), "");
        assert_eq!(parse_response(r#"{"candidates":[{}]}"#).unwrap(), "");
        assert_eq!(
            parse_response(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_response("<html>"),
            Err(PredictionError::Decode(_))
        ));
    }

    #[test]
    fn missing_key_fails_without_network() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "http://127.0.0.1:1".into(),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.generate("x"),
            Err(PredictionError::MissingCredential)
        );
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "http://127.0.0.1:1".into(),
            timeout: Duration::from_millis(500),
            api_key: Some("k".into()),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert!(matches!(
            client.generate("x"),
            Err(PredictionError::Transport(_))
        ));
    }
}
