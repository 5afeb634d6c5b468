//! Gemini `generateContent` REST client.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::prompt;
use super::types::{GameMode, PlayStyle, SensitivityResponse, StrategyResponse};
use super::Generator;
use crate::config::Config;
use crate::error::GenerationError;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Build a client from config. A missing key yields `NotConfigured`.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::NotConfigured)?;
        Self::new(
            key,
            config.api_base_url.as_str(),
            config.model.as_str(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one prompt and return the raw JSON text of the first candidate
    pub fn generate(&self, prompt: &str, schema: Value) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });

        tracing::debug!(model = %self.model, "sending generation request");
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "generation request rejected");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        parsed.into_text().ok_or(GenerationError::Empty)
    }
}

impl Generator for GeminiClient {
    fn tactical_brief(
        &self,
        mode: GameMode,
        style: PlayStyle,
    ) -> Result<StrategyResponse, GenerationError> {
        let text = self.generate(
            &prompt::tactical_brief(mode, style),
            prompt::tactical_brief_schema(),
        )?;
        StrategyResponse::from_payload(&text)
    }

    fn sensitivity_config(&self, device_model: &str) -> Result<SensitivityResponse, GenerationError> {
        let text = self.generate(
            &prompt::sensitivity_config(device_model),
            prompt::sensitivity_schema(),
        )?;
        SensitivityResponse::from_payload(&text, prompt::device_or_fallback(device_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_key_is_not_configured() {
        let config = Config::default();
        assert_matches!(
            GeminiClient::from_config(&config),
            Err(GenerationError::NotConfigured)
        );
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = GeminiClient::new(
            "k",
            "http://localhost:1234/",
            "gemini-2.5-flash",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn first_candidate_text_is_used() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{}"}]}},
                      {"content":{"parts":[{"text":"other"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("{}"));
    }

    #[test]
    fn blank_or_missing_candidates_are_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.into_text(), None);
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert_eq!(parsed.into_text(), None);
    }
}
