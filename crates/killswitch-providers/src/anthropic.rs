//! Anthropic Messages API as a [`LanguageAnalysis`] provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::settings::ProviderSettings;
use crate::traits::{AnalysisRequest, LanguageAnalysis};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl MessagesResponse {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, settings: &ProviderSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(ANTHROPIC_API_KEY_ENV));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            http,
        })
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env(settings: &ProviderSettings) -> Result<Self> {
        let key = std::env::var(ANTHROPIC_API_KEY_ENV)
            .map_err(|_| ProviderError::MissingCredential(ANTHROPIC_API_KEY_ENV))?;
        Self::new(key, settings)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageAnalysis for AnthropicClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: Some(request.system.as_str()).filter(|s| !s.is_empty()),
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                service: "anthropic",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(parsed.text())
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::AnalysisKind;

    #[test]
    fn test_response_text_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "{\"themes\": "},
                {"type": "tool_use", "id": "t1"},
                {"type": "text", "text": "[\"a\"]}"}
            ],
            "stop_reason": "end_turn"
        }"#;
        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text(), "{\"themes\": [\"a\"]}");
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = AnalysisRequest {
            kind: AnalysisKind::PainThemes,
            system: String::new(),
            prompt: "analyze".into(),
        };
        let body = MessagesRequest {
            model: DEFAULT_MODEL,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system: Some(request.system.as_str()).filter(|s| !s.is_empty()),
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("system").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "analyze");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = AnthropicClient::new("", &ProviderSettings::default()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(ANTHROPIC_API_KEY_ENV)));
    }
}
