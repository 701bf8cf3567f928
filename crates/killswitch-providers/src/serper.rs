//! Serper (Google search) corpus retrieval.

use async_trait::async_trait;
use killswitch_core::{sanitize_text, SourceKind, TextItem};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::settings::ProviderSettings;
use crate::traits::CorpusRetrieval;

pub const SERPER_BASE_URL: &str = "https://google.serper.dev";
pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";
/// Restrict results to the last six months.
pub const DEFAULT_TIME_FILTER: &str = "qdr:m6";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: String,
}

impl SearchResponse {
    /// Convert organic results to sanitized text items, dropping empty ones.
    pub fn into_items(self) -> Vec<TextItem> {
        self.organic
            .into_iter()
            .filter_map(|r| {
                let text = match (r.title.trim(), r.snippet.trim()) {
                    ("", "") => return None,
                    (title, "") => title.to_string(),
                    ("", snippet) => snippet.to_string(),
                    (title, snippet) => format!("{title} - {snippet}"),
                };
                let text = sanitize_text(&text);
                if text.is_empty() {
                    return None;
                }
                Some(match r.link {
                    Some(url) => TextItem::from_url(text, url),
                    None => TextItem::new(text, SourceKind::General),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SerperClient {
    api_key: String,
    base_url: String,
    time_filter: Option<String>,
    http: reqwest::Client,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, settings: &ProviderSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(SERPER_API_KEY_ENV));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            api_key,
            base_url: SERPER_BASE_URL.to_string(),
            time_filter: Some(DEFAULT_TIME_FILTER.to_string()),
            http,
        })
    }

    /// Build from `SERPER_API_KEY`.
    pub fn from_env(settings: &ProviderSettings) -> Result<Self> {
        let key = std::env::var(SERPER_API_KEY_ENV)
            .map_err(|_| ProviderError::MissingCredential(SERPER_API_KEY_ENV))?;
        Self::new(key, settings)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `None` searches without a recency restriction.
    pub fn with_time_filter(mut self, time_filter: Option<String>) -> Self {
        self.time_filter = time_filter;
        self
    }
}

#[async_trait]
impl CorpusRetrieval for SerperClient {
    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<TextItem>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = SearchRequest {
            q: query,
            num: result_limit,
            tbs: self.time_filter.as_deref(),
        };

        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                service: "serper",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.into_items())
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organic_results_become_items() {
        let raw = r#"{
            "searchParameters": {"q": "invoices frustrated reddit"},
            "organic": [
                {"title": "Invoicing is killing me", "link": "https://www.reddit.com/r/freelance/abc", "snippet": "I waste 6 hours a week"},
                {"title": "", "snippet": ""},
                {"title": "Best invoice apps", "link": "https://example.com/blog/invoices"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        let items = response.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "Invoicing is killing me - I waste 6 hours a week");
        assert_eq!(items[0].source, SourceKind::Reddit);
        assert_eq!(items[1].text, "Best invoice apps");
    }

    #[test]
    fn test_missing_organic_is_empty() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_items().is_empty());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = SerperClient::new("  ", &ProviderSettings::default()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(SERPER_API_KEY_ENV)));
    }
}
