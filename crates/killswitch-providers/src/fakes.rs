//! In-memory collaborators for tests and offline runs.
//!
//! `MemoryRetrieval` answers searches from a query → items table and can be
//! told to fail or stall on specific queries. `ScriptedAnalysis` returns a
//! canned response per [`AnalysisKind`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use killswitch_core::TextItem;

use crate::error::{ProviderError, Result};
use crate::traits::{AnalysisKind, AnalysisRequest, CorpusRetrieval, LanguageAnalysis};

// ---------------------------------------------------------------------------
// MemoryRetrieval
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryRetrieval {
    results: HashMap<String, Vec<TextItem>>,
    /// Returned for queries with no explicit entry.
    default_items: Vec<TextItem>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MemoryRetrieval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: impl Into<String>, items: Vec<TextItem>) -> Self {
        self.results.insert(query.into(), items);
        self
    }

    /// Items returned for every query without an explicit entry.
    pub fn with_default_items(mut self, items: Vec<TextItem>) -> Self {
        self.default_items = items;
        self
    }

    /// Make `query` fail with a retryable 503.
    pub fn failing(mut self, query: impl Into<String>) -> Self {
        self.failing.insert(query.into());
        self
    }

    /// Make `query` take `delay` before answering.
    pub fn delayed(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(query.into(), delay);
        self
    }

    /// Number of `search` calls made, retries included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries_seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CorpusRetrieval for MemoryRetrieval {
    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<TextItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(query.to_string());
        }
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(ProviderError::Status {
                service: "memory",
                status: 503,
                body: format!("query '{query}' is configured to fail"),
            });
        }
        let items = self.results.get(query).unwrap_or(&self.default_items);
        Ok(items.iter().take(result_limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// ScriptedAnalysis
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ScriptedAnalysis {
    responses: HashMap<AnalysisKind, String>,
    failing: HashSet<AnalysisKind>,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, kind: AnalysisKind, response: impl Into<String>) -> Self {
        self.responses.insert(kind, response.into());
        self
    }

    pub fn failing(mut self, kind: AnalysisKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageAnalysis for ScriptedAnalysis {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.failing.contains(&request.kind) {
            return Err(ProviderError::Status {
                service: "scripted",
                status: 500,
                body: "scripted failure".to_string(),
            });
        }
        // Unscripted kinds answer with an empty object, which parses to defaults.
        Ok(self
            .responses
            .get(&request.kind)
            .cloned()
            .unwrap_or_else(|| "{}".to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use killswitch_core::SourceKind;

    #[tokio::test]
    async fn test_memory_retrieval_lookup_and_limit() {
        let items: Vec<TextItem> = (0..5)
            .map(|i| TextItem::new(format!("item {i}"), SourceKind::Forum))
            .collect();
        let retrieval = MemoryRetrieval::new()
            .with_results("q1", items)
            .failing("bad");

        assert_eq!(retrieval.search("q1", 3).await.unwrap().len(), 3);
        assert!(retrieval.search("unknown", 10).await.unwrap().is_empty());
        assert!(retrieval.search("bad", 10).await.unwrap_err().is_retryable());
        assert_eq!(retrieval.calls(), 3);
        assert_eq!(retrieval.queries_seen(), vec!["q1", "unknown", "bad"]);
    }

    #[tokio::test]
    async fn test_scripted_analysis() {
        let analysis = ScriptedAnalysis::new()
            .respond(AnalysisKind::PainThemes, r#"{"themes": ["x"]}"#)
            .failing(AnalysisKind::LandingPage);
        let request = |kind| AnalysisRequest {
            kind,
            system: String::new(),
            prompt: "p".into(),
        };
        assert_eq!(
            analysis.analyze(&request(AnalysisKind::PainThemes)).await.unwrap(),
            r#"{"themes": ["x"]}"#
        );
        assert_eq!(analysis.analyze(&request(AnalysisKind::Competitors)).await.unwrap(), "{}");
        assert!(analysis.analyze(&request(AnalysisKind::LandingPage)).await.is_err());
        assert_eq!(analysis.requests().len(), 3);
    }
}
