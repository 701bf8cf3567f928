//! Collaborator traits.
//!
//! The pipeline talks to the outside world only through these two traits, so
//! every stage can run against the in-memory fakes in [`crate::fakes`].

use async_trait::async_trait;
use killswitch_core::TextItem;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Web-scale text search.
///
/// Zero results is a valid answer, not an error.
#[async_trait]
pub trait CorpusRetrieval: Send + Sync {
    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<TextItem>>;

    /// Short name used in logs and cache keys.
    fn name(&self) -> &'static str {
        "retrieval"
    }
}

/// What an analysis request is for. Fakes use it to pick a canned response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    PainThemes,
    Competitors,
    LandingPage,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::PainThemes => "pain_themes",
            AnalysisKind::Competitors => "competitors",
            AnalysisKind::LandingPage => "landing_page",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub system: String,
    pub prompt: String,
}

/// Language model returning raw text, expected (not guaranteed) to be JSON.
#[async_trait]
pub trait LanguageAnalysis: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;

    fn name(&self) -> &'static str {
        "analysis"
    }
}
