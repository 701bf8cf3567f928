//! Shared collaborators and per-stage input.

use std::sync::Arc;

use killswitch_core::{DerivedContext, TextItem};
use killswitch_providers::{
    gather_corpus, AnalysisRequest, CorpusRetrieval, GatheredCorpus, LanguageAnalysis,
    ProviderSettings, SearchCache,
};

/// Everything a stage may call out to. Cheap to clone.
#[derive(Clone)]
pub struct Collaborators {
    pub retrieval: Arc<dyn CorpusRetrieval>,
    pub analysis: Arc<dyn LanguageAnalysis>,
    pub cache: Option<Arc<SearchCache>>,
    pub settings: ProviderSettings,
}

impl Collaborators {
    pub fn new(
        retrieval: Arc<dyn CorpusRetrieval>,
        analysis: Arc<dyn LanguageAnalysis>,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            retrieval,
            analysis,
            cache: None,
            settings,
        }
    }

    /// Share a response cache, e.g. across several sessions.
    pub fn with_cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fan the queries out and gather whatever comes back before the deadline.
    pub async fn gather(&self, queries: &[String]) -> GatheredCorpus {
        gather_corpus(
            Arc::clone(&self.retrieval),
            self.cache.clone(),
            queries,
            &self.settings,
        )
        .await
    }

    /// One analysis call under the shared retry policy.
    pub async fn analyze(&self, request: &AnalysisRequest) -> killswitch_providers::Result<String> {
        let label = format!("analysis {}", request.kind.as_str());
        self.settings
            .retry
            .run(&label, || {
                let analysis = Arc::clone(&self.analysis);
                let request = request.clone();
                async move { analysis.analyze(&request).await }
            })
            .await
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("retrieval", &self.retrieval.name())
            .field("analysis", &self.analysis.name())
            .field("cache", &self.cache.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// What a stage runner sees of the session.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub problem: &'a str,
    pub audience: &'a str,
    /// Context merged from every stage recorded so far.
    pub derived: &'a DerivedContext,
}

/// Split a search result back into a title-like name and the full text.
pub(crate) fn title_of(item: &TextItem) -> &str {
    item.text
        .split(" - ")
        .next()
        .unwrap_or(item.text.as_str())
        .trim()
}
