//! External collaborators for the Kill Switch pipeline.
//!
//! Corpus retrieval and language analysis sit behind the traits in
//! [`traits`]; this crate supplies HTTP implementations (Serper, Anthropic),
//! in-memory fakes, the shared retry policy, a query-keyed response cache,
//! bounded scatter/gather retrieval and lenient parsing of model output.

pub mod analysis;
pub mod anthropic;
pub mod cache;
pub mod error;
pub mod fakes;
pub mod queries;
pub mod retrieval;
pub mod retry;
pub mod serper;
pub mod settings;
pub mod traits;

pub use analysis::{
    competitor_analysis_request, landing_page_request, pain_analysis_request, parse_competitors,
    parse_landing_page, parse_lenient, parse_pain_analysis, strip_json_wrapping,
    CompetitorAnalysis, PainAnalysis,
};
pub use anthropic::AnthropicClient;
pub use cache::QueryCache;
pub use error::{ProviderError, Result};
pub use queries::{competitor_queries, complaint_queries, search_base};
pub use retrieval::{gather_corpus, GatheredCorpus, SearchCache};
pub use retry::RetryPolicy;
pub use serper::SerperClient;
pub use settings::ProviderSettings;
pub use traits::{AnalysisKind, AnalysisRequest, CorpusRetrieval, LanguageAnalysis};
