//! Kill Switch core library.
//!
//! Deterministic pieces of the validation pipeline: complaint classification,
//! weighted pain scoring, threshold profiles, the market/content/pricing
//! scorers and the stage orchestrator that turns four gates into one
//! viability verdict. Nothing in this crate performs network I/O.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod obs;
pub mod orchestrator;
pub mod sanitize;
pub mod scoring;
pub mod session;
pub mod stage;
pub mod stages;
pub mod telemetry;
pub mod threshold;

pub use classifier::{classify, Classifier, TierRule};
pub use config::ProfileConfig;
pub use error::{KillSwitchError, Result};
pub use export::{SessionReport, StageSummary};
pub use model::{
    ClassifiedItem, QualityRating, ScoringResult, SourceKind, TextItem, Tier, TierCounts,
};
pub use orchestrator::{viability_score, StageOrchestrator, ViabilityVerdict, ViabilityWeights};
pub use sanitize::{sanitize_text, validate_audience, validate_problem};
pub use scoring::score;
pub use session::{SessionStatus, ValidationSession};
pub use stage::{DerivedContext, StageKind, StageMetrics, StageResult, StageState};
pub use stages::{
    evaluate_content, evaluate_market, evaluate_pricing, extract_monthly_price, parse_wtp_answer,
    Competitor, ContentInput, ContentMetrics, ContentScorer, ContentThresholds, LandingPageDraft,
    MarketInput, MarketMetrics, MarketScorer, MarketThresholds, PriceBucket, PricingInput,
    PricingMetrics, PricingScorer, PricingThresholds, QuestionKind, SurveyDefinition,
    SurveyQuestion, SurveyResponse,
};
pub use telemetry::init_tracing;
pub use threshold::{
    evaluate, evaluate_all, Criterion, ProfileCriteria, ProfileName, ProfileRegistry,
    ThresholdProfile, ThresholdVerdict, TierReport, Violation,
};
