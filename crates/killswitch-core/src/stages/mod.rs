//! Market, content and pricing scorers, plus the pricing survey.
//!
//! Structurally analogous to the pain scorer: each takes a stage input, produces
//! stage-specific metrics, and has an evaluator returning a
//! [`ThresholdVerdict`](crate::threshold::ThresholdVerdict).

pub mod content;
pub mod market;
pub mod pricing;
pub mod survey;

pub use content::{
    evaluate_content, ContentInput, ContentMetrics, ContentScorer, ContentThresholds,
    LandingPageDraft,
};
pub use market::{
    evaluate_market, extract_monthly_price, Competitor, MarketInput, MarketMetrics,
    MarketScorer, MarketThresholds,
};
pub use pricing::{
    evaluate_pricing, parse_wtp_answer, price_bucket, PriceBucket, PricingInput, PricingMetrics,
    PricingScorer, PricingThresholds, DEFAULT_WTP_OPTIONS,
};
pub use survey::{QuestionKind, SurveyDefinition, SurveyQuestion, SurveyResponse};
