//! Pricing stage scorer: willingness to pay from survey answers.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::survey::SurveyResponse;
use crate::threshold::{check_min, Criterion, ThresholdVerdict};

/// Answer options offered by the default survey.
pub const DEFAULT_WTP_OPTIONS: [&str; 5] = ["$0-25", "$25-50", "$50-100", "$100-250", "$250+"];

/// Upper bounds (exclusive) of each option in [`DEFAULT_WTP_OPTIONS`]; the
/// last option is open-ended.
const WTP_BUCKET_BOUNDS: [f64; 4] = [25.0, 50.0, 100.0, 250.0];

const TOP_FEATURES: usize = 5;

const ZERO_ANSWERS: &[&str] = &["nothing", "none", "free", "zero", "no", "n/a", "wouldn't pay", "would not pay"];

fn amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:,\d{3})*(?:\.\d+)?").expect("amount pattern is valid"))
}

/// Parse a willingness-to-pay answer into a monthly price.
///
/// Ranges (`"$50-100"`) map to their midpoint, open-ended answers (`"$250+"`)
/// to their lower bound, bare numbers to themselves and refusals
/// (`"Nothing"`) to zero. Unparseable answers yield `None`.
pub fn parse_wtp_answer(answer: &str) -> Option<f64> {
    let normalized = answer.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if ZERO_ANSWERS.contains(&normalized.as_str()) {
        return Some(0.0);
    }

    let values: Vec<f64> = amount()
        .find_iter(&normalized)
        .filter_map(|m| m.as_str().replace(',', "").parse().ok())
        .collect();

    match values.as_slice() {
        [] => None,
        [single] => Some(*single),
        [low, high, ..] => Some((low + high) / 2.0),
    }
}

/// The default survey option a price falls into.
pub fn price_bucket(price: f64) -> &'static str {
    WTP_BUCKET_BOUNDS
        .iter()
        .position(|bound| price < *bound)
        .map_or(DEFAULT_WTP_OPTIONS[DEFAULT_WTP_OPTIONS.len() - 1], |i| {
            DEFAULT_WTP_OPTIONS[i]
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PricingInput {
    /// Raw survey answers to the willingness-to-pay question.
    pub answers: Vec<String>,
    /// Every feature picked by every respondent, in response order.
    #[serde(default)]
    pub feature_picks: Vec<String>,
}

impl PricingInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            feature_picks: Vec::new(),
        }
    }

    pub fn from_responses(responses: &[SurveyResponse]) -> Self {
        Self {
            answers: responses
                .iter()
                .map(|r| r.willingness_to_pay.clone())
                .collect(),
            feature_picks: responses
                .iter()
                .flat_map(|r| r.top_features.iter().cloned())
                .collect(),
        }
    }

    pub fn with_feature_picks<I, S>(mut self, picks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_picks = picks.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Respondents per survey option.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBucket {
    pub option: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PricingMetrics {
    pub responses: u32,
    /// Answers that could be parsed to a price.
    pub valid_responses: u32,
    pub avg_wtp: f64,
    pub median_wtp: f64,
    /// Percentage (0–100) of valid responses at or above the price floor.
    pub pct_above_floor: f64,
    pub recommended_price: f64,
    #[serde(default)]
    pub min_wtp: f64,
    #[serde(default)]
    pub max_wtp: f64,
    /// Counts for every default survey option, in option order.
    #[serde(default)]
    pub price_distribution: Vec<PriceBucket>,
    /// Most-picked features, most popular first.
    #[serde(default)]
    pub top_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PricingThresholds {
    pub min_avg_wtp: f64,
    pub min_pct_above_floor: f64,
    pub price_floor: f64,
}

impl Default for PricingThresholds {
    fn default() -> Self {
        Self {
            min_avg_wtp: 50.0,
            min_pct_above_floor: 30.0,
            price_floor: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingScorer {
    price_floor: f64,
}

impl Default for PricingScorer {
    fn default() -> Self {
        Self::new(PricingThresholds::default().price_floor)
    }
}

impl PricingScorer {
    pub fn new(price_floor: f64) -> Self {
        Self { price_floor }
    }

    pub fn score(&self, input: &PricingInput) -> PricingMetrics {
        let mut prices: Vec<f64> = input
            .answers
            .iter()
            .filter_map(|a| parse_wtp_answer(a))
            .collect();
        prices.sort_by(f64::total_cmp);

        let responses = input.answers.len() as u32;
        let top_features = top_features(&input.feature_picks);
        if prices.is_empty() {
            return PricingMetrics {
                responses,
                price_distribution: distribution(&prices),
                top_features,
                ..PricingMetrics::default()
            };
        }

        let n = prices.len() as f64;
        let avg_wtp = prices.iter().sum::<f64>() / n;
        let median_wtp = median(&prices);
        let above = prices.iter().filter(|p| **p >= self.price_floor).count() as f64;

        PricingMetrics {
            responses,
            valid_responses: prices.len() as u32,
            avg_wtp,
            median_wtp,
            pct_above_floor: above / n * 100.0,
            recommended_price: recommended_price(median_wtp, self.price_floor),
            min_wtp: prices[0],
            max_wtp: prices[prices.len() - 1],
            price_distribution: distribution(&prices),
            top_features,
        }
    }

    /// Stage score on 0–10: half from average WTP relative to twice the floor,
    /// half from the share of respondents above the floor.
    pub fn stage_score(&self, metrics: &PricingMetrics) -> f64 {
        let price = if self.price_floor > 0.0 {
            (metrics.avg_wtp / (2.0 * self.price_floor)).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let share = (metrics.pct_above_floor / 100.0).clamp(0.0, 1.0);
        10.0 * (0.5 * price + 0.5 * share)
    }
}

fn distribution(prices: &[f64]) -> Vec<PriceBucket> {
    DEFAULT_WTP_OPTIONS
        .iter()
        .map(|option| PriceBucket {
            option: option.to_string(),
            count: prices.iter().filter(|p| price_bucket(**p) == *option).count() as u32,
        })
        .collect()
}

/// Ties keep first-seen order.
fn top_features(picks: &[String]) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for pick in picks.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match counts.iter_mut().find(|(name, _)| *name == pick) {
            Some((_, n)) => *n += 1,
            None => counts.push((pick, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_FEATURES)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median rounded up to the next `…9` price point, never below the floor.
fn recommended_price(median: f64, floor: f64) -> f64 {
    let anchored = median.max(floor);
    ((anchored + 1.0) / 10.0).ceil() * 10.0 - 1.0
}

/// Evaluate pricing metrics: average WTP, then share above the floor.
pub fn evaluate_pricing(
    metrics: &PricingMetrics,
    thresholds: &PricingThresholds,
) -> ThresholdVerdict {
    ThresholdVerdict::first_violation(
        [
            check_min(
                Criterion::AvgWillingnessToPay,
                metrics.avg_wtp,
                Some(thresholds.min_avg_wtp),
            ),
            check_min(
                Criterion::PctAboveFloor,
                metrics.pct_above_floor,
                Some(thresholds.min_pct_above_floor),
            ),
        ],
        format!(
            "average willingness to pay ${:.2}/month, {:.1}% above ${:.0}",
            metrics.avg_wtp, metrics.pct_above_floor, thresholds.price_floor
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wtp_answer_formats() {
        assert_eq!(parse_wtp_answer("$50-100"), Some(75.0));
        assert_eq!(parse_wtp_answer("$0-25"), Some(12.5));
        assert_eq!(parse_wtp_answer("$250+"), Some(250.0));
        assert_eq!(parse_wtp_answer("Nothing"), Some(0.0));
        assert_eq!(parse_wtp_answer("75"), Some(75.0));
        assert_eq!(parse_wtp_answer("$1,000 per month"), Some(1000.0));
        assert_eq!(parse_wtp_answer("not sure"), None);
        assert_eq!(parse_wtp_answer(""), None);
    }

    #[test]
    fn test_score_computes_distribution() {
        let input = PricingInput::new(["$50-100", "$100-250", "$25-50", "Nothing", "maybe"]);
        let m = PricingScorer::default().score(&input);
        assert_eq!(m.responses, 5);
        assert_eq!(m.valid_responses, 4);
        // 75, 175, 37.5, 0
        assert!((m.avg_wtp - 71.875).abs() < 1e-9);
        assert!((m.median_wtp - 56.25).abs() < 1e-9);
        assert_eq!(m.pct_above_floor, 50.0);
        assert_eq!(m.recommended_price, 59.0);
        assert!(evaluate_pricing(&m, &PricingThresholds::default()).passed);
    }

    #[test]
    fn test_score_reports_range_and_distribution() {
        let input = PricingInput::new(["$50-100", "$100-250", "$25-50", "Nothing", "$250+", "$50-100"]);
        let m = PricingScorer::default().score(&input);
        assert_eq!(m.min_wtp, 0.0);
        assert_eq!(m.max_wtp, 250.0);

        let counts: Vec<(&str, u32)> = m
            .price_distribution
            .iter()
            .map(|b| (b.option.as_str(), b.count))
            .collect();
        assert_eq!(
            counts,
            vec![("$0-25", 1), ("$25-50", 1), ("$50-100", 2), ("$100-250", 1), ("$250+", 1)]
        );
    }

    #[test]
    fn test_price_bucket_edges() {
        assert_eq!(price_bucket(0.0), "$0-25");
        assert_eq!(price_bucket(25.0), "$25-50");
        assert_eq!(price_bucket(99.99), "$50-100");
        assert_eq!(price_bucket(249.0), "$100-250");
        assert_eq!(price_bucket(1000.0), "$250+");
    }

    #[test]
    fn test_top_features_from_responses() {
        let responses = vec![
            SurveyResponse::new("$50-100").with_features(["Automation", "Integration", "Security"]),
            SurveyResponse::new("$25-50").with_features(["Integration", "Reporting"]),
            SurveyResponse::new("$100-250").with_features(["Automation", "Integration", "Support"]),
        ];
        let input = PricingInput::from_responses(&responses);
        assert_eq!(input.answers.len(), 3);

        let m = PricingScorer::default().score(&input);
        assert_eq!(
            m.top_features,
            vec!["Integration", "Automation", "Security", "Reporting", "Support"]
        );
    }

    #[test]
    fn test_metrics_without_breakdown_still_deserialize() {
        let json = r#"{"responses":2,"valid_responses":2,"avg_wtp":60.0,"median_wtp":60.0,
            "pct_above_floor":50.0,"recommended_price":59.0}"#;
        let m: PricingMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.avg_wtp, 60.0);
        assert!(m.price_distribution.is_empty());
    }

    #[test]
    fn test_low_wtp_is_killed() {
        let input = PricingInput::new(["$0-25", "$25-50", "$0-25", "$50-100"]);
        let m = PricingScorer::default().score(&input);
        let verdict = evaluate_pricing(&m, &PricingThresholds::default());
        assert!(!verdict.passed);
        assert_eq!(verdict.failed_criterion(), Some(Criterion::AvgWillingnessToPay));
        assert!(verdict.reason.starts_with("avg_willingness_to_pay"));
    }

    #[test]
    fn test_no_answers() {
        let m = PricingScorer::default().score(&PricingInput::default());
        assert_eq!(m.avg_wtp, 0.0);
        assert_eq!(m.price_distribution.len(), DEFAULT_WTP_OPTIONS.len());
        assert!(m.price_distribution.iter().all(|b| b.count == 0));
        assert_eq!(PricingScorer::default().stage_score(&m), 0.0);
    }

    #[test]
    fn test_stage_score_bounds() {
        let scorer = PricingScorer::default();
        let top = PricingMetrics {
            avg_wtp: 400.0,
            pct_above_floor: 100.0,
            ..PricingMetrics::default()
        };
        assert_eq!(scorer.stage_score(&top), 10.0);
    }
}
