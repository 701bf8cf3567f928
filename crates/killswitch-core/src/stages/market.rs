//! Market stage scorer: competitor pricing and opportunity.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::threshold::{check_min, Criterion, ThresholdVerdict};

/// Lowest price accepted as a real monthly price.
pub const MIN_REALISTIC_PRICE: f64 = 5.0;
/// Highest price accepted as a real monthly price.
pub const MAX_REALISTIC_PRICE: f64 = 10_000.0;

/// A competing product found during market research.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Competitor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<f64>,
}

impl Competitor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_price(mut self, monthly_price: f64) -> Self {
        self.monthly_price = Some(monthly_price);
        self
    }

    /// Known price, or one extracted from the description.
    pub fn effective_price(&self) -> Option<f64> {
        self.monthly_price
            .filter(|p| (MIN_REALISTIC_PRICE..=MAX_REALISTIC_PRICE).contains(p))
            .or_else(|| extract_monthly_price(&self.description))
    }
}

/// Input to the market scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarketInput {
    pub competitors: Vec<Competitor>,
    /// Unmet needs identified in competitor offerings.
    #[serde(default)]
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarketMetrics {
    pub competitors_found: u32,
    /// Competitors charging at or above the price floor.
    pub paying_competitors: u32,
    /// Mean monthly price over competitors with a known price; 0 when none.
    pub avg_monthly_price: f64,
    /// 0–10.
    pub opportunity_score: f64,
    pub gaps: Vec<String>,
    pub top_competitors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MarketThresholds {
    pub min_paying_competitors: u32,
    pub min_avg_monthly_price: f64,
    pub min_opportunity_score: f64,
    /// Price at or above which a competitor counts as paying.
    pub paying_price_floor: f64,
}

impl Default for MarketThresholds {
    fn default() -> Self {
        Self {
            min_paying_competitors: 3,
            min_avg_monthly_price: 50.0,
            min_opportunity_score: 6.0,
            paying_price_floor: 50.0,
        }
    }
}

fn price_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        const NUM: &str = r"(\d+(?:,\d{3})*(?:\.\d+)?)";
        [
            format!(r"(?i)\${NUM}\s*(?:per\s*|/\s*|a\s+)?(?:month|mo)\b"),
            format!(r"(?i)\b{NUM}\s*usd\s*(?:per\s*|/\s*)?(?:month|mo)\b"),
            format!(r"(?i)\${NUM}\s*(?:per\s*|/\s*)user"),
            format!(r"(?i)(?:plans\s+|pricing\s+)?(?:starting|starts)\s+at\s+\${NUM}"),
            format!(r"(?i)\bfrom\s+\${NUM}"),
            format!(r"(?i)\${NUM}\s*-\s*\$\d"),
            format!(r"(?i)between\s+\${NUM}\s+(?:and|to)\s+\$\d"),
            format!(r"(?i)\bcosts?\s+\${NUM}"),
            format!(r"(?i)\bpriced?\s+at\s+\${NUM}"),
            format!(r"(?i)\${NUM}\s*(?:for|per)\b"),
        ]
        .iter()
        .map(|p| Regex::new(p).expect("price pattern is valid"))
        .collect()
    })
}

fn bare_dollar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(\d+(?:,\d{3})*(?:\.\d+)?)").expect("dollar pattern is valid")
    })
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Extract a realistic monthly price from free text.
///
/// Patterns are tried from most to least specific (explicit monthly price,
/// per-user, "starting at", ranges taking the lower bound, "costs"); a bare
/// dollar amount is the last resort. Prices outside $5–$10,000 are ignored.
pub fn extract_monthly_price(text: &str) -> Option<f64> {
    let realistic = |p: &f64| (MIN_REALISTIC_PRICE..=MAX_REALISTIC_PRICE).contains(p);

    price_patterns()
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str())))
        .find(realistic)
        .or_else(|| {
            bare_dollar()
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str())))
                .find(realistic)
        })
}

/// Deterministic market scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketScorer {
    paying_price_floor: f64,
}

impl Default for MarketScorer {
    fn default() -> Self {
        Self::new(MarketThresholds::default().paying_price_floor)
    }
}

impl MarketScorer {
    pub fn new(paying_price_floor: f64) -> Self {
        Self { paying_price_floor }
    }

    /// Score a competitor set. Competitors are deduplicated by case-insensitive name.
    pub fn score(&self, input: &MarketInput) -> MarketMetrics {
        let mut seen = HashSet::new();
        let competitors: Vec<&Competitor> = input
            .competitors
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .filter(|c| seen.insert(c.name.trim().to_lowercase()))
            .collect();

        let prices: Vec<f64> = competitors.iter().filter_map(|c| c.effective_price()).collect();
        let paying = prices.iter().filter(|p| **p >= self.paying_price_floor).count() as u32;
        let avg_monthly_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        let gaps: Vec<String> = input
            .gaps
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();

        MarketMetrics {
            competitors_found: competitors.len() as u32,
            paying_competitors: paying,
            avg_monthly_price,
            opportunity_score: opportunity_score(paying, avg_monthly_price, gaps.len()),
            top_competitors: competitors.iter().take(5).map(|c| c.name.clone()).collect(),
            gaps,
        }
    }
}

/// Opportunity on a 0–10 scale: paying-competitor density proves demand (4),
/// price level proves willingness to pay (3), identified gaps leave room to
/// differentiate (3).
pub fn opportunity_score(paying_competitors: u32, avg_monthly_price: f64, gaps: usize) -> f64 {
    let demand = (f64::from(paying_competitors) / 5.0).min(1.0) * 4.0;
    let price = (avg_monthly_price / 100.0).clamp(0.0, 1.0) * 3.0;
    let room = (gaps as f64 / 3.0).min(1.0) * 3.0;
    ((demand + price + room) * 10.0).round() / 10.0
}

/// Evaluate market metrics: paying competitors, then average price, then opportunity.
pub fn evaluate_market(metrics: &MarketMetrics, thresholds: &MarketThresholds) -> ThresholdVerdict {
    ThresholdVerdict::first_violation(
        [
            check_min(
                Criterion::PayingCompetitors,
                f64::from(metrics.paying_competitors),
                Some(f64::from(thresholds.min_paying_competitors)),
            ),
            check_min(
                Criterion::AvgMonthlyPrice,
                metrics.avg_monthly_price,
                Some(thresholds.min_avg_monthly_price),
            ),
            check_min(
                Criterion::OpportunityScore,
                metrics.opportunity_score,
                Some(thresholds.min_opportunity_score),
            ),
        ],
        format!(
            "{} paying competitors averaging ${:.2}/month, opportunity {:.1}/10",
            metrics.paying_competitors, metrics.avg_monthly_price, metrics.opportunity_score
        ),
    )
}
