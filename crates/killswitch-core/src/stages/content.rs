//! Content stage scorer: landing-page messaging quality and predicted conversion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::threshold::{check_min, Criterion, ThresholdVerdict};

/// Baseline conversion rate of a landing page with no messaging value.
const BASE_CONVERSION: f64 = 0.005;
/// Conversion gained per messaging-score point.
const CONVERSION_PER_POINT: f64 = 0.0035;
/// A headline longer than this many words loses half its credit.
const MAX_HEADLINE_WORDS: usize = 12;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "because", "been", "being", "does", "from", "have", "into",
    "just", "like", "more", "much", "only", "over", "same", "some", "than", "that", "their",
    "them", "then", "they", "this", "very", "what", "when", "with", "your",
];

/// A landing-page draft plus launch posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LandingPageDraft {
    pub headline: String,
    pub subheadline: String,
    pub benefits: Vec<String>,
    pub call_to_action: String,
    pub social_posts: Vec<String>,
}

impl LandingPageDraft {
    /// Generic draft used when no generated copy is available.
    pub fn fallback(problem: &str, audience: &str) -> Self {
        let problem = problem.trim().trim_end_matches('.');
        Self {
            headline: "Finally, a solution that actually works".to_string(),
            subheadline: format!("Built for {} who are done with: {}", audience.trim(), problem),
            benefits: vec![
                "Save hours every week".to_string(),
                "Stop losing money to workarounds".to_string(),
                "Set up in minutes, not days".to_string(),
            ],
            call_to_action: "Join the waitlist".to_string(),
            social_posts: vec![format!("Still dealing with this? {problem}. We're fixing it.")],
        }
    }

    fn full_text(&self) -> String {
        let mut parts = vec![self.headline.as_str(), self.subheadline.as_str()];
        parts.extend(self.benefits.iter().map(String::as_str));
        parts.push(self.call_to_action.as_str());
        parts.extend(self.social_posts.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentInput {
    pub draft: LandingPageDraft,
    /// Pain points from the pain stage the copy should address.
    #[serde(default)]
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentMetrics {
    /// 0–10.
    pub messaging_score: f64,
    /// Fraction (0–1) of visitors expected to sign up.
    pub predicted_conversion: f64,
    pub pain_points_addressed: u32,
    pub pain_points_total: u32,
    pub draft: LandingPageDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ContentThresholds {
    pub min_predicted_conversion: f64,
    pub min_messaging_score: f64,
}

impl Default for ContentThresholds {
    fn default() -> Self {
        Self {
            min_predicted_conversion: 0.02,
            min_messaging_score: 6.0,
        }
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// A pain point counts as addressed when at least half of its keywords appear
/// in the copy.
fn addresses(copy_words: &HashSet<String>, pain_point: &str) -> bool {
    let words = keywords(pain_point);
    if words.is_empty() {
        return false;
    }
    let hits = words.iter().filter(|w| copy_words.contains(*w)).count();
    hits * 2 >= words.len()
}

/// Deterministic messaging scorer.
///
/// Points: pain-point coverage 5, headline 1.5, subheadline 0.5, benefits 1.5
/// (full credit from three), call to action 1, social posts 0.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentScorer;

impl ContentScorer {
    pub fn score(&self, input: &ContentInput) -> ContentMetrics {
        let draft = &input.draft;
        let copy_words: HashSet<String> = keywords(&draft.full_text()).into_iter().collect();

        let pain_points: Vec<&String> = input
            .pain_points
            .iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        let addressed = pain_points
            .iter()
            .filter(|p| addresses(&copy_words, p))
            .count();
        let coverage = if pain_points.is_empty() {
            0.5
        } else {
            addressed as f64 / pain_points.len() as f64
        };

        let headline_words = draft.headline.split_whitespace().count();
        let headline = match headline_words {
            0 => 0.0,
            n if n <= MAX_HEADLINE_WORDS => 1.5,
            _ => 0.75,
        };
        let subheadline = if draft.subheadline.trim().is_empty() { 0.0 } else { 0.5 };
        let benefit_count = draft.benefits.iter().filter(|b| !b.trim().is_empty()).count();
        let benefits = (benefit_count.min(3) as f64 / 3.0) * 1.5;
        let cta = if draft.call_to_action.trim().is_empty() { 0.0 } else { 1.0 };
        let social = if draft.social_posts.iter().any(|p| !p.trim().is_empty()) {
            0.5
        } else {
            0.0
        };

        let raw = 5.0 * coverage + headline + subheadline + benefits + cta + social;
        let messaging_score = ((raw * 10.0).round() / 10.0).clamp(0.0, 10.0);

        ContentMetrics {
            messaging_score,
            predicted_conversion: predicted_conversion(messaging_score),
            pain_points_addressed: addressed as u32,
            pain_points_total: pain_points.len() as u32,
            draft: draft.clone(),
        }
    }
}

/// Predicted signup rate for a messaging score.
pub fn predicted_conversion(messaging_score: f64) -> f64 {
    BASE_CONVERSION + CONVERSION_PER_POINT * messaging_score.clamp(0.0, 10.0)
}

/// Evaluate content metrics: predicted conversion, then messaging score.
pub fn evaluate_content(
    metrics: &ContentMetrics,
    thresholds: &ContentThresholds,
) -> ThresholdVerdict {
    ThresholdVerdict::first_violation(
        [
            check_min(
                Criterion::PredictedConversion,
                metrics.predicted_conversion,
                Some(thresholds.min_predicted_conversion),
            ),
            check_min(
                Criterion::MessagingScore,
                metrics.messaging_score,
                Some(thresholds.min_messaging_score),
            ),
        ],
        format!(
            "messaging {:.1}/10, predicted conversion {:.2}%",
            metrics.messaging_score,
            metrics.predicted_conversion * 100.0
        ),
    )
}
