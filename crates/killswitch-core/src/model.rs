//! Shared data model: retrieved text, classified items, and pain scoring results.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Retrieved corpus
// ---------------------------------------------------------------------------

/// Platform family a text item was retrieved from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Reddit,
    Forum,
    Review,
    Social,
    Blog,
    #[default]
    General,
}

impl SourceKind {
    /// Classify a URL into a source family by host and path markers.
    pub fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| url.contains(n));

        if has(&["reddit.com"]) {
            SourceKind::Reddit
        } else if has(&[
            "quora.com",
            "stackoverflow.com",
            "stackexchange.com",
            "news.ycombinator.com",
            "indiehackers.com",
            "github.com",
            "forum",
            "community",
            "support",
        ]) {
            SourceKind::Forum
        } else if has(&[
            "trustpilot.com",
            "g2.com",
            "capterra.com",
            "glassdoor.com",
            "yelp.com",
            "producthunt.com",
            "review",
        ]) {
            SourceKind::Review
        } else if has(&[
            "twitter.com",
            "//x.com",
            "facebook.com",
            "linkedin.com",
            "youtube.com",
        ]) {
            SourceKind::Social
        } else if has(&["medium.com", "wordpress.com", "blogspot.com", "substack.com", "/blog"]) {
            SourceKind::Blog
        } else {
            SourceKind::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "reddit",
            SourceKind::Forum => "forum",
            SourceKind::Review => "review",
            SourceKind::Social => "social",
            SourceKind::Blog => "blog",
            SourceKind::General => "general",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single retrieved text snippet. Immutable once retrieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TextItem {
    pub fn new(text: impl Into<String>, source: SourceKind) -> Self {
        Self {
            text: text.into(),
            source,
            url: None,
        }
    }

    /// Build an item whose source is inferred from its URL.
    pub fn from_url(text: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            text: text.into(),
            source: SourceKind::from_url(&url),
            url: Some(url),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Discrete complaint severity bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Promotional, tutorial, positive or off-topic. Excluded from scoring.
    NotComplaint,
    /// Mild question or feature request.
    LowValue,
    /// Clear problem statement or alternative seeking.
    Moderate,
    /// Quantified loss combined with strong negative sentiment.
    HighImpact,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::NotComplaint,
        Tier::LowValue,
        Tier::Moderate,
        Tier::HighImpact,
    ];

    /// Numeric tier level (0–3).
    pub fn level(&self) -> u8 {
        match self {
            Tier::NotComplaint => 0,
            Tier::LowValue => 1,
            Tier::Moderate => 2,
            Tier::HighImpact => 3,
        }
    }

    /// Scoring weight; equal to the tier level.
    pub fn weight(&self) -> u32 {
        u32::from(self.level())
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Tier::ALL.get(usize::from(level)).copied()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.level())
    }
}

/// A text item with its tier and intensity attributes. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedItem {
    #[serde(flatten)]
    pub item: TextItem,
    pub tier: Tier,
    pub emotional: bool,
    pub urgent: bool,
}

/// Per-tier tallies for a classified corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TierCounts {
    pub tier0: u32,
    pub tier1: u32,
    pub tier2: u32,
    pub tier3: u32,
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::NotComplaint => self.tier0,
            Tier::LowValue => self.tier1,
            Tier::Moderate => self.tier2,
            Tier::HighImpact => self.tier3,
        }
    }

    pub fn increment(&mut self, tier: Tier) {
        match tier {
            Tier::NotComplaint => self.tier0 += 1,
            Tier::LowValue => self.tier1 += 1,
            Tier::Moderate => self.tier2 += 1,
            Tier::HighImpact => self.tier3 += 1,
        }
    }

    /// Items in tiers 1–3.
    pub fn total_nonzero(&self) -> u32 {
        self.tier1 + self.tier2 + self.tier3
    }

    /// All items, including tier 0.
    pub fn total(&self) -> u32 {
        self.tier0 + self.total_nonzero()
    }

    /// `tier3*3 + tier2*2 + tier1*1`.
    pub fn weighted_sum(&self) -> u32 {
        Tier::ALL.iter().map(|t| self.get(*t) * t.weight()).sum()
    }
}

// ---------------------------------------------------------------------------
// Scoring result
// ---------------------------------------------------------------------------

/// Ordinal quality rating of a complaint corpus (`low < medium < high`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    #[default]
    Low,
    Medium,
    High,
}

impl QualityRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityRating::Low => "low",
            QualityRating::Medium => "medium",
            QualityRating::High => "high",
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QualityRating {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityRating::Low),
            "medium" => Ok(QualityRating::Medium),
            "high" => Ok(QualityRating::High),
            other => Err(format!("unknown quality rating: {other}")),
        }
    }
}

/// Aggregate pain metrics for one classified corpus. Built once, immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoringResult {
    pub tier_counts: TierCounts,
    pub weighted_score: f64,
    pub quality_multiplier: f64,
    pub effective_complaints: f64,
    /// 1–10 for a non-empty corpus, exactly 0 when no item scored above tier 0.
    pub pain_score: f64,
    pub quality_rating: QualityRating,
    /// `tier3 / total_nonzero`, 0 for an empty corpus.
    pub high_impact_ratio: f64,
    /// Percentage (0–100) of non-zero-tier items flagged urgent.
    pub urgency_pct: f64,
    /// Percentage (0–100) of non-zero-tier items flagged emotional.
    pub emotional_pct: f64,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub sample_quotes: Vec<String>,
}

impl ScoringResult {
    /// Copy of this result with analysis-derived themes and quotes attached.
    pub fn with_insights(mut self, themes: Vec<String>, sample_quotes: Vec<String>) -> Self {
        self.themes = themes;
        self.sample_quotes = sample_quotes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_url() {
        assert_eq!(
            SourceKind::from_url("https://www.reddit.com/r/smallbusiness/abc"),
            SourceKind::Reddit
        );
        assert_eq!(
            SourceKind::from_url("https://www.g2.com/products/foo/reviews"),
            SourceKind::Review
        );
        assert_eq!(
            SourceKind::from_url("https://community.example.com/t/123"),
            SourceKind::Forum
        );
        assert_eq!(
            SourceKind::from_url("https://twitter.com/someone/status/1"),
            SourceKind::Social
        );
        assert_eq!(
            SourceKind::from_url("https://someone.medium.com/post"),
            SourceKind::Blog
        );
        assert_eq!(SourceKind::from_url("https://example.com"), SourceKind::General);
    }

    #[test]
    fn test_tier_levels_and_weights() {
        assert_eq!(Tier::NotComplaint.weight(), 0);
        assert_eq!(Tier::HighImpact.weight(), 3);
        assert_eq!(Tier::from_level(2), Some(Tier::Moderate));
        assert_eq!(Tier::from_level(4), None);
        assert!(Tier::HighImpact > Tier::Moderate);
    }

    #[test]
    fn test_tier_counts_weighted_sum() {
        let counts = TierCounts {
            tier0: 7,
            tier1: 20,
            tier2: 15,
            tier3: 10,
        };
        assert_eq!(counts.weighted_sum(), 90);
        assert_eq!(counts.total_nonzero(), 45);
        assert_eq!(counts.total(), 52);
    }

    #[test]
    fn test_quality_rating_is_ordinal() {
        assert!(QualityRating::Low < QualityRating::Medium);
        assert!(QualityRating::Medium < QualityRating::High);
        assert_eq!("HIGH".parse::<QualityRating>(), Ok(QualityRating::High));
        assert!("great".parse::<QualityRating>().is_err());
    }
}
