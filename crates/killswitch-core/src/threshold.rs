//! Threshold evaluator.
//!
//! Checks a [`ScoringResult`] against a named [`ThresholdProfile`]. Every
//! configured criterion must hold; on failure the verdict names the first unmet
//! criterion in a fixed order (weighted complaints, pain score, quality rating,
//! urgency, emotional intensity) together with the margin it missed by.
//!
//! The market, content and pricing evaluators in [`crate::stages`] reuse the
//! same [`Criterion`] / [`ThresholdVerdict`] contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;
use crate::error::{KillSwitchError, Result};
use crate::model::{QualityRating, ScoringResult};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Difficulty profile name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    Easy,
    #[default]
    Medium,
    Difficult,
}

impl ProfileName {
    /// All profiles from least to most demanding.
    pub const ALL: [ProfileName; 3] = [ProfileName::Easy, ProfileName::Medium, ProfileName::Difficult];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Easy => "easy",
            ProfileName::Medium => "medium",
            ProfileName::Difficult => "difficult",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = KillSwitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(ProfileName::Easy),
            "medium" => Ok(ProfileName::Medium),
            "difficult" => Ok(ProfileName::Difficult),
            _ => Err(KillSwitchError::UnknownProfile {
                name: s.to_string(),
            }),
        }
    }
}

/// Minimum criteria for the pain stage. Unset criteria are not checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileCriteria {
    pub min_weighted_complaints: Option<f64>,
    pub min_pain_score: Option<f64>,
    pub min_quality_rating: Option<QualityRating>,
    pub min_urgency_pct: Option<f64>,
    pub min_emotional_pct: Option<f64>,
}

impl ProfileCriteria {
    pub fn builtin(name: ProfileName) -> Self {
        match name {
            ProfileName::Easy => Self {
                min_weighted_complaints: Some(20.0),
                min_pain_score: Some(4.0),
                ..Self::default()
            },
            ProfileName::Medium => Self {
                min_weighted_complaints: Some(40.0),
                min_pain_score: Some(6.0),
                min_quality_rating: Some(QualityRating::Medium),
                ..Self::default()
            },
            ProfileName::Difficult => Self {
                min_weighted_complaints: Some(50.0),
                min_pain_score: Some(8.0),
                min_quality_rating: Some(QualityRating::High),
                min_urgency_pct: Some(30.0),
                min_emotional_pct: Some(25.0),
            },
        }
    }
}

/// A named set of criteria. Loaded once, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdProfile {
    pub name: ProfileName,
    pub criteria: ProfileCriteria,
}

impl ThresholdProfile {
    pub fn new(name: ProfileName, criteria: ProfileCriteria) -> Self {
        Self { name, criteria }
    }

    pub fn builtin(name: ProfileName) -> Self {
        Self::new(name, ProfileCriteria::builtin(name))
    }
}

/// The three profiles, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileName, ThresholdProfile>,
}

impl ProfileRegistry {
    /// Registry holding the built-in easy/medium/difficult criteria.
    pub fn builtin() -> Self {
        let profiles = ProfileName::ALL
            .iter()
            .map(|name| (*name, ThresholdProfile::builtin(*name)))
            .collect();
        Self { profiles }
    }

    /// Registry built from a validated configuration.
    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        config.validate()?;
        let profiles = ProfileName::ALL
            .iter()
            .map(|name| (*name, ThresholdProfile::new(*name, config.criteria(*name).clone())))
            .collect();
        Ok(Self { profiles })
    }

    /// Look a profile up by name. Unknown names are an error, never a default.
    pub fn get(&self, name: &str) -> Result<&ThresholdProfile> {
        let key: ProfileName = name.parse()?;
        self.profile(key).ok_or_else(|| KillSwitchError::UnknownProfile {
            name: name.to_string(),
        })
    }

    pub fn profile(&self, name: ProfileName) -> Option<&ThresholdProfile> {
        self.profiles.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdProfile> {
        self.profiles.values()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Criteria and verdicts
// ---------------------------------------------------------------------------

/// A single named criterion any stage evaluator can check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    WeightedComplaints,
    PainScore,
    QualityRating,
    UrgencyPct,
    EmotionalPct,
    PayingCompetitors,
    AvgMonthlyPrice,
    OpportunityScore,
    PredictedConversion,
    MessagingScore,
    AvgWillingnessToPay,
    PctAboveFloor,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::WeightedComplaints => "weighted_complaints",
            Criterion::PainScore => "pain_score",
            Criterion::QualityRating => "quality_rating",
            Criterion::UrgencyPct => "urgency_pct",
            Criterion::EmotionalPct => "emotional_pct",
            Criterion::PayingCompetitors => "paying_competitors",
            Criterion::AvgMonthlyPrice => "avg_monthly_price",
            Criterion::OpportunityScore => "opportunity_score",
            Criterion::PredictedConversion => "predicted_conversion",
            Criterion::MessagingScore => "messaging_score",
            Criterion::AvgWillingnessToPay => "avg_willingness_to_pay",
            Criterion::PctAboveFloor => "pct_above_floor",
        }
    }

    /// Render a value in the criterion's natural unit.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Criterion::PayingCompetitors => format!("{value:.0}"),
            Criterion::UrgencyPct | Criterion::EmotionalPct | Criterion::PctAboveFloor => {
                format!("{value:.1}%")
            }
            Criterion::AvgMonthlyPrice | Criterion::AvgWillingnessToPay => format!("${value:.2}"),
            Criterion::PredictedConversion => format!("{:.2}%", value * 100.0),
            _ => format!("{value:.1}"),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The first unmet criterion of a failed evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub criterion: Criterion,
    pub reason: String,
}

/// Pass/fail outcome with a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdVerdict {
    pub passed: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

impl ThresholdVerdict {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
            violation: None,
        }
    }

    pub fn fail(violation: Violation) -> Self {
        Self {
            passed: false,
            reason: violation.reason.clone(),
            violation: Some(violation),
        }
    }

    /// Criterion that caused the failure, if any.
    pub fn failed_criterion(&self) -> Option<Criterion> {
        self.violation.as_ref().map(|v| v.criterion)
    }

    /// Build a verdict from an ordered list of checks; the first violation wins.
    pub fn first_violation<I>(checks: I, pass_reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = Option<Violation>>,
    {
        match checks.into_iter().flatten().next() {
            Some(v) => Self::fail(v),
            None => Self::pass(pass_reason),
        }
    }
}

/// Check `actual >= required`, producing a violation with the shortfall.
pub fn check_min(criterion: Criterion, actual: f64, required: Option<f64>) -> Option<Violation> {
    let required = required?;
    if actual >= required {
        return None;
    }
    Some(Violation {
        criterion,
        reason: format!(
            "{} {} below required {} (short by {})",
            criterion,
            criterion.format_value(actual),
            criterion.format_value(required),
            criterion.format_value(required - actual),
        ),
    })
}

fn check_quality(actual: QualityRating, required: Option<QualityRating>) -> Option<Violation> {
    let required = required?;
    if actual >= required {
        return None;
    }
    Some(Violation {
        criterion: Criterion::QualityRating,
        reason: format!("quality_rating {actual} below required {required}"),
    })
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate a pain [`ScoringResult`] against a profile.
///
/// The compared complaint volume is `effective_complaints` (the weighted score
/// after the quality multiplier).
pub fn evaluate(result: &ScoringResult, profile: &ThresholdProfile) -> ThresholdVerdict {
    let c = &profile.criteria;
    ThresholdVerdict::first_violation(
        [
            check_min(
                Criterion::WeightedComplaints,
                result.effective_complaints,
                c.min_weighted_complaints,
            ),
            check_min(Criterion::PainScore, result.pain_score, c.min_pain_score),
            check_quality(result.quality_rating, c.min_quality_rating),
            check_min(Criterion::UrgencyPct, result.urgency_pct, c.min_urgency_pct),
            check_min(Criterion::EmotionalPct, result.emotional_pct, c.min_emotional_pct),
        ],
        format!(
            "meets {} profile: {:.1} weighted complaints, pain score {:.1}, quality {}",
            profile.name, result.effective_complaints, result.pain_score, result.quality_rating
        ),
    )
}

/// A result evaluated against every profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierReport {
    pub verdicts: Vec<(ProfileName, ThresholdVerdict)>,
    /// Most demanding profile passed, `None` when even `easy` fails.
    pub highest_passed: Option<ProfileName>,
}

impl TierReport {
    pub fn verdict(&self, name: ProfileName) -> Option<&ThresholdVerdict> {
        self.verdicts
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// Evaluate a result against every profile in the registry.
pub fn evaluate_all(result: &ScoringResult, registry: &ProfileRegistry) -> TierReport {
    let verdicts: Vec<_> = registry
        .iter()
        .map(|profile| (profile.name, evaluate(result, profile)))
        .collect();
    let highest_passed = verdicts
        .iter()
        .filter(|(_, v)| v.passed)
        .map(|(n, _)| *n)
        .max();
    TierReport {
        verdicts,
        highest_passed,
    }
}
