//! Stage identities, per-stage states and immutable stage results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ScoringResult;
use crate::stages::{ContentMetrics, MarketMetrics, PricingMetrics};
use crate::threshold::{Criterion, ThresholdVerdict};

/// One of the four validation gates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Pain,
    Market,
    Content,
    Pricing,
}

impl StageKind {
    /// Execution order.
    pub const ORDER: [StageKind; 4] = [
        StageKind::Pain,
        StageKind::Market,
        StageKind::Content,
        StageKind::Pricing,
    ];

    pub fn index(&self) -> usize {
        match self {
            StageKind::Pain => 0,
            StageKind::Market => 1,
            StageKind::Content => 2,
            StageKind::Pricing => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Pain => "pain",
            StageKind::Market => "market",
            StageKind::Content => "content",
            StageKind::Pricing => "pricing",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single stage within a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    #[default]
    Pending,
    Running,
    Passed,
    Killed,
}

impl StageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageState::Passed | StageState::Killed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageState::Pending => "pending",
            StageState::Running => "running",
            StageState::Passed => "passed",
            StageState::Killed => "killed",
        }
    }
}

/// Context a stage hands to the next stage's query construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DerivedContext {
    /// Pain themes, or pain points to address.
    #[serde(default)]
    pub themes: Vec<String>,
    /// Market gaps left open by competitors.
    #[serde(default)]
    pub gaps: Vec<String>,
}

impl DerivedContext {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty() && self.gaps.is_empty()
    }

    /// Merge another context into this one, skipping duplicates.
    pub fn merge(&mut self, other: &DerivedContext) {
        for theme in &other.themes {
            if !self.themes.contains(theme) {
                self.themes.push(theme.clone());
            }
        }
        for gap in &other.gaps {
            if !self.gaps.contains(gap) {
                self.gaps.push(gap.clone());
            }
        }
    }
}

/// Stage-specific metrics carried by a [`StageResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageMetrics {
    Pain(ScoringResult),
    Market(MarketMetrics),
    Content(ContentMetrics),
    Pricing(PricingMetrics),
}

impl StageMetrics {
    pub fn stage(&self) -> StageKind {
        match self {
            StageMetrics::Pain(_) => StageKind::Pain,
            StageMetrics::Market(_) => StageKind::Market,
            StageMetrics::Content(_) => StageKind::Content,
            StageMetrics::Pricing(_) => StageKind::Pricing,
        }
    }
}

/// Outcome of one stage execution. Appended to the session, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageResult {
    pub stage: StageKind,
    /// Stage score on a 0–10 scale.
    pub score: f64,
    pub passed: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_criterion: Option<Criterion>,
    pub metrics: StageMetrics,
    #[serde(default)]
    pub derived_context: DerivedContext,
    pub completed_at: DateTime<Utc>,
}

impl StageResult {
    /// Build a result from stage metrics and the evaluator's verdict.
    pub fn new(score: f64, metrics: StageMetrics, verdict: ThresholdVerdict) -> Self {
        Self {
            stage: metrics.stage(),
            score: score.clamp(0.0, 10.0),
            passed: verdict.passed,
            failed_criterion: verdict.failed_criterion(),
            reason: verdict.reason,
            metrics,
            derived_context: DerivedContext::default(),
            completed_at: Utc::now(),
        }
    }

    pub fn with_context(mut self, derived_context: DerivedContext) -> Self {
        self.derived_context = derived_context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::Violation;

    #[test]
    fn test_stage_order_and_index() {
        for (i, stage) in StageKind::ORDER.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(StageKind::from_index(i), Some(*stage));
        }
        assert_eq!(StageKind::from_index(4), None);
        assert_eq!(StageKind::Market.to_string(), "market");
    }

    #[test]
    fn test_result_takes_stage_from_metrics() {
        let verdict = ThresholdVerdict::fail(Violation {
            criterion: Criterion::PayingCompetitors,
            reason: "paying_competitors 2 below required 3 (short by 1)".to_string(),
        });
        let result = StageResult::new(12.0, StageMetrics::Market(MarketMetrics::default()), verdict);
        assert_eq!(result.stage, StageKind::Market);
        assert_eq!(result.score, 10.0);
        assert!(!result.passed);
        assert_eq!(result.failed_criterion, Some(Criterion::PayingCompetitors));
    }

    #[test]
    fn test_derived_context_merge_skips_duplicates() {
        let mut ctx = DerivedContext {
            themes: vec!["slow sync".into()],
            gaps: vec![],
        };
        ctx.merge(&DerivedContext {
            themes: vec!["slow sync".into(), "pricing".into()],
            gaps: vec!["offline mode".into()],
        });
        assert_eq!(ctx.themes, vec!["slow sync".to_string(), "pricing".to_string()]);
        assert_eq!(ctx.gaps.len(), 1);
    }
}
