//! Stage orchestrator.
//!
//! Sequences the four gates over a [`ValidationSession`]. Each stage moves
//! `pending -> running -> passed | killed`; a killed stage kills the session and
//! nothing after it runs. When the last stage passes the session completes and
//! the weighted viability score is computed. No I/O happens here: callers run
//! the stage scorers and hand over finished [`StageResult`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KillSwitchError, Result};
use crate::sanitize::{validate_audience, validate_problem};
use crate::session::{SessionStatus, ValidationSession};
use crate::stage::{DerivedContext, StageKind, StageResult, StageState};
use crate::threshold::ProfileName;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weights of each stage score in the final viability score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ViabilityWeights {
    pub pain: f64,
    pub market: f64,
    pub content: f64,
    pub pricing: f64,
}

impl Default for ViabilityWeights {
    fn default() -> Self {
        Self {
            pain: 0.30,
            market: 0.30,
            content: 0.20,
            pricing: 0.20,
        }
    }
}

impl ViabilityWeights {
    pub fn weight(&self, stage: StageKind) -> f64 {
        match stage {
            StageKind::Pain => self.pain,
            StageKind::Market => self.market,
            StageKind::Content => self.content,
            StageKind::Pricing => self.pricing,
        }
    }

    pub fn sum(&self) -> f64 {
        self.pain + self.market + self.content + self.pricing
    }

    /// Each weight must be a non-negative number and together they must sum to
    /// 1.0, which keeps the viability score on the 0-10 scale.
    pub fn validate(&self) -> Result<()> {
        for stage in StageKind::ORDER {
            let w = self.weight(stage);
            if !(w.is_finite() && w >= 0.0) {
                return Err(KillSwitchError::InvalidConfig(format!(
                    "viability.{stage} must be a non-negative number, got {w}"
                )));
            }
        }
        if (self.sum() - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(KillSwitchError::InvalidConfig(format!(
                "viability weights must sum to 1.0, got {:.3}",
                self.sum()
            )));
        }
        Ok(())
    }
}

/// Weighted viability score (0–10) over a full set of passed stage results.
///
/// Returns `None` unless every stage is present and passed. Stage scores are
/// already on a 0–10 scale.
pub fn viability_score(results: &[StageResult], weights: &ViabilityWeights) -> Option<f64> {
    StageKind::ORDER
        .iter()
        .map(|stage| {
            results
                .iter()
                .find(|r| r.stage == *stage && r.passed)
                .map(|r| weights.weight(*stage) * r.score.clamp(0.0, 10.0))
        })
        .sum::<Option<f64>>()
        .map(|score| score.clamp(0.0, 10.0))
}

/// Recommendation derived from the viability score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViabilityVerdict {
    Pursue,
    Refine,
    Abandon,
}

impl ViabilityVerdict {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            ViabilityVerdict::Pursue
        } else if score >= 5.0 {
            ViabilityVerdict::Refine
        } else {
            ViabilityVerdict::Abandon
        }
    }
}

impl fmt::Display for ViabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViabilityVerdict::Pursue => "pursue",
            ViabilityVerdict::Refine => "refine",
            ViabilityVerdict::Abandon => "abandon",
        })
    }
}

/// Drives one session through the four stages.
#[derive(Debug, Clone)]
pub struct StageOrchestrator {
    session: ValidationSession,
    weights: ViabilityWeights,
}

impl StageOrchestrator {
    /// Start a session. Problem and audience are validated and sanitised.
    pub fn new(problem: &str, audience: &str, profile: ProfileName) -> Result<Self> {
        let problem = validate_problem(problem)?;
        let audience = validate_audience(audience)?;
        Ok(Self {
            session: ValidationSession::new(problem, audience, profile),
            weights: ViabilityWeights::default(),
        })
    }

    /// Replace the viability weights. Rejects weights that do not sum to 1.0.
    pub fn with_weights(mut self, weights: ViabilityWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Stage that runs next, `None` once the session is terminal.
    pub fn current_stage(&self) -> Option<StageKind> {
        if self.session.status().is_terminal() {
            return None;
        }
        StageKind::from_index(self.session.current_stage_index())
    }

    /// Move the current stage from pending to running.
    pub fn begin_stage(&mut self) -> Result<StageKind> {
        let stage = self.current_stage().ok_or_else(|| {
            KillSwitchError::InvalidTransition(format!(
                "session is {}, no stage can start",
                self.session.status()
            ))
        })?;
        match self.session.stage_state(stage) {
            StageState::Pending => {
                self.session.set_stage_state(stage, StageState::Running);
                Ok(stage)
            }
            other => Err(KillSwitchError::InvalidTransition(format!(
                "stage {stage} is {}, expected pending",
                other.as_str()
            ))),
        }
    }

    /// Record the running stage's result and advance, kill or complete.
    pub fn complete_stage(&mut self, result: StageResult) -> Result<SessionStatus> {
        let stage = self.current_stage().ok_or_else(|| {
            KillSwitchError::InvalidTransition(format!(
                "session is {}, no stage is running",
                self.session.status()
            ))
        })?;
        if result.stage != stage {
            return Err(KillSwitchError::StageMismatch {
                expected: stage,
                actual: result.stage,
            });
        }
        if self.session.stage_state(stage) != StageState::Running {
            return Err(KillSwitchError::InvalidTransition(format!(
                "stage {stage} was not started"
            )));
        }

        let passed = result.passed;
        self.session.push_result(result);

        if !passed {
            self.session.set_stage_state(stage, StageState::Killed);
            self.session.kill();
            return Ok(self.session.status());
        }

        self.session.set_stage_state(stage, StageState::Passed);
        self.session.advance();
        if self.session.current_stage_index() == StageKind::ORDER.len() {
            let score = viability_score(self.session.stage_results(), &self.weights)
                .ok_or_else(|| {
                    KillSwitchError::InvalidTransition(
                        "all stages passed but a stage result is missing".to_string(),
                    )
                })?;
            self.session.complete(score);
        }
        Ok(self.session.status())
    }

    /// Context accumulated from every recorded stage, for the next stage's queries.
    pub fn derived_context(&self) -> DerivedContext {
        let mut ctx = DerivedContext::default();
        for result in self.session.stage_results() {
            ctx.merge(&result.derived_context);
        }
        ctx
    }

    pub fn session(&self) -> &ValidationSession {
        &self.session
    }

    pub fn into_session(self) -> ValidationSession {
        self.session
    }

    pub fn verdict(&self) -> Option<ViabilityVerdict> {
        self.session.viability_score().map(ViabilityVerdict::from_score)
    }
}
