use async_trait::async_trait;
use killswitch_core::{
    evaluate_pricing, PricingInput, PricingScorer, PricingThresholds, StageKind, StageMetrics,
    StageResult,
};
use tracing::warn;

use super::StageRunner;
use crate::context::StageInput;

/// Pricing gate: willingness-to-pay survey answers against the price floor.
///
/// Answers are collected outside the pipeline. With no answers the stage
/// scores zero and is killed.
#[derive(Debug, Clone)]
pub struct PricingStage {
    survey: PricingInput,
    thresholds: PricingThresholds,
}

impl PricingStage {
    pub fn new(survey: PricingInput, thresholds: PricingThresholds) -> Self {
        Self { survey, thresholds }
    }
}

#[async_trait]
impl StageRunner for PricingStage {
    fn stage(&self) -> StageKind {
        StageKind::Pricing
    }

    async fn run(&self, _input: &StageInput<'_>) -> anyhow::Result<StageResult> {
        if self.survey.is_empty() {
            warn!("no survey answers supplied, pricing cannot pass");
        }
        let scorer = PricingScorer::new(self.thresholds.price_floor);
        let metrics = scorer.score(&self.survey);
        let verdict = evaluate_pricing(&metrics, &self.thresholds);
        Ok(StageResult::new(
            scorer.stage_score(&metrics),
            StageMetrics::Pricing(metrics),
            verdict,
        ))
    }
}
