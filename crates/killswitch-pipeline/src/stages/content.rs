use async_trait::async_trait;
use killswitch_core::obs::emit_parse_fallback;
use killswitch_core::{
    evaluate_content, ContentInput, ContentScorer, ContentThresholds, LandingPageDraft,
    StageKind, StageMetrics, StageResult,
};
use killswitch_providers::{landing_page_request, parse_landing_page};

use super::StageRunner;
use crate::context::{Collaborators, StageInput};

/// Content gate: draft landing-page copy and score its messaging.
#[derive(Debug, Clone)]
pub struct ContentStage {
    collaborators: Collaborators,
    thresholds: ContentThresholds,
}

impl ContentStage {
    pub fn new(collaborators: Collaborators, thresholds: ContentThresholds) -> Self {
        Self {
            collaborators,
            thresholds,
        }
    }
}

#[async_trait]
impl StageRunner for ContentStage {
    fn stage(&self) -> StageKind {
        StageKind::Content
    }

    async fn run(&self, input: &StageInput<'_>) -> anyhow::Result<StageResult> {
        let pain_points = input.derived.themes.clone();
        let request = landing_page_request(
            input.problem,
            input.audience,
            &pain_points,
            &input.derived.gaps,
        );
        let parsed = match self.collaborators.analyze(&request).await {
            Ok(raw) => parse_landing_page(&raw),
            Err(e) => Err(e),
        };
        let draft = parsed.unwrap_or_else(|e| {
            emit_parse_fallback(StageKind::Content, &e);
            LandingPageDraft::fallback(input.problem, input.audience)
        });

        let metrics = ContentScorer.score(&ContentInput { draft, pain_points });
        let verdict = evaluate_content(&metrics, &self.thresholds);
        Ok(StageResult::new(
            metrics.messaging_score,
            StageMetrics::Content(metrics),
            verdict,
        ))
    }
}
