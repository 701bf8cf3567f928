use async_trait::async_trait;
use killswitch_core::obs::emit_parse_fallback;
use killswitch_core::{
    evaluate, sanitize_text, score, Classifier, DerivedContext, StageKind, StageMetrics,
    StageResult, TextItem, ThresholdProfile,
};
use killswitch_providers::{complaint_queries, pain_analysis_request, parse_pain_analysis};
use tracing::debug;

use super::StageRunner;
use crate::context::{Collaborators, StageInput};

/// Pain gate: complaint corpus → tiers → weighted score → profile thresholds.
#[derive(Debug, Clone)]
pub struct PainStage {
    collaborators: Collaborators,
    classifier: Classifier,
    profile: ThresholdProfile,
}

impl PainStage {
    pub fn new(collaborators: Collaborators, profile: ThresholdProfile) -> Self {
        Self {
            collaborators,
            classifier: Classifier::standard(),
            profile,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }
}

#[async_trait]
impl StageRunner for PainStage {
    fn stage(&self) -> StageKind {
        StageKind::Pain
    }

    async fn run(&self, input: &StageInput<'_>) -> anyhow::Result<StageResult> {
        let queries = complaint_queries(input.problem);
        let gathered = self.collaborators.gather(&queries).await;

        let items = gathered.items.into_iter().map(|item| TextItem {
            text: sanitize_text(&item.text),
            ..item
        });
        let classified = self.classifier.classify_all(items);
        let mut result = score(&classified);
        debug!(
            items = classified.len(),
            weighted = result.weighted_score,
            effective = result.effective_complaints,
            "corpus scored"
        );

        // Themes and quotes are descriptive only; the arithmetic above is final.
        if result.tier_counts.total_nonzero() > 0 {
            let request = pain_analysis_request(input.problem, &classified);
            let parsed = match self.collaborators.analyze(&request).await {
                Ok(raw) => parse_pain_analysis(&raw),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(analysis) => {
                    result = result.with_insights(analysis.themes, analysis.key_quotes);
                }
                Err(e) => emit_parse_fallback(StageKind::Pain, &e),
            }
        }

        let verdict = evaluate(&result, &self.profile);
        let context = DerivedContext {
            themes: result.themes.clone(),
            gaps: Vec::new(),
        };
        Ok(StageResult::new(result.pain_score, StageMetrics::Pain(result), verdict)
            .with_context(context))
    }
}
