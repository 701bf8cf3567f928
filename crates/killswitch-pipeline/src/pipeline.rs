//! The sequential validation pipeline.

use std::time::Instant;

use anyhow::{anyhow, Context};
use killswitch_core::obs::{
    emit_session_completed, emit_session_started, emit_stage_finished, emit_stage_started,
    session_span,
};
use killswitch_core::{
    PricingInput, ProfileConfig, ProfileName, ProfileRegistry, SessionStatus, StageKind,
    StageOrchestrator, SurveyResponse, ValidationSession,
};
use tracing::{info, Instrument};

use crate::context::{Collaborators, StageInput};
use crate::stages::{ContentStage, MarketStage, PainStage, PricingStage, StageRunner};

/// Drives one session through pain, market, content and pricing, stopping
/// at the first gate that fails.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    collaborators: Collaborators,
    config: ProfileConfig,
    survey: PricingInput,
}

impl ValidationPipeline {
    pub fn new(collaborators: Collaborators, config: ProfileConfig) -> Self {
        Self {
            collaborators,
            config,
            survey: PricingInput::default(),
        }
    }

    /// Willingness-to-pay answers for the pricing gate.
    pub fn with_survey_answers(mut self, answers: Vec<String>) -> Self {
        self.survey = PricingInput::new(answers);
        self
    }

    /// Full survey responses, which also feed the feature ranking.
    pub fn with_survey_responses(mut self, responses: &[SurveyResponse]) -> Self {
        self.survey = PricingInput::from_responses(responses);
        self
    }

    pub fn with_survey(mut self, survey: PricingInput) -> Self {
        self.survey = survey;
        self
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    fn runner(
        &self,
        stage: StageKind,
        registry: &ProfileRegistry,
        profile: ProfileName,
    ) -> anyhow::Result<Box<dyn StageRunner>> {
        let runner: Box<dyn StageRunner> = match stage {
            StageKind::Pain => {
                let profile = registry
                    .profile(profile)
                    .cloned()
                    .ok_or_else(|| anyhow!("profile {profile} is not registered"))?;
                Box::new(PainStage::new(self.collaborators.clone(), profile))
            }
            StageKind::Market => Box::new(MarketStage::new(
                self.collaborators.clone(),
                self.config.market.clone(),
            )),
            StageKind::Content => Box::new(ContentStage::new(
                self.collaborators.clone(),
                self.config.content.clone(),
            )),
            StageKind::Pricing => Box::new(PricingStage::new(
                self.survey.clone(),
                self.config.pricing.clone(),
            )),
        };
        Ok(runner)
    }

    /// Run a full session. Collaborator failures degrade scores; only invalid
    /// input or configuration returns an error.
    pub async fn run(
        &self,
        problem: &str,
        audience: &str,
        profile: ProfileName,
    ) -> anyhow::Result<ValidationSession> {
        let registry =
            ProfileRegistry::from_config(&self.config).context("invalid profile configuration")?;
        let orchestrator = StageOrchestrator::new(problem, audience, profile)
            .context("invalid session input")?
            .with_weights(self.config.viability.clone())
            .context("invalid viability weights")?;

        let session_id = orchestrator.session().id().to_string();
        let span = session_span(&session_id);
        self.drive(orchestrator, &registry, profile)
            .instrument(span)
            .await
    }

    async fn drive(
        &self,
        mut orchestrator: StageOrchestrator,
        registry: &ProfileRegistry,
        profile: ProfileName,
    ) -> anyhow::Result<ValidationSession> {
        let session_id = orchestrator.session().id().to_string();
        emit_session_started(&session_id, profile);

        while let Some(stage) = orchestrator.current_stage() {
            let runner = self.runner(stage, registry, profile)?;
            orchestrator.begin_stage()?;
            emit_stage_started(stage);
            let started = Instant::now();

            let derived = orchestrator.derived_context();
            let input = StageInput {
                problem: orchestrator.session().problem(),
                audience: orchestrator.session().audience(),
                derived: &derived,
            };
            let result = runner
                .run(&input)
                .await
                .with_context(|| format!("stage {stage} failed to run"))?;

            emit_stage_finished(&result, started.elapsed().as_millis() as u64);
            let status = orchestrator.complete_stage(result)?;
            if status == SessionStatus::Killed {
                info!(stage = %stage, "idea killed");
            }
        }

        let session = orchestrator.into_session();
        emit_session_completed(
            &session_id,
            session.status().as_str(),
            session.viability_score(),
        );
        Ok(session)
    }
}
