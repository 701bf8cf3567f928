//! Stage runners: retrieve, score and evaluate one gate each.

mod content;
mod market;
mod pain;
mod pricing;

use async_trait::async_trait;
use killswitch_core::{StageKind, StageResult};

use crate::context::StageInput;

pub use content::ContentStage;
pub use market::MarketStage;
pub use pain::PainStage;
pub use pricing::PricingStage;

/// One validation gate.
///
/// A runner absorbs collaborator failures and always produces a result;
/// an `Err` means a programming or configuration error.
#[async_trait]
pub trait StageRunner: Send + Sync {
    fn stage(&self) -> StageKind;

    async fn run(&self, input: &StageInput<'_>) -> anyhow::Result<StageResult>;
}
