//! Stage runners and the sequential validation pipeline.
//!
//! Each runner gathers evidence through the provider traits, hands it to the
//! deterministic scorers in `killswitch-core` and returns a `StageResult`.
//! [`ValidationPipeline`] feeds those results to the stage orchestrator one
//! gate at a time.

pub mod context;
pub mod pipeline;
pub mod stages;

pub use context::{Collaborators, StageInput};
pub use pipeline::ValidationPipeline;
pub use stages::{ContentStage, MarketStage, PainStage, PricingStage, StageRunner};
