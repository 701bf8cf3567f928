//! Error taxonomy for the Kill Switch core.
//!
//! Only configuration and programmer errors live here. Retrieval and analysis
//! failures never reach the core: the collaborator layer absorbs them and the
//! scorers see a smaller (possibly empty) corpus instead.

use crate::stage::StageKind;

/// Errors produced by the core scoring and orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum KillSwitchError {
    #[error("unknown threshold profile: {name} (expected one of easy, medium, difficult)")]
    UnknownProfile { name: String },

    #[error("invalid threshold profile {profile}: {reason}")]
    InvalidProfile { profile: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid session transition: {0}")]
    InvalidTransition(String),

    #[error("stage mismatch: expected result for {expected}, got {actual}")]
    StageMismatch {
        expected: StageKind,
        actual: StageKind,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, KillSwitchError>;
