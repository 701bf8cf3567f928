//! Structured lifecycle events for validation sessions.
//!
//! Every event is an `info!` (or `warn!`) record with an `event` field so log
//! pipelines can filter on it, e.g. `event=stage.killed`.

use tracing::{info, warn};

use crate::stage::{StageKind, StageResult};
use crate::threshold::ProfileName;

/// RAII guard that enters a session-scoped span.
///
/// Not `Send`; async code should use [`session_span`] with
/// `tracing::Instrument` instead.
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    pub fn enter(session_id: &str) -> Self {
        Self {
            _span: session_span(session_id).entered(),
        }
    }
}

/// Span tagging every record inside it with `session_id`.
pub fn session_span(session_id: &str) -> tracing::Span {
    tracing::info_span!("killswitch.session", session_id = %session_id)
}

pub fn emit_session_started(session_id: &str, profile: ProfileName) {
    info!(event = "session.started", session_id = %session_id, profile = %profile);
}

pub fn emit_stage_started(stage: StageKind) {
    info!(event = "stage.started", stage = %stage);
}

/// Emit `stage.completed` or `stage.killed` depending on the result.
pub fn emit_stage_finished(result: &StageResult, duration_ms: u64) {
    if result.passed {
        info!(
            event = "stage.completed",
            stage = %result.stage,
            score = result.score,
            duration_ms = duration_ms,
        );
    } else {
        info!(
            event = "stage.killed",
            stage = %result.stage,
            score = result.score,
            reason = %result.reason,
            duration_ms = duration_ms,
        );
    }
}

pub fn emit_session_completed(session_id: &str, status: &str, viability_score: Option<f64>) {
    info!(
        event = "session.completed",
        session_id = %session_id,
        status = %status,
        viability_score = viability_score,
    );
}

/// A retrieval query failed after retries; its results are treated as empty.
pub fn emit_query_failed(query: &str, error: &dyn std::fmt::Display) {
    warn!(event = "retrieval.query_failed", query = %query, error = %error);
}

/// Analysis output could not be used; the stage falls back to defaults.
pub fn emit_parse_fallback(stage: StageKind, error: &dyn std::fmt::Display) {
    warn!(event = "analysis.parse_fallback", stage = %stage, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_span_enter() {
        let _span = SessionSpan::enter("test-session");
        emit_stage_started(StageKind::Pain);
    }
}
