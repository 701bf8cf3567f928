//! Validation session record.
//!
//! Owned by a [`StageOrchestrator`](crate::orchestrator::StageOrchestrator) for
//! the session's lifetime; only the orchestrator appends results and advances
//! the stage index. Callers get read-only access.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{StageKind, StageResult, StageState};
use crate::threshold::ProfileName;

/// Overall session state. `Killed` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Killed,
    Completed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Killed => "killed",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSession {
    id: Uuid,
    problem: String,
    audience: String,
    profile: ProfileName,
    stage_results: Vec<StageResult>,
    stage_states: [StageState; 4],
    current_stage_index: usize,
    status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    viability_score: Option<f64>,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl ValidationSession {
    pub(crate) fn new(problem: String, audience: String, profile: ProfileName) -> Self {
        Self {
            id: Uuid::new_v4(),
            problem,
            audience,
            profile,
            stage_results: Vec::new(),
            stage_states: [StageState::Pending; 4],
            current_stage_index: 0,
            status: SessionStatus::InProgress,
            viability_score: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn profile(&self) -> ProfileName {
        self.profile
    }

    /// Results in execution order.
    pub fn stage_results(&self) -> &[StageResult] {
        &self.stage_results
    }

    pub fn stage_state(&self, stage: StageKind) -> StageState {
        self.stage_states[stage.index()]
    }

    pub fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Set only once every stage has passed.
    pub fn viability_score(&self) -> Option<f64> {
        self.viability_score
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn result_for(&self, stage: StageKind) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| r.stage == stage)
    }

    /// The result that killed the session, if it was killed.
    pub fn kill_result(&self) -> Option<&StageResult> {
        match self.status {
            SessionStatus::Killed => self.stage_results.last(),
            _ => None,
        }
    }

    pub(crate) fn set_stage_state(&mut self, stage: StageKind, state: StageState) {
        self.stage_states[stage.index()] = state;
    }

    pub(crate) fn push_result(&mut self, result: StageResult) {
        self.stage_results.push(result);
    }

    pub(crate) fn advance(&mut self) {
        self.current_stage_index += 1;
    }

    pub(crate) fn kill(&mut self) {
        self.status = SessionStatus::Killed;
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn complete(&mut self, viability_score: f64) {
        self.status = SessionStatus::Completed;
        self.viability_score = Some(viability_score);
        self.finished_at = Some(Utc::now());
    }
}
