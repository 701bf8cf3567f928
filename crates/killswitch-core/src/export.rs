//! Session export.
//!
//! [`SessionReport`] renders any session, including one killed at any stage,
//! to a self-describing JSON document.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::orchestrator::ViabilityVerdict;
use crate::session::{SessionStatus, ValidationSession};
use crate::stage::{StageKind, StageMetrics, StageResult, StageState};
use crate::threshold::{Criterion, ProfileName};

/// One row per stage, including stages that never ran.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageSummary {
    pub stage: StageKind,
    pub state: StageState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_criterion: Option<Criterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StageMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionReport {
    pub session_id: String,
    pub problem: String,
    pub audience: String,
    pub profile: ProfileName,
    pub status: SessionStatus,
    /// Index of the stage that was running when the session ended.
    pub stage_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed_at: Option<StageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ViabilityVerdict>,
    pub stages: Vec<StageSummary>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn from_session(session: &ValidationSession) -> Self {
        let stages = StageKind::ORDER
            .iter()
            .map(|stage| summarize(*stage, session))
            .collect();
        let kill = session.kill_result();

        Self {
            session_id: session.id().to_string(),
            problem: session.problem().to_string(),
            audience: session.audience().to_string(),
            profile: session.profile(),
            status: session.status(),
            stage_index: session.current_stage_index(),
            killed_at: kill.map(|r| r.stage),
            kill_reason: kill.map(|r| r.reason.clone()),
            viability_score: session.viability_score(),
            verdict: session.viability_score().map(ViabilityVerdict::from_score),
            stages,
            started_at: session.started_at(),
            finished_at: session.finished_at(),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Plain-text summary, one line per stage.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "session {} [{}] profile={}",
            self.session_id, self.status, self.profile
        )];
        for s in &self.stages {
            let score = s
                .score
                .map(|v| format!("{v:.1}/10"))
                .unwrap_or_else(|| "-".to_string());
            let reason = s.reason.as_deref().unwrap_or("");
            lines.push(format!(
                "  {:<8} {:<8} {:>7}  {}",
                s.stage.as_str(),
                s.state.as_str(),
                score,
                reason
            ));
        }
        if let (Some(score), Some(verdict)) = (self.viability_score, self.verdict) {
            lines.push(format!("viability {score:.1}/10: {verdict}"));
        }
        lines
    }
}

fn summarize(stage: StageKind, session: &ValidationSession) -> StageSummary {
    let result: Option<&StageResult> = session.result_for(stage);
    StageSummary {
        stage,
        state: session.stage_state(stage),
        score: result.map(|r| r.score),
        reason: result.map(|r| r.reason.clone()),
        failed_criterion: result.and_then(|r| r.failed_criterion),
        metrics: result.map(|r| r.metrics.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoringResult;
    use crate::orchestrator::StageOrchestrator;
    use crate::stage::StageResult;
    use crate::stages::MarketMetrics;
    use crate::threshold::{ThresholdVerdict, Violation};

    fn killed_session() -> ValidationSession {
        let mut o = StageOrchestrator::new(
            "Freelancers waste hours reconciling invoices",
            "Freelance designers",
            ProfileName::Easy,
        )
        .unwrap();
        o.begin_stage().unwrap();
        o.complete_stage(StageResult::new(
            6.0,
            StageMetrics::Pain(ScoringResult::default()),
            ThresholdVerdict::pass("ok"),
        ))
        .unwrap();
        o.begin_stage().unwrap();
        o.complete_stage(StageResult::new(
            2.0,
            StageMetrics::Market(MarketMetrics::default()),
            ThresholdVerdict::fail(Violation {
                criterion: Criterion::PayingCompetitors,
                reason: "paying_competitors 2 below required 3 (short by 1)".into(),
            }),
        ))
        .unwrap();
        o.into_session()
    }

    #[test]
    fn test_killed_session_is_exportable() {
        let report = SessionReport::from_session(&killed_session());
        assert_eq!(report.status, SessionStatus::Killed);
        assert_eq!(report.stage_index, 1);
        assert_eq!(report.killed_at, Some(StageKind::Market));
        assert!(report.kill_reason.as_deref().unwrap().contains("paying_competitors"));
        assert_eq!(report.viability_score, None);
        assert_eq!(report.stages.len(), 4);
        assert_eq!(report.stages[2].state, StageState::Pending);
        assert!(report.stages[2].score.is_none());

        let json = report.to_json().unwrap();
        assert_eq!(SessionReport::from_json(&json).unwrap(), report);
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = SessionReport::from_session(&killed_session());
        report.write_json(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"status\": \"killed\""));
    }

    #[test]
    fn test_summary_lines_cover_every_stage() {
        let report = SessionReport::from_session(&killed_session());
        let lines = report.summary_lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("market"));
        assert!(lines[2].contains("paying_competitors"));
    }
}
