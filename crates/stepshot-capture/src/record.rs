//! Run records and outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stepshot_intent::Intent;
use uuid::Uuid;

/// File name of the run record inside a run's output directory.
pub const RECORD_FILE_NAME: &str = "metadata.json";

/// What each interaction phase achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    /// Pattern that matched the action control, if any.
    pub action_control: Option<String>,
    /// Whether a dialog or form was detected after the action phase.
    pub form_detected: bool,
    /// Whether a text field was filled.
    pub form_filled: bool,
    /// Pattern that matched the submit control, if any.
    pub submit_control: Option<String>,
}

/// The persisted summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    /// The question exactly as asked.
    pub question: String,
    pub intent: Intent,
    /// Number of captures written; always equals `captures.len()`.
    pub step_count: u32,
    /// Capture file names in step order.
    pub captures: Vec<String>,
    pub phases: PhaseSummary,
    /// When the final capture completed.
    pub timestamp: DateTime<Utc>,
    /// Directory holding the captures and this record.
    pub output_location: String,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All phases ran and the record was persisted.
    Completed(RunRecord),
    /// A systemic failure interrupted the run after the session was
    /// acquired.  Captures already written stay on disk; no record exists.
    Aborted {
        steps_captured: u32,
        output_location: String,
        reason: String,
    },
}

impl RunOutcome {
    pub fn record(&self) -> Option<&RunRecord> {
        match self {
            Self::Completed(record) => Some(record),
            Self::Aborted { .. } => None,
        }
    }

    pub fn steps_captured(&self) -> u32 {
        match self {
            Self::Completed(record) => record.step_count,
            Self::Aborted { steps_captured, .. } => *steps_captured,
        }
    }

    pub fn output_location(&self) -> &str {
        match self {
            Self::Completed(record) => &record.output_location,
            Self::Aborted {
                output_location, ..
            } => output_location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RunRecord {
        RunRecord {
            run_id: Uuid::now_v7(),
            question: "How do I add a project in Linear?".into(),
            intent: stepshot_intent::parse("How do I add a project in Linear?"),
            step_count: 2,
            captures: vec!["step-1-initial.png".into(), "step-2-final.png".into()],
            phases: PhaseSummary::default(),
            timestamp: Utc::now(),
            output_location: "screenshots/linear-create-project".into(),
        }
    }

    #[test]
    fn record_serializes_expected_fields() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["question"], "How do I add a project in Linear?");
        assert_eq!(json["intent"]["action"], "create");
        assert_eq!(json["intent"]["application"], "linear");
        assert_eq!(json["intent"]["target"], "project");
        assert_eq!(json["step_count"], 2);
        assert_eq!(json["output_location"], "screenshots/linear-create-project");
        assert!(json["timestamp"].is_string());
        assert!(json["run_id"].is_string());
    }

    #[test]
    fn outcome_accessors() {
        let completed = RunOutcome::Completed(sample_record());
        assert_eq!(completed.steps_captured(), 2);
        assert!(completed.record().is_some());

        let aborted = RunOutcome::Aborted {
            steps_captured: 1,
            output_location: "screenshots/x".into(),
            reason: "navigation failed".into(),
        };
        assert_eq!(aborted.steps_captured(), 1);
        assert_eq!(aborted.output_location(), "screenshots/x");
        assert!(aborted.record().is_none());
    }
}
