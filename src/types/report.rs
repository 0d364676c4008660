use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use super::entry::Action;

/// What a single step of a run touched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Entry { name: String, action: Action },
    ConfigEdit { path: PathBuf, key: String },
    RemoveDir { path: PathBuf },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Entry { name, action } => write!(f, "{action} {name}"),
            Step::ConfigEdit { path, key } => write!(f, "edit {key} in {}", path.display()),
            Step::RemoveDir { path } => write!(f, "remove {}", path.display()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Unchanged,
    Skipped { reason: String },
    Failed { error: String },
}

impl StepStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            StepStatus::Applied => "ok",
            StepStatus::Unchanged => "unchanged",
            StepStatus::Skipped { .. } => "skipped",
            StepStatus::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub id: Uuid,
    pub step: Step,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub run_id: Option<Uuid>,
    pub manifest_id: Option<Uuid>,
    pub records: Vec<StepRecord>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Records whose step failed; the run itself still completed.
    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(|r| r.status.is_failure())
    }

    #[must_use]
    pub fn record_for(&self, step: &Step) -> Option<&StepRecord> {
        self.records.iter().find(|r| &r.step == step)
    }
}
