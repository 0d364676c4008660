use serde_json::json;

use crate::logging::StageLogger;
use crate::types::{StepRecord, StepStatus};

/// Render one line per record, in order, plus a trailing tally.
///
/// Lines read `[<status>] <step>` with `: <detail>` appended for skipped and
/// failed steps.
#[must_use]
pub fn summarize(records: &[StepRecord]) -> Vec<String> {
    let mut out: Vec<String> = records
        .iter()
        .map(|r| match &r.status {
            StepStatus::Skipped { reason } => {
                format!("[{}] {}: {reason}", r.status.label(), r.step)
            }
            StepStatus::Failed { error } => format!("[{}] {}: {error}", r.status.label(), r.step),
            StepStatus::Applied | StepStatus::Unchanged => {
                format!("[{}] {}", r.status.label(), r.step)
            }
        })
        .collect();
    let t = Tally::of(records);
    out.push(format!(
        "{} applied, {} unchanged, {} skipped, {} failed",
        t.applied, t.unchanged, t.skipped, t.failed
    ));
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub applied: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub(crate) fn of(records: &[StepRecord]) -> Self {
        records.iter().fold(Self::default(), |mut t, r| {
            match r.status {
                StepStatus::Applied => t.applied += 1,
                StepStatus::Unchanged => t.unchanged += 1,
                StepStatus::Skipped { .. } => t.skipped += 1,
                StepStatus::Failed { .. } => t.failed += 1,
            }
            t
        })
    }
}

/// Emit the `summary` fact for a completed run.
pub(crate) fn emit(slog: &StageLogger<'_>, records: &[StepRecord], duration_ms: u64) {
    let t = Tally::of(records);
    let ev = slog.summary().merge(json!({
        "steps": records.len(),
        "applied": t.applied,
        "unchanged": t.unchanged,
        "skipped": t.skipped,
        "failed": t.failed,
        "duration_ms": duration_ms,
    }));
    // Best-effort failures downgrade the run to a warning, never a failure.
    if t.failed > 0 {
        ev.emit_warn();
    } else {
        ev.emit_success();
    }
}
