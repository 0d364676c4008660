use log::Level;
use serde_json::json;
use std::path::Path;
use uuid::Uuid;

use crate::adapters::HostControl;
use crate::api::errors::{id_str, ErrorId};
use crate::api::Reconciler;
use crate::fs::{kind_of, remove_dir_if_present, RemoveOutcome};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{step_id, Step, StepRecord, StepStatus};

/// Best-effort removal of a leftover data directory; missing is fine.
pub(crate) fn remove_dir<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    slog: &StageLogger<'_>,
    mid: &Uuid,
    dir: &Path,
    idx: usize,
) -> StepRecord {
    let step = Step::RemoveDir {
        path: dir.to_path_buf(),
    };
    let sid = step_id(mid, &step, idx);
    let shown = dir.display().to_string();
    let ev = slog
        .cleanup()
        .step(sid.to_string())
        .path(shown.clone())
        .field("kind", json!(kind_of(dir)));

    let status = match remove_dir_if_present(dir) {
        Ok(RemoveOutcome::Removed) => {
            api.audit.log(Level::Info, &format!("removed {shown}"));
            ev.field("outcome", json!("removed")).emit_success();
            StepStatus::Applied
        }
        Ok(RemoveOutcome::Absent) => {
            ev.field("outcome", json!("absent")).emit_success();
            StepStatus::Unchanged
        }
        Err(e) => {
            api.audit
                .log(Level::Warn, &format!("could not remove {shown}: {e}"));
            ev.field("outcome", json!("failed"))
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_CLEANUP)))
                .emit_warn();
            StepStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    StepRecord {
        id: sid,
        step,
        status,
    }
}
