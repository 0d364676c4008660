//! Apply stage for a single desired-state entry.
//!
//! Side-effects:
//! - Emits `apply.attempt` and `apply.result` facts per entry.
//! - Invokes the host control capability once; there are no retries.
use log::Level;
use serde_json::json;
use uuid::Uuid;

use crate::adapters::{HostControl, Outcome};
use crate::api::errors::{exit_code_for, id_str, ApiError, ErrorId};
use crate::api::Reconciler;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{step_id, Action, DesiredStateEntry, Step, StepRecord, StepStatus};

pub(crate) fn apply_entry<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    slog: &StageLogger<'_>,
    mid: &Uuid,
    entry: &DesiredStateEntry,
    idx: usize,
) -> Result<StepRecord, ApiError> {
    let step = Step::Entry {
        name: entry.name().to_string(),
        action: entry.action(),
    };
    let sid = step_id(mid, &step, idx);
    let fields = json!({
        "unit": entry.name(),
        "action": entry.action(),
        "best_effort": entry.is_best_effort(),
    });
    slog.apply_attempt()
        .step(sid.to_string())
        .merge(fields.clone())
        .emit_success();

    if entry.action() == Action::None {
        slog.apply_result()
            .step(sid.to_string())
            .merge(fields)
            .field("outcome", json!("skipped"))
            .emit_success();
        return Ok(StepRecord {
            id: sid,
            step,
            status: StepStatus::Skipped {
                reason: "no action requested".to_string(),
            },
        });
    }

    match api.control.apply(entry.action(), entry.name()) {
        Ok(outcome) => {
            let (status, label) = match outcome {
                Outcome::Applied => (StepStatus::Applied, "applied"),
                Outcome::Unchanged => (StepStatus::Unchanged, "unchanged"),
            };
            api.audit.log(Level::Info, &format!("{entry}: {label}"));
            slog.apply_result()
                .step(sid.to_string())
                .merge(fields)
                .field("outcome", json!(label))
                .emit_success();
            Ok(StepRecord {
                id: sid,
                step,
                status,
            })
        }
        Err(e) if entry.is_best_effort() => {
            api.audit
                .log(Level::Warn, &format!("{entry}: {e} (ignored, best effort)"));
            slog.apply_result()
                .step(sid.to_string())
                .merge(fields)
                .field("outcome", json!("failed"))
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_ENTRY)))
                .emit_warn();
            Ok(StepRecord {
                id: sid,
                step,
                status: StepStatus::Failed {
                    error: e.to_string(),
                },
            })
        }
        Err(e) => {
            api.audit.log(Level::Error, &format!("{entry}: {e}"));
            slog.apply_result()
                .step(sid.to_string())
                .merge(fields)
                .field("outcome", json!("failed"))
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_ENTRY)))
                .field("exit_code", json!(exit_code_for(ErrorId::E_ENTRY)))
                .emit_failure();
            Err(ApiError::EntryFailed {
                name: entry.name().to_string(),
                action: entry.action(),
                reason: e.to_string(),
            })
        }
    }
}
