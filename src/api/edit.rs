use log::Level;
use serde_json::{json, Value};
use std::path::Path;
use uuid::Uuid;

use crate::adapters::HostControl;
use crate::api::errors::{id_str, ErrorId};
use crate::api::Reconciler;
use crate::fs::{edit_config_line, sha256_hex_of, EditOutcome};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{step_id, ConfigLine, Step, StepRecord, StepStatus};

/// Insert optional before/after hashes into a fact's fields.
fn insert_hashes(extra: &mut Value, before: Option<&String>, after: Option<&String>) {
    if let Some(obj) = extra.as_object_mut() {
        if let Some(bh) = before {
            obj.insert("hash_alg".to_string(), json!("sha256"));
            obj.insert("before_hash".to_string(), json!(bh));
        }
        if let Some(ah) = after {
            obj.insert("hash_alg".to_string(), json!("sha256"));
            obj.insert("after_hash".to_string(), json!(ah));
        }
    }
}

pub(crate) fn edit_config<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    slog: &StageLogger<'_>,
    mid: &Uuid,
    path: &Path,
    line: &ConfigLine,
    idx: usize,
) -> StepRecord {
    let step = Step::ConfigEdit {
        path: path.to_path_buf(),
        key: line.key.clone(),
    };
    let sid = step_id(mid, &step, idx);
    let shown = path.display().to_string();
    let before_hash = sha256_hex_of(path);

    let (status, mut extra, decision_warn) = match edit_config_line(path, line) {
        Ok(EditOutcome::Rewritten { backup, changes }) => {
            api.audit.log(
                Level::Info,
                &format!(
                    "{}: rewrote {} (backup {})",
                    shown,
                    line.key,
                    backup.display()
                ),
            );
            let values: Vec<Value> = changes
                .iter()
                .map(|c| json!({ "old": c.old, "new": c.new }))
                .collect();
            (
                StepStatus::Applied,
                json!({
                    "outcome": "rewritten",
                    "backup_path": backup.display().to_string(),
                    "changes": values,
                }),
                false,
            )
        }
        Ok(EditOutcome::Unchanged { value }) => (
            StepStatus::Unchanged,
            json!({ "outcome": "unchanged", "value": value }),
            false,
        ),
        Ok(EditOutcome::KeyMissing) => {
            let reason = format!("{} not set", line.key);
            api.audit
                .log(Level::Warn, &format!("{shown}: {reason}; left untouched"));
            (
                StepStatus::Skipped {
                    reason: reason.clone(),
                },
                json!({ "outcome": "skipped", "reason": reason }),
                true,
            )
        }
        Ok(EditOutcome::FileMissing) => {
            let reason = "file not found".to_string();
            api.audit.log(Level::Warn, &format!("{shown}: {reason}"));
            (
                StepStatus::Skipped {
                    reason: reason.clone(),
                },
                json!({ "outcome": "skipped", "reason": reason }),
                true,
            )
        }
        Err(e) => {
            api.audit.log(Level::Warn, &format!("{shown}: edit failed: {e}"));
            (
                StepStatus::Failed {
                    error: e.to_string(),
                },
                json!({
                    "outcome": "failed",
                    "error": e.to_string(),
                    "error_id": id_str(ErrorId::E_CONFIG),
                }),
                true,
            )
        }
    };

    let after_hash = sha256_hex_of(path);
    insert_hashes(&mut extra, before_hash.as_ref(), after_hash.as_ref());
    let ev = slog
        .config_edit()
        .step(sid.to_string())
        .path(shown)
        .field("key", json!(line.key))
        .merge(extra);
    if decision_warn {
        ev.emit_warn();
    } else {
        ev.emit_success();
    }

    StepRecord {
        id: sid,
        step,
        status,
    }
}
