//! One full reconciliation pass.
//!
//! Order: privilege gate, entries, leftover directories, bootloader edit,
//! bootloader regeneration (only after a rewrite), summary fact. Each step is
//! attempted exactly once; a run interrupted midway is safe to repeat.
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::adapters::HostControl;
use crate::api::errors::{id_str, ApiError};
use crate::api::{apply, cleanup, edit, preflight, summary, Reconciler};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::manifest::Manifest;
use crate::types::{manifest_id, RunReport, StepStatus};

pub(crate) fn run<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    manifest: &Manifest,
) -> Result<RunReport, ApiError> {
    let t0 = Instant::now();
    let mid = manifest_id(&manifest.entries);
    let tctx = api.ctx_for(&mid);
    let slog = StageLogger::new(&tctx);

    api.audit.log(Level::Info, "run: starting");
    if let Err(e) = preflight::check_privilege(api, &slog) {
        return Err(abort(api, &slog, 0, e));
    }

    let mut records = Vec::new();
    for entry in &manifest.entries {
        let idx = records.len();
        match apply::apply_entry(api, &slog, &mid, entry, idx) {
            Ok(rec) => records.push(rec),
            Err(e) => return Err(abort(api, &slog, records.len(), e)),
        }
    }

    for dir in &manifest.cleanup {
        let idx = records.len();
        records.push(cleanup::remove_dir(api, &slog, &mid, dir, idx));
    }

    if api.policy.edit_bootloader {
        let idx = records.len();
        let rec = edit::edit_config(
            api,
            &slog,
            &mid,
            &api.policy.bootloader_config,
            &manifest.cmdline,
            idx,
        );
        let rewritten = rec.status == StepStatus::Applied;
        records.push(rec);
        if rewritten && api.policy.regenerate_bootloader {
            let idx = records.len();
            // The regeneration entry is best-effort in the built-in manifest.
            match apply::apply_entry(api, &slog, &mid, &manifest.regenerate, idx) {
                Ok(rec) => records.push(rec),
                Err(e) => return Err(abort(api, &slog, records.len(), e)),
            }
        }
    }

    let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    summary::emit(&slog, &records, duration_ms);
    api.audit.log(Level::Info, "run: finished");

    Ok(RunReport {
        run_id: Some(api.run_id),
        manifest_id: Some(mid),
        records,
        duration_ms,
    })
}

/// Emit the failing `summary` fact for a run ending in `e`.
fn abort<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    slog: &StageLogger<'_>,
    steps: usize,
    e: ApiError,
) -> ApiError {
    slog.summary()
        .merge(json!({
            "steps": steps,
            "error": e.to_string(),
            "error_id": id_str(e.id()),
            "exit_code": e.exit_code(),
        }))
        .emit_failure();
    api.audit.log(Level::Error, "run: aborted");
    e
}
