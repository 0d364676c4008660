use log::Level;
use serde_json::json;

use crate::adapters::HostControl;
use crate::api::errors::{exit_code_for, id_str, ApiError, ErrorId};
use crate::api::Reconciler;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};

/// The one up-front gate: host configuration changes need root.
pub(crate) fn check_privilege<C: HostControl, E: FactsEmitter, A: AuditSink>(
    api: &Reconciler<C, E, A>,
    slog: &StageLogger<'_>,
) -> Result<(), ApiError> {
    if api.privilege.is_privileged() {
        slog.preflight()
            .field("privileged", json!(true))
            .emit_success();
        return Ok(());
    }
    let msg = format!("must run as root ({})", api.privilege.denial());
    api.audit.log(Level::Error, &msg);
    slog.preflight()
        .field("privileged", json!(false))
        .field("error", json!(msg))
        .field("error_id", json!(id_str(ErrorId::E_PRIVILEGE)))
        .field("exit_code", json!(exit_code_for(ErrorId::E_PRIVILEGE)))
        .emit_failure();
    Err(ApiError::InsufficientPrivilege(msg))
}
