// Facade for API module; delegates to submodules under src/api/

use crate::adapters::{EffectiveUid, HostControl, PrivilegeOracle};
use crate::logging::audit::AuditCtx;
use crate::logging::{now_iso, AuditSink, FactsEmitter, StageLogger};
use crate::manifest::Manifest;
use crate::policy::Policy;
use crate::types::{manifest_id, ConfigLine, DesiredStateEntry, RunReport, StepRecord};
use std::path::Path;
use uuid::Uuid;

mod apply;
mod cleanup;
mod edit;
pub mod errors;
mod preflight;
mod run;
pub mod summary;

pub use errors::ApiError;
pub use summary::summarize;

pub struct Reconciler<C: HostControl, E: FactsEmitter, A: AuditSink> {
    control: C,
    facts: E,
    audit: A,
    policy: Policy,
    privilege: Box<dyn PrivilegeOracle>,
    run_id: Uuid,
}

impl<C: HostControl, E: FactsEmitter, A: AuditSink> Reconciler<C, E, A> {
    pub fn new(control: C, facts: E, audit: A, policy: Policy) -> Self {
        Self {
            control,
            facts,
            audit,
            policy,
            privilege: Box::new(EffectiveUid),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_privilege_oracle(mut self, privilege: Box<dyn PrivilegeOracle>) -> Self {
        self.privilege = privilege;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn ctx_for<'a>(&'a self, mid: &Uuid) -> AuditCtx<'a> {
        AuditCtx::new(
            &self.facts as &dyn FactsEmitter,
            self.run_id.to_string(),
            mid.to_string(),
            now_iso(),
        )
    }

    /// Check that the process may change host configuration.
    pub fn preflight(&self) -> Result<(), ApiError> {
        let mid = Uuid::nil();
        let tctx = self.ctx_for(&mid);
        preflight::check_privilege(self, &StageLogger::new(&tctx))
    }

    /// Apply a single entry outside of a full run.
    ///
    /// A failing best-effort entry yields `Ok` with a failed record; a failing
    /// required entry yields `ApiError::EntryFailed`.
    pub fn apply_entry(&self, entry: &DesiredStateEntry) -> Result<StepRecord, ApiError> {
        let mid = manifest_id(std::slice::from_ref(entry));
        let tctx = self.ctx_for(&mid);
        apply::apply_entry(self, &StageLogger::new(&tctx), &mid, entry, 0)
    }

    /// Apply `line` to the file at `path`; never fatal.
    pub fn edit_config_line(&self, path: &Path, line: &ConfigLine) -> StepRecord {
        let mid = manifest_id(&[]);
        let tctx = self.ctx_for(&mid);
        edit::edit_config(self, &StageLogger::new(&tctx), &mid, path, line, 0)
    }

    /// Reconcile the host against `manifest` in a single pass.
    pub fn run(&self, manifest: &Manifest) -> Result<RunReport, ApiError> {
        run::run(self, manifest)
    }
}
