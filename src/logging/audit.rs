// Audit helpers that emit structured facts across reconciler stages.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for the stages `preflight`,
//   `apply.attempt`, `apply.result`, `config.edit`, `cleanup` and `summary`.
// - Ensures a minimal envelope is present on every fact: `schema_version`, `ts`,
//   `run_id`, `manifest_id`, `path`, `decision`.
use crate::logging::FactsEmitter;
use serde_json::{json, Value};

pub(crate) const SCHEMA_VERSION: i64 = 1;
pub(crate) const SUBSYSTEM: &str = "bootfix";

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub run_id: String,
    pub manifest_id: String,
    pub ts: String,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        run_id: String,
        manifest_id: String,
        ts: String,
    ) -> Self {
        Self {
            facts,
            run_id,
            manifest_id,
            ts,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    ApplyAttempt,
    ApplyResult,
    ConfigEdit,
    Cleanup,
    Summary,
}

impl Stage {
    #[must_use]
    pub const fn as_event(self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::ApplyResult => "apply.result",
            Stage::ConfigEdit => "config.edit",
            Stage::Cleanup => "cleanup",
            Stage::Summary => "summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with a centralized envelope.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn preflight(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Preflight)
    }
    pub fn apply_attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyAttempt)
    }
    pub fn apply_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyResult)
    }
    pub fn config_edit(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ConfigEdit)
    }
    pub fn cleanup(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Cleanup)
    }
    pub fn summary(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Summary)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn step(mut self, step_id: impl Into<String>) -> Self {
        self.fields.insert("step_id".into(), json!(step_id.into()));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn merge(mut self, extra: Value) -> Self {
        if let Value::Object(obj) = extra {
            self.fields.extend(obj);
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = self.fields;
        fields
            .entry("decision")
            .or_insert(json!(decision.as_str()));
        fields
            .entry("schema_version")
            .or_insert(json!(SCHEMA_VERSION));
        fields.entry("ts").or_insert(json!(self.ctx.ts));
        fields.entry("run_id").or_insert(json!(self.ctx.run_id));
        fields
            .entry("manifest_id")
            .or_insert(json!(self.ctx.manifest_id));
        fields.entry("path").or_insert(json!(""));
        self.ctx.facts.emit(
            SUBSYSTEM,
            self.stage.as_event(),
            decision.as_str(),
            Value::Object(fields),
        );
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
