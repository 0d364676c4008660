use log::Level;
use serde_json::Value;

/// Log target used for structured facts by [`LogFacts`].
pub const FACTS_TARGET: &str = "bootfix::facts";

pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FactsEmitter for NullSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for NullSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Writes each fact as one JSON line at debug level on [`FACTS_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacts;

impl FactsEmitter for LogFacts {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(
            target: FACTS_TARGET,
            "{}",
            serde_json::json!({
                "subsystem": subsystem,
                "event": event,
                "decision": decision,
                "fields": fields,
            })
        );
    }
}

/// Forwards audit messages to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAudit;

impl AuditSink for LogAudit {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
    }
}
