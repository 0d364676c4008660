use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Apply redactions to a fact event for comparison across runs.
/// Zeroes timestamps to `TS_ZERO` and removes fields that differ between
/// otherwise identical runs.
pub fn redact_event(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert("ts".into(), Value::String(TS_ZERO.to_string()));
        obj.remove("run_id");
        obj.remove("duration_ms");
        // Content hashes and backup names depend on wall-clock and prior runs
        obj.remove("before_hash");
        obj.remove("after_hash");
        obj.remove("hash_alg");
        obj.remove("backup_path");
    }
    v
}
