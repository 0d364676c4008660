//! Deterministic UUIDv5 identifiers for manifests and steps.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `manifest_id` and step ids are reproducible across runs for the same
//! entry list.
use std::fmt::Write;
use uuid::Uuid;

use super::entry::DesiredStateEntry;
use super::report::Step;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

fn serialize_step(step: &Step) -> String {
    match step {
        Step::Entry { name, action } => format!("E:{action}:{name}"),
        Step::ConfigEdit { path, key } => format!("C:{}:{key}", path.display()),
        Step::RemoveDir { path } => format!("R:{}", path.display()),
    }
}

/// Compute a deterministic UUIDv5 for an ordered entry list.
///
/// Two lists with identical entries in identical order share an id. The
/// best-effort flag is part of the input since it changes run semantics.
#[must_use]
pub fn manifest_id(entries: &[DesiredStateEntry]) -> Uuid {
    let mut s = String::new();
    for e in entries {
        let _ = writeln!(
            s,
            "{}:{}:{}",
            e.action(),
            e.name(),
            if e.is_best_effort() { "b" } else { "r" }
        );
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}

/// Compute a deterministic UUIDv5 for a step at position `idx` of a run.
#[must_use]
pub fn step_id(manifest_id: &Uuid, step: &Step, idx: usize) -> Uuid {
    let mut s = serialize_step(step);
    let _ = write!(s, "#{idx}");
    Uuid::new_v5(manifest_id, s.as_bytes())
}
