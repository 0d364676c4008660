mod common;

use bootfix::constants::{DISABLED_UNITS, ENABLED_TIMERS, MASKED_UNITS, SNAPD_PACKAGE};
use bootfix::fs::list_backups;
use bootfix::manifest::Manifest;
use bootfix::policy::Policy;
use bootfix::types::{Step, StepStatus};
use bootfix::summarize;
use common::{privileged, write_grub, FakeHost, TestEmitter};

const SNAPD_UNITS: &[&str] = &["snapd.socket", "snapd.service", "snapd.seeded.service"];

fn full_host() -> FakeHost {
    let units = MASKED_UNITS
        .iter()
        .chain(DISABLED_UNITS)
        .chain(ENABLED_TIMERS)
        .chain(SNAPD_UNITS)
        .copied();
    FakeHost::with_units(units).install(SNAPD_PACKAGE)
}

#[test]
fn second_run_leaves_host_and_grub_unchanged() {
    let td = tempfile::tempdir().unwrap();
    let grub = write_grub(td.path());
    let host = full_host();
    let policy = common::policy_for(&grub);
    let manifest = Manifest::builtin(&policy).unwrap();

    let first = privileged(&host, TestEmitter::default(), policy.clone())
        .run(&manifest)
        .unwrap();
    let state_after_first = host.snapshot();
    let grub_after_first = std::fs::read_to_string(&grub).unwrap();

    let second = privileged(&host, TestEmitter::default(), policy)
        .run(&manifest)
        .unwrap();

    assert_eq!(host.snapshot(), state_after_first);
    assert_eq!(std::fs::read_to_string(&grub).unwrap(), grub_after_first);
    assert_eq!(list_backups(&grub).len(), 1);
    assert_eq!(host.regenerations(), 1, "update-grub only after a rewrite");

    assert_eq!(first.failures().count(), 0, "{:?}", summarize(&first.records));
    assert!(second
        .records
        .iter()
        .all(|r| r.status == StepStatus::Unchanged));
    let edit = Step::ConfigEdit {
        path: grub.clone(),
        key: "GRUB_CMDLINE_LINUX_DEFAULT".into(),
    };
    assert_eq!(first.record_for(&edit).unwrap().status, StepStatus::Applied);
    assert_eq!(second.record_for(&edit).unwrap().status, StepStatus::Unchanged);
}

#[test]
fn manifest_id_is_stable_across_runs() {
    let td = tempfile::tempdir().unwrap();
    let grub = write_grub(td.path());
    let host = full_host();
    let policy = common::policy_for(&grub);
    let manifest = Manifest::builtin(&policy).unwrap();

    let a = privileged(&host, TestEmitter::default(), policy.clone())
        .run(&manifest)
        .unwrap();
    let b = privileged(&host, TestEmitter::default(), policy)
        .run(&manifest)
        .unwrap();

    assert_eq!(a.manifest_id, b.manifest_id);
    assert_ne!(a.run_id, b.run_id);
    let ids_a: Vec<_> = a.records.iter().map(|r| r.id).collect();
    let ids_b: Vec<_> = b.records.iter().map(|r| r.id).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn purge_mode_removes_package_and_leftover_dirs() {
    let td = tempfile::tempdir().unwrap();
    let grub = write_grub(td.path());
    let data = td.path().join("var-lib-snapd");
    std::fs::create_dir_all(data.join("seed")).unwrap();
    std::fs::write(data.join("seed/seed.yaml"), b"snaps: []").unwrap();

    let host = full_host();
    let policy = Policy {
        purge_packages: true,
        ..common::policy_for(&grub)
    };
    let mut manifest = Manifest::builtin(&policy).unwrap();
    // Keep the test off the real filesystem.
    manifest.cleanup = vec![data.clone(), td.path().join("never-existed")];

    let report = privileged(&host, TestEmitter::default(), policy.clone())
        .run(&manifest)
        .unwrap();

    assert!(!data.exists());
    assert!(!host.snapshot().packages.contains(SNAPD_PACKAGE));
    assert_eq!(
        report
            .record_for(&Step::RemoveDir { path: data.clone() })
            .unwrap()
            .status,
        StepStatus::Applied
    );

    let again = privileged(&host, TestEmitter::default(), policy)
        .run(&manifest)
        .unwrap();
    assert_eq!(
        again
            .record_for(&Step::RemoveDir { path: data })
            .unwrap()
            .status,
        StepStatus::Unchanged
    );
}

#[test]
fn skipping_update_grub_still_edits() {
    let td = tempfile::tempdir().unwrap();
    let grub = write_grub(td.path());
    let host = full_host();
    let policy = Policy {
        regenerate_bootloader: false,
        ..common::policy_for(&grub)
    };

    privileged(&host, TestEmitter::default(), policy.clone())
        .run(&Manifest::builtin(&policy).unwrap())
        .unwrap();

    assert_eq!(list_backups(&grub).len(), 1);
    assert_eq!(host.regenerations(), 0);
}

#[test]
fn skipping_grub_never_touches_the_file() {
    let td = tempfile::tempdir().unwrap();
    let grub = write_grub(td.path());
    let host = full_host();
    let policy = Policy {
        edit_bootloader: false,
        ..common::policy_for(&grub)
    };

    let report = privileged(&host, TestEmitter::default(), policy.clone())
        .run(&Manifest::builtin(&policy).unwrap())
        .unwrap();

    assert_eq!(std::fs::read_to_string(&grub).unwrap(), common::GRUB_SAMPLE);
    assert!(list_backups(&grub).is_empty());
    assert!(!report
        .records
        .iter()
        .any(|r| matches!(r.step, Step::ConfigEdit { .. })));
}
