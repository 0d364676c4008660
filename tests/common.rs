//! Shared test helpers for the bootfix integration tests.
#![allow(dead_code)]

use log::Level;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use bootfix::adapters::{ControlError, HostControl, Outcome, StaticPrivilege};
use bootfix::logging::{AuditSink, FactsEmitter};
use bootfix::policy::Policy;
use bootfix::types::Action;
use bootfix::Reconciler;

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

impl TestEmitter {
    pub fn fields(&self) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, _, f)| f.clone())
            .collect()
    }

    pub fn stage(&self, stage: &str) -> Vec<Value> {
        self.fields()
            .into_iter()
            .filter(|f| f.get("stage") == Some(&Value::from(stage)))
            .collect()
    }
}

/// Captures audit lines so tests can assert on warnings.
#[derive(Clone, Default, Debug)]
pub struct TestAudit {
    pub lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl AuditSink for TestAudit {
    fn log(&self, level: Level, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}

/// Replies to every call with the same scripted result and records the calls.
pub struct ScriptedControl {
    reply: Box<dyn Fn(Action, &str) -> Result<Outcome, ControlError>>,
    calls: Mutex<Vec<(Action, String)>>,
}

impl ScriptedControl {
    pub fn new(reply: impl Fn(Action, &str) -> Result<Outcome, ControlError> + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every target is unknown to the host.
    pub fn not_found() -> Self {
        Self::new(|_, target| Err(ControlError::NotFound(target.to_string())))
    }

    pub fn always_ok() -> Self {
        Self::new(|_, _| Ok(Outcome::Applied))
    }

    pub fn calls(&self) -> Vec<(Action, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl HostControl for ScriptedControl {
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError> {
        self.calls
            .lock()
            .unwrap()
            .push((action, target.to_string()));
        (self.reply)(action, target)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitState {
    pub enabled: bool,
    pub active: bool,
    pub masked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostState {
    pub units: BTreeMap<String, UnitState>,
    pub packages: BTreeSet<String>,
}

/// A stateful stand-in for the service and package managers.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
    regenerations: Mutex<usize>,
}

impl FakeHost {
    /// A host where every listed unit exists, enabled and running.
    pub fn with_units<'a>(units: impl IntoIterator<Item = &'a str>) -> Self {
        let host = Self::default();
        {
            let mut st = host.state.lock().unwrap();
            for u in units {
                st.units.insert(
                    u.to_string(),
                    UnitState {
                        enabled: true,
                        active: true,
                        masked: false,
                    },
                );
            }
        }
        host
    }

    pub fn install(self, package: &str) -> Self {
        self.state.lock().unwrap().packages.insert(package.to_string());
        self
    }

    pub fn snapshot(&self) -> HostState {
        self.state.lock().unwrap().clone()
    }

    pub fn regenerations(&self) -> usize {
        *self.regenerations.lock().unwrap()
    }
}

impl HostControl for FakeHost {
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError> {
        let changed = |b: bool| if b { Outcome::Applied } else { Outcome::Unchanged };
        let mut st = self.state.lock().unwrap();
        match action {
            Action::RegenerateBootloader => {
                *self.regenerations.lock().unwrap() += 1;
                return Ok(Outcome::Applied);
            }
            Action::Autoremove => return Ok(Outcome::Unchanged),
            Action::Purge => return Ok(changed(st.packages.remove(target))),
            Action::None => return Ok(Outcome::Unchanged),
            _ => {}
        }
        let unit = st
            .units
            .get_mut(target)
            .ok_or_else(|| ControlError::NotFound(target.to_string()))?;
        let before = *unit;
        match action {
            Action::Mask => unit.masked = true,
            Action::Unmask => unit.masked = false,
            Action::Disable => {
                unit.enabled = false;
                unit.active = false;
            }
            Action::Enable => {
                if unit.masked {
                    return Err(ControlError::Failed {
                        code: Some(1),
                        stderr: format!("Unit {target} is masked."),
                    });
                }
                unit.enabled = true;
                unit.active = true;
            }
            Action::Stop => unit.active = false,
            _ => {}
        }
        Ok(changed(before != *unit))
    }
}

/// Policy pointing the bootloader edit at `grub_file`, nothing purged.
pub fn policy_for(grub_file: &Path) -> Policy {
    Policy {
        bootloader_config: grub_file.to_path_buf(),
        ..Policy::default()
    }
}

/// Reconciler that believes it runs as root.
pub fn privileged<C: HostControl>(
    control: C,
    facts: TestEmitter,
    policy: Policy,
) -> Reconciler<C, TestEmitter, TestAudit> {
    Reconciler::new(control, facts, TestAudit::default(), policy)
        .with_privilege_oracle(Box::new(StaticPrivilege(true)))
}

pub const GRUB_SAMPLE: &str = "\
# If you change this file, run 'update-grub' afterwards to update
GRUB_DEFAULT=0
GRUB_TIMEOUT=5
GRUB_DISTRIBUTOR=`lsb_release -i -s 2> /dev/null || echo Debian`
GRUB_CMDLINE_LINUX_DEFAULT=\"debug quiet splash foo\"
GRUB_CMDLINE_LINUX=\"\"
";

/// Write the sample grub defaults into `dir` and return the path.
pub fn write_grub(dir: &Path) -> std::path::PathBuf {
    let p = dir.join("grub");
    std::fs::write(&p, GRUB_SAMPLE).unwrap();
    p
}
