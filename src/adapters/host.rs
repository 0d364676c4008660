//! Production `HostControl`: `systemctl`, `apt-get` and `update-grub`.
use std::process::Command;

use log::debug;

use super::control::{ControlError, HostControl, Outcome};
use crate::types::Action;

/// stderr fragments meaning "this unit/package does not exist here".
const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "does not exist",
    "not loaded",
    "unable to locate package",
    "is not installed",
];

/// A fully resolved host invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostCommand {
    pub program: &'static str,
    pub args: Vec<String>,
    pub env: Vec<(&'static str, &'static str)>,
}

fn systemctl(verb: &[&str], target: &str) -> HostCommand {
    let mut args: Vec<String> = verb.iter().map(|s| (*s).to_string()).collect();
    args.push(target.to_string());
    HostCommand {
        program: "systemctl",
        args,
        env: Vec::new(),
    }
}

fn apt(args: &[&str]) -> HostCommand {
    HostCommand {
        program: "apt-get",
        args: args.iter().map(|s| (*s).to_string()).collect(),
        env: vec![("DEBIAN_FRONTEND", "noninteractive")],
    }
}

/// Map an action to the command that performs it; `None` for `Action::None`.
#[must_use]
pub fn host_command(action: Action, target: &str) -> Option<HostCommand> {
    match action {
        Action::Mask => Some(systemctl(&["mask"], target)),
        Action::Unmask => Some(systemctl(&["unmask"], target)),
        Action::Disable => Some(systemctl(&["disable", "--now"], target)),
        Action::Enable => Some(systemctl(&["enable", "--now"], target)),
        Action::Stop => Some(systemctl(&["stop"], target)),
        Action::Purge => Some(apt(&["purge", "-y", target])),
        Action::Autoremove => Some(apt(&["autoremove", "--purge", "-y"])),
        Action::RegenerateBootloader => Some(HostCommand {
            program: "update-grub",
            args: Vec::new(),
            env: Vec::new(),
        }),
        Action::None => None,
    }
}

/// Classify a non-zero exit into a `ControlError`.
#[must_use]
pub fn classify_failure(target: &str, code: Option<i32>, stderr: &str) -> ControlError {
    let lower = stderr.to_lowercase();
    if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        ControlError::NotFound(target.to_string())
    } else {
        ControlError::Failed {
            code,
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Shells out to the host tools and waits for each to finish.
#[derive(Clone, Debug, Default)]
pub struct SystemCommandControl;

impl HostControl for SystemCommandControl {
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError> {
        let Some(cmd) = host_command(action, target) else {
            return Ok(Outcome::Unchanged);
        };
        debug!("exec: {} {}", cmd.program, cmd.args.join(" "));
        let output = Command::new(cmd.program)
            .args(&cmd.args)
            .envs(cmd.env.iter().copied())
            .output()
            .map_err(|e| ControlError::Unavailable {
                program: cmd.program.to_string(),
                reason: e.to_string(),
            })?;
        if output.status.success() {
            Ok(Outcome::Applied)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(classify_failure(target, output.status.code(), &stderr))
        }
    }
}
