use serde::Serialize;
use std::fmt;

use super::errors::{Error, Result};

/// Operation applied to a service unit or package on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Mask,
    Unmask,
    Disable,
    Enable,
    Stop,
    Purge,
    Autoremove,
    RegenerateBootloader,
    None,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Mask => "mask",
            Action::Unmask => "unmask",
            Action::Disable => "disable",
            Action::Enable => "enable",
            Action::Stop => "stop",
            Action::Purge => "purge",
            Action::Autoremove => "autoremove",
            Action::RegenerateBootloader => "regenerate-bootloader",
            Action::None => "none",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One desired host state: apply `action` to the unit or package `name`.
///
/// The name is validated at construction and never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DesiredStateEntry {
    name: String,
    action: Action,
    best_effort: bool,
}

impl DesiredStateEntry {
    /// Build an entry; `best_effort` decides whether a failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidEntry` when `name` is empty or whitespace.
    pub fn new(name: impl Into<String>, action: Action, best_effort: bool) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_entry(format!(
                "entry name must not be empty (action {action})"
            )));
        }
        Ok(Self {
            name,
            action,
            best_effort,
        })
    }

    /// Shorthand for a best-effort entry, the common case.
    ///
    /// # Errors
    ///
    /// Same as [`DesiredStateEntry::new`].
    pub fn best_effort(name: impl Into<String>, action: Action) -> Result<Self> {
        Self::new(name, action, true)
    }

    /// Shorthand for an entry whose failure terminates the run.
    ///
    /// # Errors
    ///
    /// Same as [`DesiredStateEntry::new`].
    pub fn required(name: impl Into<String>, action: Action) -> Result<Self> {
        Self::new(name, action, false)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub const fn is_best_effort(&self) -> bool {
        self.best_effort
    }
}

impl fmt::Display for DesiredStateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::errors::ErrorKind;

    #[test]
    fn empty_names_are_rejected() {
        for bad in ["", "   ", "\t\n"] {
            let err = DesiredStateEntry::best_effort(bad, Action::Mask).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidEntry);
        }
    }

    #[test]
    fn display_reads_as_a_command() {
        let e = DesiredStateEntry::required("fstrim.timer", Action::Enable).unwrap();
        assert_eq!(e.to_string(), "enable fstrim.timer");
        assert!(!e.is_best_effort());
        assert_eq!(Action::RegenerateBootloader.to_string(), "regenerate-bootloader");
    }
}
