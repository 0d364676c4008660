//! The built-in list of desired host states.
//!
//! Everything a run does is baked in here; [`Policy`] only switches the
//! optional parts on or off.
use std::path::PathBuf;

use crate::constants::{
    CMDLINE_APPEND, CMDLINE_STRIP, DISABLED_UNITS, ENABLED_TIMERS, GRUB_CMDLINE_KEY,
    MASKED_UNITS, SNAPD_DIRS, SNAPD_PACKAGE,
};
use crate::policy::Policy;
use crate::types::{Action, ConfigLine, DesiredStateEntry, Result, TokenEdit};

/// Everything one run reconciles, in order.
#[derive(Debug)]
pub struct Manifest {
    pub entries: Vec<DesiredStateEntry>,
    /// Directories deleted best-effort after the entries (purge mode only).
    pub cleanup: Vec<PathBuf>,
    /// The bootloader configuration edit.
    pub cmdline: ConfigLine,
    /// Run after `cmdline` rewrote the file.
    pub regenerate: DesiredStateEntry,
}

impl Manifest {
    /// Build a manifest from explicit parts, with the default kernel
    /// command-line edit and bootloader regeneration.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in entry name is invalid.
    pub fn new(entries: Vec<DesiredStateEntry>) -> Result<Self> {
        Ok(Self {
            entries,
            cleanup: Vec::new(),
            cmdline: kernel_cmdline_edit(),
            regenerate: DesiredStateEntry::best_effort("grub", Action::RegenerateBootloader)?,
        })
    }

    /// The built-in manifest for `policy`.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in entry name is invalid.
    pub fn builtin(policy: &Policy) -> Result<Self> {
        let mut entries = Vec::new();
        for unit in MASKED_UNITS {
            entries.push(DesiredStateEntry::best_effort(*unit, Action::Mask)?);
        }
        for unit in DISABLED_UNITS {
            entries.push(DesiredStateEntry::best_effort(*unit, Action::Disable)?);
        }
        entries.extend(snapd_entries(policy.purge_packages)?);
        for timer in ENABLED_TIMERS {
            entries.push(DesiredStateEntry::best_effort(*timer, Action::Enable)?);
        }

        let mut manifest = Self::new(entries)?;
        if policy.purge_packages {
            manifest.cleanup = SNAPD_DIRS.iter().map(PathBuf::from).collect();
        }
        Ok(manifest)
    }
}

fn snapd_entries(purge: bool) -> Result<Vec<DesiredStateEntry>> {
    let be = DesiredStateEntry::best_effort;
    if purge {
        Ok(vec![
            be("snapd.service", Action::Stop)?,
            be("snapd.socket", Action::Disable)?,
            be("snapd.service", Action::Disable)?,
            be("snapd.seeded.service", Action::Disable)?,
            be(SNAPD_PACKAGE, Action::Purge)?,
            be("unused-dependencies", Action::Autoremove)?,
        ])
    } else {
        Ok(vec![
            be("snapd.socket", Action::Disable)?,
            be("snapd.service", Action::Disable)?,
            be("snapd.seeded.service", Action::Mask)?,
        ])
    }
}

/// Strip the splash tokens and pin USB autosuspend off on the kernel command line.
#[must_use]
pub fn kernel_cmdline_edit() -> ConfigLine {
    ConfigLine::new(
        GRUB_CMDLINE_KEY,
        TokenEdit::new(
            CMDLINE_STRIP.iter().copied(),
            CMDLINE_APPEND.iter().copied(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueTransform;

    fn has(m: &Manifest, name: &str, action: Action) -> bool {
        m.entries
            .iter()
            .any(|e| e.name() == name && e.action() == action)
    }

    #[test]
    fn default_manifest_disables_snapd_without_purging() {
        let m = Manifest::builtin(&Policy::default()).unwrap();
        assert!(has(&m, "snapd.socket", Action::Disable));
        assert!(!m.entries.iter().any(|e| e.action() == Action::Purge));
        assert!(m.cleanup.is_empty());
        assert!(m.entries.iter().all(DesiredStateEntry::is_best_effort));
        assert!(has(&m, "fstrim.timer", Action::Enable));
    }

    #[test]
    fn purge_mode_adds_purge_autoremove_and_cleanup() {
        let policy = Policy {
            purge_packages: true,
            ..Policy::default()
        };
        let m = Manifest::builtin(&policy).unwrap();
        assert!(has(&m, SNAPD_PACKAGE, Action::Purge));
        assert!(has(&m, "unused-dependencies", Action::Autoremove));
        assert_eq!(m.cleanup.len(), SNAPD_DIRS.len());
        let stop = m
            .entries
            .iter()
            .position(|e| e.action() == Action::Stop)
            .unwrap();
        let purge = m
            .entries
            .iter()
            .position(|e| e.action() == Action::Purge)
            .unwrap();
        assert!(stop < purge, "service stops before the package goes");
    }

    #[test]
    fn kernel_cmdline_edit_matches_documented_example() {
        let line = kernel_cmdline_edit();
        assert_eq!(line.key, GRUB_CMDLINE_KEY);
        assert_eq!(
            line.transform.apply("debug quiet splash foo"),
            "debug foo usbcore.autosuspend=-1"
        );
    }
}
