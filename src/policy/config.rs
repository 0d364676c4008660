use std::path::PathBuf;

use crate::constants::{
    DEFAULT_GRUB_FILE, ENV_GRUB_FILE, ENV_PURGE_SNAPD, ENV_SKIP_GRUB, ENV_SKIP_UPDATE_GRUB,
};

/// Policy governs which optional steps a run performs.
///
/// Both historical variants of the tool (with and without the bootloader
/// edit) are expressed by `edit_bootloader`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    /// Fully purge snapd (stop, disable, purge, autoremove, delete data dirs)
    /// instead of only disabling its units.
    pub purge_packages: bool,
    /// Rewrite the kernel command line in the bootloader configuration.
    pub edit_bootloader: bool,
    /// Run `update-grub` after the bootloader configuration was rewritten.
    pub regenerate_bootloader: bool,
    pub bootloader_config: PathBuf,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            purge_packages: false,
            edit_bootloader: true,
            regenerate_bootloader: true,
            bootloader_config: PathBuf::from(DEFAULT_GRUB_FILE),
        }
    }
}

fn truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Policy {
    /// Build a policy from the process environment.
    ///
    /// # Example
    /// ```rust
    /// use bootfix::policy::Policy;
    ///
    /// let policy = Policy::from_env();
    /// assert!(policy.bootloader_config.is_absolute());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build a policy from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |k: &str| lookup(k).is_some_and(|v| truthy(&v));
        Self {
            purge_packages: flag(ENV_PURGE_SNAPD),
            edit_bootloader: !flag(ENV_SKIP_GRUB),
            regenerate_bootloader: !flag(ENV_SKIP_UPDATE_GRUB),
            bootloader_config: lookup(ENV_GRUB_FILE)
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_GRUB_FILE), PathBuf::from),
        }
    }
}
