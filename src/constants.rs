//! Shared crate-wide constants for bootfix.
//!
//! Centralizes magic values and default labels used across modules.

/// Default bootloader configuration file read by `update-grub`.
pub const DEFAULT_GRUB_FILE: &str = "/etc/default/grub";

/// Kernel command-line variable rewritten in the bootloader configuration.
pub const GRUB_CMDLINE_KEY: &str = "GRUB_CMDLINE_LINUX_DEFAULT";

/// Boot splash tokens stripped from the kernel command line.
pub const CMDLINE_STRIP: &[&str] = &["quiet", "splash"];

/// Tokens appended to the kernel command line when absent.
pub const CMDLINE_APPEND: &[&str] = &["usbcore.autosuspend=-1"];

/// Infix between the original path and the timestamp of a config backup:
/// `/etc/default/grub.bak.20260101120000`.
pub const BACKUP_INFIX: &str = ".bak.";

/// Temporary filename suffix used while staging an atomic rewrite.
/// The temporary name is constructed as `.{fname}.{pid}.{ctr}{TMP_SUFFIX}`.
pub const TMP_SUFFIX: &str = ".bootfix.tmp";

/// UUIDv5 namespace tag for deterministic manifest/step IDs.
pub const NS_TAG: &str = "https://bootfix.invalid/reconciler";

/// Package purged when `BOOTFIX_PURGE_SNAPD` is set.
pub const SNAPD_PACKAGE: &str = "snapd";

/// Data directories left behind by snapd; deleted best-effort after a purge.
pub const SNAPD_DIRS: &[&str] = &["/snap", "/var/snap", "/var/lib/snapd", "/var/cache/snapd"];

/// Units that hold up `network-online.target` or the end of the boot splash.
pub const MASKED_UNITS: &[&str] = &[
    "systemd-networkd-wait-online.service",
    "NetworkManager-wait-online.service",
    "plymouth-quit-wait.service",
];

/// Units disabled (and stopped) because the hardware class never uses them.
pub const DISABLED_UNITS: &[&str] = &["ModemManager.service", "bluetooth.service"];

/// Timers enabled in place of boot-time work.
pub const ENABLED_TIMERS: &[&str] = &["fstrim.timer"];

/// Environment toggles read by [`crate::policy::Policy::from_env`].
pub const ENV_PURGE_SNAPD: &str = "BOOTFIX_PURGE_SNAPD";
pub const ENV_SKIP_GRUB: &str = "BOOTFIX_SKIP_GRUB";
pub const ENV_GRUB_FILE: &str = "BOOTFIX_GRUB_FILE";
pub const ENV_SKIP_UPDATE_GRUB: &str = "BOOTFIX_SKIP_UPDATE_GRUB";

/// Default `env_logger` filter for the binary; `RUST_LOG` overrides it.
pub const DEFAULT_LOG_FILTER: &str = "info";
