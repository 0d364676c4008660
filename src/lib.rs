#![forbid(unsafe_code)]
//! bootfix: idempotent boot stabilization for a fixed class of hardware.
//!
//! A run reconciles the host against a built-in [`manifest::Manifest`]:
//! - service units are masked, disabled or enabled through the service manager;
//! - snapd is disabled, or fully purged when the policy asks for it;
//! - the kernel command line in the bootloader configuration is rewritten
//!   (splash tokens stripped, USB autosuspend pinned off) after a timestamped
//!   backup, then the bootloader configuration is regenerated.
//!
//! Every step is best-effort and idempotent: failures are recorded and the
//! run continues; re-running the tool is the retry mechanism. Only a missing
//! root privilege (or a failing step declared non-best-effort) is fatal.
//!
//! Host access goes through the [`adapters::HostControl`] capability so tests
//! can substitute a double for `systemctl`/`apt-get`.

pub mod adapters;
pub mod api;
pub mod constants;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod policy;
pub mod types;

pub use api::*;
