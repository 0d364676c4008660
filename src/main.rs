use std::io::Write;
use std::process::ExitCode;

use bootfix::adapters::SystemCommandControl;
use bootfix::constants::DEFAULT_LOG_FILTER;
use bootfix::logging::{LogAudit, LogFacts};
use bootfix::manifest::Manifest;
use bootfix::policy::Policy;
use bootfix::{summarize, ApiError, Reconciler};
use clap::Parser;
use env_logger::Env;

/// Stabilize and speed up boot: mask wait-online units, disable snapd,
/// turn off USB autosuspend on the kernel command line.
///
/// Configuration comes from the environment only:
/// BOOTFIX_PURGE_SNAPD=1 purges snapd and its data directories,
/// BOOTFIX_SKIP_GRUB=1 leaves the bootloader configuration alone,
/// BOOTFIX_GRUB_FILE overrides /etc/default/grub,
/// BOOTFIX_SKIP_UPDATE_GRUB=1 skips update-grub after an edit.
#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {}

fn init_logging() {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    builder.format(|buf, record| {
        writeln!(buf, "[{:<5}] {}", record.level(), record.args())
    });
    builder.init();
}

fn run(policy: Policy) -> Result<Vec<String>, ApiError> {
    let manifest = Manifest::builtin(&policy)?;
    let reconciler = Reconciler::new(SystemCommandControl, LogFacts, LogAudit, policy);
    let report = reconciler.run(&manifest)?;
    Ok(summarize(&report.records))
}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    init_logging();

    match run(Policy::from_env()) {
        Ok(lines) => {
            let mut out = std::io::stdout().lock();
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
