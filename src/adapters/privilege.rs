/// Answers whether the current process may change host configuration.
pub trait PrivilegeOracle {
    fn is_privileged(&self) -> bool;

    /// Why the answer was no; shown in the refusal message.
    fn denial(&self) -> String;
}

/// Production oracle: the effective uid must be root.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectiveUid;

impl PrivilegeOracle for EffectiveUid {
    fn is_privileged(&self) -> bool {
        rustix::process::geteuid().is_root()
    }

    fn denial(&self) -> String {
        format!("effective uid {}", rustix::process::geteuid().as_raw())
    }
}

/// Fixed answer, for dry environments and tests.
#[derive(Clone, Copy, Debug)]
pub struct StaticPrivilege(pub bool);

impl PrivilegeOracle for StaticPrivilege {
    fn is_privileged(&self) -> bool {
        self.0
    }

    fn denial(&self) -> String {
        "privilege withheld by configuration".to_string()
    }
}
