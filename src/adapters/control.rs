use thiserror::Error;

use crate::types::Action;

/// Result of a successful host operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The host accepted and performed the operation.
    Applied,
    /// The host reports the desired state was already in place.
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The unit or package does not exist on this host.
    #[error("{0} not found")]
    NotFound(String),
    /// The control program itself is missing or could not be spawned.
    #[error("{program} unavailable: {reason}")]
    Unavailable { program: String, reason: String },
    /// The control program ran and reported failure.
    #[error("exit {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

/// Capability over the host's control plane (service manager, package
/// manager, bootloader tooling). Production code shells out; tests
/// substitute a double.
pub trait HostControl {
    /// Apply `action` to `target`.
    ///
    /// # Errors
    ///
    /// Returns a `ControlError` when the host rejects the operation, the
    /// target is unknown, or the control program is unavailable.
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError>;
}

impl<T: HostControl + ?Sized> HostControl for &T {
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError> {
        (**self).apply(action, target)
    }
}

impl<T: HostControl + ?Sized> HostControl for Box<T> {
    fn apply(&self, action: Action, target: &str) -> Result<Outcome, ControlError> {
        (**self).apply(action, target)
    }
}
