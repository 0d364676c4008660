pub mod control;
pub mod host;
pub mod privilege;

pub use control::*;
pub use host::{HostCommand, SystemCommandControl};
pub use privilege::*;
