pub mod config_line;
pub mod entry;
pub mod errors;
pub mod ids;
pub mod report;

pub use config_line::*;
pub use entry::*;
pub use errors::*;
pub use ids::*;
pub use report::*;
