pub mod atomic;
pub mod backup;
pub mod edit;
pub mod meta;
pub mod remove;

pub use atomic::{atomic_write, fsync_parent_dir, open_dir_nofollow};
pub use backup::{backup_path, backup_stamp, create_backup, list_backups};
pub use edit::{edit_config_line, EditOutcome};
pub use meta::{kind_of, sha256_hex, sha256_hex_of};
pub use remove::{remove_dir_if_present, RemoveOutcome};
