pub mod core;
pub mod types;

pub use core::{FOLDER_CONFIG_FILE, FolderConfigResolver};
pub use types::{FolderConfig, NAV_WILDCARD};
