pub mod core;
pub mod error;
pub mod merge;
pub mod types;

pub use core::{ParsedDocument, parse};
pub use error::FrontmatterError;
pub use merge::{fold_metadata, merge_values};
pub use types::{AuthorInfo, CommaList, LineList, Metadata, RenderMode, TtsConfig};
