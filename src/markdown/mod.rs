//! Markdown rendering pipeline: parse, rewrite, serialize, sanitize.

pub mod core;
pub mod error;
pub mod excerpt;
pub mod passes;
pub mod sanitize;
pub mod segments;
pub mod types;

pub use core::MarkdownRenderer;
pub use error::RenderError;
pub use excerpt::excerpt;
pub use segments::split_segments;
pub use types::{RenderOptions, Segment, SegmentKind, SegmentMetadata, StoryAction};
