//! Document collection: scanning, metadata folding, rendering, lookup.

pub mod cache;
pub mod core;
pub mod error;
pub mod types;

pub use cache::ContentCache;
pub use core::ContentManager;
pub use error::ContentError;
pub use types::{
    ContentConfig, ContentIssue, Post, PostSummary, RenderedContent, RenderedSegment,
};

#[cfg(test)]
mod tests;
