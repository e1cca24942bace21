use crate::frontmatter::Metadata;
use crate::markdown::SegmentMetadata;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::SystemTime};

/// A fully processed document in the collection.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub path: PathBuf,
    /// Slug split on `/`, always non-empty.
    pub path_segments: Vec<String>,
    /// Containing section slug; empty at the collection root.
    pub section: String,
    pub metadata: Metadata,
    /// The markdown body, frontmatter stripped.
    pub content: String,
    pub rendered: RenderedContent,
    pub excerpt: String,
    /// Slug of the enclosing document, when one exists (`a/b` is the
    /// parent of `a/b/c`).
    pub parent: Option<String>,
    pub children: Vec<String>,
    #[serde(skip)]
    pub last_modified: Option<SystemTime>,
}

/// The rendered body, shaped by the document's render mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "body")]
pub enum RenderedContent {
    Html(String),
    Segments(Vec<RenderedSegment>),
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSegment {
    pub html: String,
    pub metadata: SegmentMetadata,
    pub index: usize,
}

/// Listing entry for index pages.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub url: String,
}

/// A problem found while validating the content tree.
#[derive(Debug, Clone, Serialize)]
pub struct ContentIssue {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub source_directory: PathBuf,
    pub url_prefix: String,
    pub posts_per_page: usize,
    pub excerpt_length: usize,
    pub include_drafts: bool,
    pub check_file_links: bool,
    pub refresh_interval_minutes: Option<u64>,
    pub render_cache_ttl_minutes: u64,
    pub folder_config_ttl_minutes: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("content"),
            url_prefix: String::from("/posts"),
            posts_per_page: 20,
            excerpt_length: 200,
            include_drafts: false,
            check_file_links: false,
            refresh_interval_minutes: None,
            render_cache_ttl_minutes: 60,
            folder_config_ttl_minutes: 5,
        }
    }
}
