//! Tree-transform passes over the markdown event stream.
//!
//! Each pass takes the full event sequence and returns a rewritten
//! one. They are independent and composed in a fixed order by the
//! renderer; later passes see the output shape of earlier ones.

pub mod admonitions;
pub mod headings;
pub mod links;
pub mod mermaid;

pub use admonitions::mark_admonitions;
pub use headings::assign_heading_ids;
pub use links::{LinkRewriteContext, rewrite_internal_links};
pub use mermaid::rewrite_mermaid_blocks;
