use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] crate::frontmatter::FrontmatterError),

    #[error("invalid document path: {0}")]
    InvalidPath(String),
}
