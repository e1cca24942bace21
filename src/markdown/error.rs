use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTML serialization error: {0}")]
    SerializeError(#[from] std::io::Error),

    #[error("sanitizer produced non-UTF-8 output: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
