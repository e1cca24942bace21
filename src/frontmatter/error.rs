use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("YAML parsing error: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}
