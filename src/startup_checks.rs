use crate::Config;
use crate::pages::{FOLDER_CONFIG_FILE, FolderConfig};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Content source directory does not exist: {0}")]
    SourceDirectoryMissing(String),

    #[error("Content source directory is not accessible: {0}")]
    SourceDirectoryUnreadable(String),

    #[error("Root folder config is invalid: {0}")]
    RootFolderConfigInvalid(String),
}

impl StartupCheckError {
    /// Whether a build can proceed at all with this failure present.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::SourceDirectoryMissing(_)
                | StartupCheckError::SourceDirectoryUnreadable(_)
        )
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let source_dir = &config.content.source_directory;
    if !source_dir.exists() {
        error!("Content source directory does not exist: {:?}", source_dir);
        errors.push(StartupCheckError::SourceDirectoryMissing(
            source_dir.display().to_string(),
        ));
    } else {
        match tokio::fs::read_dir(source_dir).await {
            Ok(_) => info!("Content source directory is accessible: {:?}", source_dir),
            Err(e) => {
                error!("Content source directory is not accessible: {}", e);
                errors.push(StartupCheckError::SourceDirectoryUnreadable(format!(
                    "{:?}: {}",
                    source_dir, e
                )));
            }
        }
    }

    // The root folder config seeds defaults for every document, so a
    // broken one is flagged here before the per-directory resolver
    // silently treats it as absent.
    let root_config = source_dir.join(FOLDER_CONFIG_FILE);
    if root_config.exists() {
        match tokio::fs::read_to_string(&root_config).await {
            Ok(raw) => match serde_yaml::from_str::<FolderConfig>(&raw) {
                Ok(_) => info!("Root folder config is valid: {:?}", root_config),
                Err(e) => {
                    warn!("Root folder config is invalid: {}", e);
                    errors.push(StartupCheckError::RootFolderConfigInvalid(e.to_string()));
                }
            },
            Err(e) => {
                warn!("Root folder config is unreadable: {}", e);
                errors.push(StartupCheckError::RootFolderConfigInvalid(e.to_string()));
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
