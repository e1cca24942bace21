use serde::{Deserialize, Serialize};

pub mod content;
pub mod frontmatter;
pub mod markdown;
pub mod pages;
pub mod startup_checks;

use content::ContentConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Monogatari".to_string(),
            log_level: "info".to_string(),
        }
    }
}
