use super::types::FolderConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default name of the per-directory configuration file.
pub const FOLDER_CONFIG_FILE: &str = "pages.yaml";

/// Collects layered folder configuration along a file's ancestry.
///
/// Reads are cached per directory (missing files included) for a
/// configurable TTL so collection builds do not re-read and re-parse
/// the same handful of files for every document. Entries are immutable
/// for their TTL lifetime; `flush` invalidates everything at once.
pub struct FolderConfigResolver {
    content_root: PathBuf,
    file_name: String,
    ttl: Duration,
    cache: RwLock<HashMap<PathBuf, CachedConfig>>,
}

#[derive(Clone)]
struct CachedConfig {
    loaded_at: Instant,
    config: Option<FolderConfig>,
}

impl FolderConfigResolver {
    pub fn new(content_root: PathBuf, ttl: Duration) -> Self {
        Self {
            content_root,
            file_name: FOLDER_CONFIG_FILE.to_string(),
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Collect folder configs for `file_path`, most-specific first.
    ///
    /// Walks from the file's containing directory up to and including
    /// the content root; never past it. Directories without a config
    /// file contribute nothing.
    pub fn collect(&self, file_path: &Path) -> Vec<FolderConfig> {
        let mut configs = Vec::new();
        let mut dir = match file_path.parent() {
            Some(parent) => parent,
            None => return configs,
        };

        loop {
            if let Some(config) = self.load_dir(dir) {
                configs.push(config);
            }
            if dir == self.content_root {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }

        configs
    }

    /// Config for a single directory, cached like any `collect` read.
    pub fn dir_config(&self, dir: &Path) -> Option<FolderConfig> {
        self.load_dir(dir)
    }

    /// Drop every cached entry. The next `collect` re-reads from disk.
    pub fn flush(&self) {
        let mut cache = self.cache.write().unwrap();
        cache.clear();
        debug!("folder config cache flushed");
    }

    fn load_dir(&self, dir: &Path) -> Option<FolderConfig> {
        {
            let cache = self.cache.read().unwrap();
            if let Some(entry) = cache.get(dir)
                && entry.loaded_at.elapsed() < self.ttl
            {
                return entry.config.clone();
            }
        }

        let config = self.read_config_file(dir);

        let mut cache = self.cache.write().unwrap();
        cache.insert(
            dir.to_path_buf(),
            CachedConfig {
                loaded_at: Instant::now(),
                config: config.clone(),
            },
        );
        config
    }

    /// Read and parse the directory's config file, if any.
    ///
    /// A parse failure is a warning, not an error: a folder config is
    /// shared by every document beneath it, and one bad file must not
    /// take down the whole subtree.
    fn read_config_file(&self, dir: &Path) -> Option<FolderConfig> {
        let path = dir.join(&self.file_name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read folder config {:?}: {}", path, e);
                return None;
            }
        };

        match serde_yaml::from_str::<FolderConfig>(&raw) {
            Ok(config) => {
                debug!("loaded folder config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                warn!("invalid folder config {:?}, ignoring: {}", path, e);
                None
            }
        }
    }
}
