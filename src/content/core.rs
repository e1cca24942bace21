use super::cache::ContentCache;
use super::error::ContentError;
use super::types::*;
use crate::frontmatter::{self, RenderMode, fold_metadata};
use crate::markdown::{MarkdownRenderer, RenderOptions, split_segments};
use crate::pages::FolderConfigResolver;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Loads, renders and indexes the markdown collection.
///
/// Documents live under a single source directory; the slug is the
/// extension-less path relative to it. Folder-level defaults are merged
/// under each document's frontmatter before rendering. Loading is
/// tolerant: a document that fails to load is logged and dropped, never
/// fatal for the collection.
pub struct ContentManager {
    config: ContentConfig,
    renderer: MarkdownRenderer,
    resolver: FolderConfigResolver,
    render_cache: Arc<ContentCache>,
    posts: Arc<RwLock<HashMap<String, Post>>>,
    sorted_slugs: Arc<RwLock<Vec<String>>>,
}

impl ContentManager {
    pub fn new(mut config: ContentConfig) -> Self {
        if config.posts_per_page == 0 {
            warn!("posts_per_page of 0 is not usable, clamping to 1");
            config.posts_per_page = 1;
        }

        let render_cache = Arc::new(ContentCache::new(Duration::from_secs(
            config.render_cache_ttl_minutes * 60,
        )));
        let resolver = FolderConfigResolver::new(
            config.source_directory.clone(),
            Duration::from_secs(config.folder_config_ttl_minutes * 60),
        );
        let renderer = MarkdownRenderer::new(
            RenderOptions {
                check_file_links: config.check_file_links,
                content_root: Some(config.source_directory.clone()),
            },
            Arc::clone(&render_cache),
        );

        Self {
            config,
            renderer,
            resolver,
            render_cache,
            posts: Arc::new(RwLock::new(HashMap::new())),
            sorted_slugs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Rebuild the collection from the source directory.
    pub async fn refresh(&self) -> Result<(), ContentError> {
        info!(
            "Refreshing content from directory: {:?}",
            self.config.source_directory
        );

        let mut new_posts = HashMap::new();
        self.scan_directory(&self.config.source_directory, &mut new_posts)
            .await?;
        self.link_relations(&mut new_posts);

        let mut sorted_slugs: Vec<String> = new_posts.keys().cloned().collect();
        sorted_slugs.sort_by(|a, b| {
            let post_a = &new_posts[a];
            let post_b = &new_posts[b];
            post_b
                .metadata
                .date
                .cmp(&post_a.metadata.date)
                .then_with(|| a.cmp(b))
        });

        info!("Found {} documents", new_posts.len());

        let mut posts = self.posts.write().await;
        let mut slugs = self.sorted_slugs.write().await;
        *posts = new_posts;
        *slugs = sorted_slugs;

        Ok(())
    }

    pub fn start_background_refresh(manager: Arc<ContentManager>, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_minutes * 60));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                info!("Starting scheduled content refresh");

                if let Err(e) = manager.refresh().await {
                    error!("Failed to refresh content: {}", e);
                }
            }
        });
    }

    async fn scan_directory(
        &self,
        dir: &Path,
        posts: &mut HashMap<String, Post>,
    ) -> Result<(), ContentError> {
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                Box::pin(self.scan_directory(&path, posts)).await?;
            } else if file_type.is_file()
                && let Some(extension) = path.extension()
                && (extension == "md" || extension == "mdx")
            {
                match self.load_post(&path).await {
                    Ok(post) => {
                        if !post.metadata.is_publishable() {
                            debug!("Skipping untitled document {:?}", path);
                            continue;
                        }
                        if post.metadata.draft && !self.config.include_drafts {
                            debug!("Skipping draft {:?}", path);
                            continue;
                        }
                        debug!("Loaded document: {}", post.slug);
                        posts.insert(post.slug.clone(), post);
                    }
                    Err(e) => {
                        error!("Failed to load document {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(())
    }

    async fn load_post(&self, path: &Path) -> Result<Post, ContentError> {
        let raw = tokio::fs::read_to_string(path).await?;

        let file_metadata = tokio::fs::metadata(path).await?;
        let last_modified = file_metadata.modified().ok();

        let document = frontmatter::parse(&raw)?;

        // collect() returns most-specific first; the fold applies
        // general to specific, so reverse.
        let folder_configs = self.resolver.collect(path);
        let defaults: Vec<&serde_yaml::Value> = folder_configs
            .iter()
            .rev()
            .filter_map(|config| config.defaults.as_ref())
            .collect();
        let metadata = fold_metadata(defaults, &document.metadata);

        let slug = self.generate_slug(path)?;
        let path_segments: Vec<String> = slug.split('/').map(String::from).collect();
        let section = match path_segments.split_last() {
            Some((_, parents)) => parents.join("/"),
            None => String::new(),
        };

        let rendered = match metadata.render_mode {
            RenderMode::Normal => {
                RenderedContent::Html(self.renderer.render(document.body, Some(path)))
            }
            RenderMode::Chat => {
                let segments = split_segments(document.body)
                    .into_iter()
                    .map(|segment| RenderedSegment {
                        html: self.renderer.render(&segment.raw_markdown, Some(path)),
                        metadata: segment.metadata,
                        index: segment.index,
                    })
                    .collect();
                RenderedContent::Segments(segments)
            }
        };

        let excerpt = match document.excerpt_hint {
            Some(offset) => document.body[..offset].trim().to_string(),
            None => crate::markdown::excerpt(document.body, self.config.excerpt_length),
        };

        Ok(Post {
            slug,
            path: path.to_path_buf(),
            path_segments,
            section,
            metadata,
            content: document.body.to_string(),
            rendered,
            excerpt,
            parent: None,
            children: Vec::new(),
            last_modified,
        })
    }

    /// Wire up parent/child links between nested documents.
    ///
    /// `a/b` is the parent of `a/b/c` when both exist. Children are
    /// ordered by the parent directory's nav config, with hidden
    /// entries removed.
    fn link_relations(&self, posts: &mut HashMap<String, Post>) {
        let slugs: Vec<String> = posts.keys().cloned().collect();

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for slug in &slugs {
            if let Some((parent, _)) = slug.rsplit_once('/')
                && posts.contains_key(parent)
            {
                children.entry(parent.to_string()).or_default().push(slug.clone());
            }
        }

        for (parent_slug, mut child_slugs) in children {
            child_slugs.sort();
            let ordered = self.order_children(&parent_slug, child_slugs);
            if let Some(post) = posts.get_mut(&parent_slug) {
                post.children = ordered;
            }
        }

        for post in posts.values_mut() {
            post.parent = post
                .slug
                .rsplit_once('/')
                .map(|(parent, _)| parent.to_string())
                .filter(|parent| slugs.contains(parent));
        }
    }

    fn order_children(&self, parent_slug: &str, child_slugs: Vec<String>) -> Vec<String> {
        let dir = self.config.source_directory.join(parent_slug);
        let Some(config) = self.resolver.dir_config(&dir) else {
            return child_slugs;
        };

        let names: Vec<String> = child_slugs
            .iter()
            .filter_map(|slug| slug.rsplit_once('/').map(|(_, name)| name.to_string()))
            .filter(|name| !config.hide.contains(name))
            .collect();

        config
            .order_slugs(&names)
            .into_iter()
            .map(|name| format!("{parent_slug}/{name}"))
            .collect()
    }

    fn generate_slug(&self, path: &Path) -> Result<String, ContentError> {
        let relative_path = path
            .strip_prefix(&self.config.source_directory)
            .map_err(|_| {
                ContentError::InvalidPath(format!(
                    "{:?} is not under source directory {:?}",
                    path, self.config.source_directory
                ))
            })?;

        let slug = relative_path
            .to_str()
            .ok_or_else(|| ContentError::InvalidPath(format!("non-UTF-8 path {:?}", path)))?
            .replace('\\', "/");

        let slug = slug
            .strip_suffix(".md")
            .or_else(|| slug.strip_suffix(".mdx"))
            .unwrap_or(&slug);

        Ok(slug.to_string())
    }

    pub async fn get_page(&self, page: usize) -> Vec<PostSummary> {
        let posts = self.posts.read().await;
        let slugs = self.sorted_slugs.read().await;

        let start = page * self.config.posts_per_page;
        let end = (start + self.config.posts_per_page).min(slugs.len());
        if start >= end {
            return Vec::new();
        }

        slugs[start..end]
            .iter()
            .filter_map(|slug| posts.get(slug).map(|post| self.summarize(post)))
            .collect()
    }

    fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            slug: post.slug.clone(),
            title: post.metadata.title.clone().unwrap_or_default(),
            description: post
                .metadata
                .description
                .clone()
                .unwrap_or_else(|| post.excerpt.clone()),
            date: post.metadata.date.clone(),
            tags: post.metadata.tags.to_vec(),
            url: format!("{}/{}", self.config.url_prefix, post.slug),
        }
    }

    pub async fn get_post(&self, slug: &str) -> Option<Post> {
        if let Some(post) = self.get_post_if_fresh(slug).await {
            return Some(post);
        }

        if let Err(e) = self.reload_post_by_slug(slug).await {
            debug!("Failed to reload document {}: {}", slug, e);
        }

        let posts = self.posts.read().await;
        posts.get(slug).cloned()
    }

    async fn get_post_if_fresh(&self, slug: &str) -> Option<Post> {
        let posts = self.posts.read().await;

        if let Some(post) = posts.get(slug)
            && let Ok(metadata) = tokio::fs::metadata(&post.path).await
            && let (Ok(file_modified), Some(post_modified)) =
                (metadata.modified(), post.last_modified)
            && file_modified <= post_modified
        {
            return Some(post.clone());
        }

        None
    }

    async fn reload_post_by_slug(&self, slug: &str) -> Result<(), ContentError> {
        let existing = {
            let posts = self.posts.read().await;
            posts
                .get(slug)
                .map(|p| (p.path.clone(), p.parent.clone(), p.children.clone()))
        };

        if let Some((path, parent, children)) = existing {
            let mut post = self.load_post(&path).await?;
            // relations are derived from the whole tree, keep them
            post.parent = parent;
            post.children = children;

            let mut posts = self.posts.write().await;
            posts.insert(slug.to_string(), post);
            debug!("Reloaded document: {}", slug);
        }

        Ok(())
    }

    pub async fn get_total_pages(&self) -> usize {
        let slugs = self.sorted_slugs.read().await;
        slugs.len().div_ceil(self.config.posts_per_page)
    }

    pub async fn all_posts(&self) -> Vec<Post> {
        let posts = self.posts.read().await;
        let slugs = self.sorted_slugs.read().await;
        slugs
            .iter()
            .filter_map(|slug| posts.get(slug).cloned())
            .collect()
    }

    /// Drop every derived cache; loaded documents stay until the next
    /// `refresh`.
    pub fn invalidate(&self) {
        self.render_cache.flush();
        self.resolver.flush();
    }

    pub fn get_config(&self) -> &ContentConfig {
        &self.config
    }

    /// Walk the source tree and report documents that would be dropped
    /// or mangled by a build, without mutating any state.
    pub fn validate(&self) -> Vec<ContentIssue> {
        let mut issues = Vec::new();

        for entry in WalkDir::new(&self.config.source_directory)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = path.extension() else {
                continue;
            };
            if extension != "md" && extension != "mdx" {
                continue;
            }

            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    issues.push(ContentIssue {
                        path: path.to_path_buf(),
                        message: format!("unreadable: {e}"),
                    });
                    continue;
                }
            };

            let document = match frontmatter::parse(&raw) {
                Ok(document) => document,
                Err(e) => {
                    issues.push(ContentIssue {
                        path: path.to_path_buf(),
                        message: format!("malformed frontmatter: {e}"),
                    });
                    continue;
                }
            };

            let defaults = self.resolver.collect(path);
            let layers: Vec<&serde_yaml::Value> = defaults
                .iter()
                .rev()
                .filter_map(|config| config.defaults.as_ref())
                .collect();
            let metadata = fold_metadata(layers, &document.metadata);
            if !metadata.is_publishable() {
                issues.push(ContentIssue {
                    path: path.to_path_buf(),
                    message: "missing title, document will be dropped".to_string(),
                });
            }

            match metadata.render_mode {
                RenderMode::Normal => {
                    if let Err(e) = self.renderer.render_checked(document.body, Some(path)) {
                        issues.push(ContentIssue {
                            path: path.to_path_buf(),
                            message: format!("render failed: {e}"),
                        });
                    }
                }
                RenderMode::Chat => {
                    for segment in split_segments(document.body) {
                        if let Err(e) =
                            self.renderer.render_checked(&segment.raw_markdown, Some(path))
                        {
                            issues.push(ContentIssue {
                                path: path.to_path_buf(),
                                message: format!("render failed: {e}"),
                            });
                        }
                    }
                }
            }
        }

        issues
    }
}
