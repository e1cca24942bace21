use super::error::RenderError;
use super::passes::{
    LinkRewriteContext, assign_heading_ids, mark_admonitions, rewrite_internal_links,
    rewrite_mermaid_blocks,
};
use super::sanitize::sanitize_fragment;
use super::types::RenderOptions;
use crate::content::cache::ContentCache;
use pulldown_cmark::{Event, Options, Parser, html};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::error;

/// `{#id}` annotation that survived into the rendered HTML because
/// inline markup kept the heading pass from claiming it.
static STRAY_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?\{#([a-zA-Z0-9_-]+)\}").unwrap());

/// Prefix some upstream renderers put on user-supplied heading ids.
static PREFIXED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="user-content-"#).unwrap());

/// Markdown to sanitized HTML, with caching.
///
/// Rendering itself never fails the caller: an internal error becomes a
/// visible placeholder fragment, logged and cached like any other
/// result so a broken document does not re-render on every request.
pub struct MarkdownRenderer {
    options: RenderOptions,
    cache: Arc<ContentCache>,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions, cache: Arc<ContentCache>) -> Self {
        Self { options, cache }
    }

    /// Render a markdown body to HTML.
    ///
    /// `path_hint` identifies the source file; it keys the cache
    /// together with the content and anchors relative link targets.
    pub fn render(&self, body: &str, path_hint: Option<&Path>) -> String {
        let hint = path_hint.map(|p| p.to_string_lossy().into_owned());
        let key = ContentCache::content_key(body, hint.as_deref().unwrap_or(""));
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let rendered = match self.render_checked(body, path_hint) {
            Ok(html) => html,
            Err(e) => {
                error!("markdown render failed for {hint:?}: {e}");
                error_fragment(&e)
            }
        };
        self.cache.insert(key, rendered.clone());
        rendered
    }

    /// The fallible pipeline behind [`MarkdownRenderer::render`].
    ///
    /// Batch validation goes through here to surface errors instead of
    /// error fragments. Results are not cached.
    pub fn render_checked(
        &self,
        body: &str,
        path_hint: Option<&Path>,
    ) -> Result<String, RenderError> {
        let mut parser_options = Options::empty();
        parser_options.insert(Options::ENABLE_TABLES);
        parser_options.insert(Options::ENABLE_STRIKETHROUGH);
        parser_options.insert(Options::ENABLE_FOOTNOTES);
        parser_options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let events: Vec<Event> = Parser::new_ext(body, parser_options).collect();

        let events = rewrite_mermaid_blocks(events);
        let events = assign_heading_ids(events);
        let base_dir = path_hint
            .and_then(|p| p.parent())
            .or(self.options.content_root.as_deref());
        let link_ctx = LinkRewriteContext {
            base_dir,
            check_file_links: self.options.check_file_links,
        };
        let events = rewrite_internal_links(events, &link_ctx);
        let events = mark_admonitions(events);

        let mut raw_html = String::new();
        html::push_html(&mut raw_html, events.into_iter());

        let sanitized = sanitize_fragment(&raw_html)?;
        Ok(final_cleanup(&sanitized))
    }
}

/// Post-serialization touch-ups on the sanitized HTML.
fn final_cleanup(html: &str) -> String {
    let html = STRAY_ANNOTATION.replace_all(html, "<a id=\"$1\"></a>");
    PREFIXED_ID.replace_all(&html, "id=\"").into_owned()
}

fn error_fragment(e: &RenderError) -> String {
    let message = e
        .to_string()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<div class=\"render-error\">Failed to render content: {message}</div>")
}
