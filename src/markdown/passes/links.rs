use pulldown_cmark::{Event, Tag};
use std::path::Path;
use tracing::warn;

/// Context for the internal-link pass.
#[derive(Debug, Default)]
pub struct LinkRewriteContext<'a> {
    /// Directory relative link targets resolve against, when known.
    pub base_dir: Option<&'a Path>,
    /// Warn about relative markdown links whose target file is
    /// missing. Requires `base_dir`; only ever a warning.
    pub check_file_links: bool,
}

/// Rewrite relative links to markdown sources onto their routes.
///
/// `[x](./doc.md)` becomes `[x](./doc)`; fragments survive. Absolute
/// URLs, root-relative paths, and in-page anchors pass through
/// untouched.
pub fn rewrite_internal_links<'a>(
    events: Vec<Event<'a>>,
    ctx: &LinkRewriteContext<'_>,
) -> Vec<Event<'a>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match rewrite_target(&dest_url, ctx) {
                    Some(rewritten) => rewritten.into(),
                    None => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            other => other,
        })
        .collect()
}

fn rewrite_target(dest: &str, ctx: &LinkRewriteContext<'_>) -> Option<String> {
    if dest.is_empty() || dest.starts_with('/') || dest.starts_with('#') || has_scheme(dest) {
        return None;
    }

    let (path_part, fragment) = match dest.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (dest, None),
    };

    let stem = path_part
        .strip_suffix(".md")
        .or_else(|| path_part.strip_suffix(".mdx"))?;

    if ctx.check_file_links
        && let Some(base) = ctx.base_dir
    {
        let target = base.join(path_part);
        if !target.exists() {
            warn!("internal link target does not exist: {:?}", target);
        }
    }

    Some(match fragment {
        Some(fragment) => format!("{stem}#{fragment}"),
        None => stem.to_string(),
    })
}

fn has_scheme(dest: &str) -> bool {
    // scheme ":" before any path separator marks an absolute URL
    match dest.split_once(':') {
        Some((scheme, _)) => !scheme.contains('/'),
        None => false,
    }
}
