use serde::Deserialize;
use serde_yaml::Value;

/// Per-directory configuration inherited by every document beneath it.
///
/// `defaults` is a partial metadata mapping merged under file-level
/// frontmatter; the remaining fields drive navigation and ordering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub defaults: Option<Value>,
    pub nav: Vec<String>,
    pub hide: Vec<String>,
    pub order: Option<i64>,
    pub title: Option<String>,
}

/// The wildcard entry in `nav` meaning "all remaining, default order".
pub const NAV_WILDCARD: &str = "...";

impl FolderConfig {
    /// Order `available` slugs according to `nav`.
    ///
    /// Entries listed in `nav` come first in that order; a `...`
    /// wildcard expands to every unlisted entry in its current order.
    /// Without a wildcard, unlisted entries are appended at the end.
    /// Unknown nav entries are skipped.
    pub fn order_slugs(&self, available: &[String]) -> Vec<String> {
        if self.nav.is_empty() {
            return available.to_vec();
        }

        let mut ordered = Vec::with_capacity(available.len());
        let mut wildcard_at = None;

        for entry in &self.nav {
            if entry == NAV_WILDCARD {
                wildcard_at = Some(ordered.len());
            } else if available.iter().any(|s| s == entry) {
                ordered.push(entry.clone());
            }
        }

        let remaining: Vec<String> = available
            .iter()
            .filter(|s| !ordered.contains(s))
            .cloned()
            .collect();

        match wildcard_at {
            Some(index) => {
                let tail = ordered.split_off(index);
                ordered.extend(remaining);
                ordered.extend(tail);
            }
            None => ordered.extend(remaining),
        }

        ordered
    }
}
