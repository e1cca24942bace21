use super::error::FrontmatterError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// A list field that accepts either a native YAML sequence or a single
/// comma-separated string, normalized to a sequence of trimmed strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommaList(pub Vec<String>);

/// Same as [`CommaList`] but splits single strings on newlines, for
/// prose-style list fields (bullets, key points).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ListRepr {
    Many(Vec<String>),
    One(String),
}

fn split_items(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn clean_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

impl<'de> Deserialize<'de> for CommaList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ListRepr::deserialize(deserializer)? {
            ListRepr::Many(items) => CommaList(clean_items(items)),
            ListRepr::One(raw) => CommaList(split_items(&raw, ',')),
        })
    }
}

impl<'de> Deserialize<'de> for LineList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ListRepr::deserialize(deserializer)? {
            ListRepr::Many(items) => LineList(clean_items(items)),
            ListRepr::One(raw) => LineList(split_items(&raw, '\n')),
        })
    }
}

impl Deref for CommaList {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for LineList {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<&str>> for CommaList {
    fn from(items: Vec<&str>) -> Self {
        CommaList(items.into_iter().map(String::from).collect())
    }
}

/// How a document's body is rendered: a single HTML article, or an
/// ordered sequence of chat segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Normal,
    Chat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub enabled: bool,
    pub voice: Option<String>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorInfo {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar: Option<String>,
}

/// The typed frontmatter record. Known fields are validated and
/// normalized; everything else passes through `extra` untouched so new
/// fields can be introduced without a schema change here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    /// ISO-ish date string. Kept as text and compared lexically.
    pub date: Option<String>,
    pub description: Option<String>,
    pub tags: CommaList,
    pub categories: CommaList,
    pub draft: bool,
    #[serde(alias = "cover")]
    pub cover_image: Option<String>,
    #[serde(alias = "mode")]
    pub render_mode: RenderMode,
    pub hide: CommaList,
    pub features: CommaList,
    pub bullets: LineList,
    pub key_points: LineList,
    pub tts: Option<TtsConfig>,
    pub author: Option<AuthorInfo>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Decode a (possibly merged) YAML mapping into the typed record.
    pub fn from_value(value: serde_yaml::Value) -> Result<Metadata, FrontmatterError> {
        if value.is_null() {
            return Ok(Metadata::default());
        }
        serde_yaml::from_value(value).map_err(FrontmatterError::InvalidYaml)
    }

    /// A document needs a title to appear in any collection.
    pub fn is_publishable(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}
