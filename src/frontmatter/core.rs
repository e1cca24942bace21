use super::error::FrontmatterError;
use regex::Regex;
use serde_yaml::Value;
use std::sync::LazyLock;
use tracing::warn;

/// Explicit excerpt break marker, with or without inner spaces.
static BREAK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*more\s*-->").unwrap());

/// A raw document split into its frontmatter mapping and body text.
///
/// The metadata here is the untyped YAML value so that folder defaults
/// can be merged in before the typed [`super::Metadata`] decode.
/// `excerpt_hint` is the byte offset of the `<!--more-->` break marker
/// within `body`, when the author placed one.
#[derive(Debug, Clone)]
pub struct ParsedDocument<'a> {
    pub metadata: Value,
    pub body: &'a str,
    pub excerpt_hint: Option<usize>,
}

/// Split a raw file into frontmatter and body.
///
/// The frontmatter block is delimited by a line consisting solely of
/// `---` at the very start of the file and a matching closing line.
/// A document without the block (or with an unclosed block) is
/// recoverable: it yields empty metadata and the full text as body.
/// A present block with malformed YAML is fatal for the document.
pub fn parse(raw: &str) -> Result<ParsedDocument<'_>, FrontmatterError> {
    let Some(after_open) = strip_delimiter_line(raw) else {
        if !raw.trim().is_empty() {
            warn!("document has no frontmatter block");
        }
        return Ok(ParsedDocument {
            metadata: Value::Null,
            body: raw,
            excerpt_hint: break_marker_offset(raw),
        });
    };

    let Some((yaml, body)) = split_at_closing_delimiter(after_open) else {
        warn!("frontmatter opened but never closed, treating whole file as body");
        return Ok(ParsedDocument {
            metadata: Value::Null,
            body: raw,
            excerpt_hint: break_marker_offset(raw),
        });
    };

    let metadata = if yaml.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok(ParsedDocument {
        metadata,
        body,
        excerpt_hint: break_marker_offset(body),
    })
}

/// Byte offset of the first excerpt break marker, if any.
fn break_marker_offset(body: &str) -> Option<usize> {
    BREAK_MARKER.find(body).map(|m| m.start())
}

/// If `text` starts with a `---` line, return the remainder after it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n')
}

/// Find the closing `---` line, returning (yaml, body-after-it).
fn split_at_closing_delimiter(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let body = &text[offset + line.len()..];
            return Some((&text[..offset], body));
        }
        offset += line.len();
    }
    None
}
