use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Options threaded through the render pipeline.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Verify that relative `.md` link targets exist on disk, warning
    /// (never failing) when they do not. Only meaningful where the
    /// content tree is reachable, so it is off by default.
    pub check_file_links: bool,
    /// Directory that relative link targets resolve against when
    /// `check_file_links` is set and no per-call path hint is given.
    pub content_root: Option<PathBuf>,
}

/// One chat-rendered unit of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub raw_markdown: String,
    pub metadata: SegmentMetadata,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Narration,
    Dialogue,
    Aside,
    System,
}

impl SegmentKind {
    fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "narration" => Some(SegmentKind::Narration),
            "dialogue" => Some(SegmentKind::Dialogue),
            "aside" => Some(SegmentKind::Aside),
            "system" => Some(SegmentKind::System),
            _ => None,
        }
    }
}

/// Story-control action carried by a boundary, independent of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryAction {
    Pause,
    Stop,
    End,
}

impl StoryAction {
    fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "pause" => Some(StoryAction::Pause),
            "stop" => Some(StoryAction::Stop),
            "end" => Some(StoryAction::End),
            _ => None,
        }
    }
}

/// Validated per-segment metadata.
///
/// Decoded field by field from the boundary's JSON object: an invalid
/// value drops that field with a warning, never the whole segment, and
/// unknown fields pass through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentMetadata {
    pub delay_ms: Option<u64>,
    pub speed: Option<f64>,
    pub pause: bool,
    pub kind: Option<SegmentKind>,
    pub style: Option<String>,
    pub transition: Option<String>,
    pub action: Option<StoryAction>,
    pub sound: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl SegmentMetadata {
    pub fn is_empty(&self) -> bool {
        *self == SegmentMetadata::default()
    }

    /// Decode boundary metadata from a parsed JSON value.
    ///
    /// Anything other than an object yields empty metadata.
    pub fn from_json_value(value: Value) -> SegmentMetadata {
        let Value::Object(fields) = value else {
            if !value.is_null() {
                warn!("segment metadata is not a JSON object, ignoring");
            }
            return SegmentMetadata::default();
        };

        let mut metadata = SegmentMetadata::default();
        for (key, value) in fields {
            match key.as_str() {
                "delay" => match value.as_u64() {
                    Some(ms) => metadata.delay_ms = Some(ms),
                    None => warn!("segment delay must be a non-negative integer: {value}"),
                },
                "speed" => match value.as_f64() {
                    Some(speed) if speed > 0.0 => metadata.speed = Some(speed),
                    _ => warn!("segment speed must be a positive number: {value}"),
                },
                "pause" => match value.as_bool() {
                    Some(pause) => metadata.pause = pause,
                    None => warn!("segment pause must be a boolean: {value}"),
                },
                "type" => match value.as_str().and_then(SegmentKind::from_str) {
                    Some(kind) => metadata.kind = Some(kind),
                    None => warn!("unknown segment type: {value}"),
                },
                "style" => match value.as_str() {
                    Some(style) => metadata.style = Some(style.to_string()),
                    None => warn!("segment style must be a string: {value}"),
                },
                "transition" => match value.as_str() {
                    Some(transition) => metadata.transition = Some(transition.to_string()),
                    None => warn!("segment transition must be a string: {value}"),
                },
                "action" => match value.as_str().and_then(StoryAction::from_str) {
                    Some(action) => metadata.action = Some(action),
                    None => warn!("unknown story action: {value}"),
                },
                "sound" => match value.as_str() {
                    Some(sound) => metadata.sound = Some(sound.to_string()),
                    None => warn!("segment sound must be a string URL: {value}"),
                },
                _ => {
                    metadata.extra.insert(key, value);
                }
            }
        }
        metadata
    }
}
