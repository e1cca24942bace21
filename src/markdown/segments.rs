use super::types::{Segment, SegmentMetadata};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Segment boundary line: `---` optionally followed by a JSON object.
static BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---\s*(\{.*\})?\s*$").unwrap());

/// Split a chat-mode document into segments.
///
/// Each `---` line starts a new segment; a JSON object on the same line
/// becomes that segment's metadata. Text before the first boundary is
/// segment zero with empty metadata. Malformed JSON is logged and
/// treated as absent. Segments with neither text nor metadata are
/// skipped, so indices stay dense but boundaries need not all produce
/// output.
pub fn split_segments(body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut boundaries = Vec::new();

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if let Some(captures) = BOUNDARY.captures(trimmed) {
            let raw_json = captures.get(1).map(|m| m.as_str().to_string());
            boundaries.push((offset, offset + line.len(), raw_json));
        }
        offset += line.len();
    }

    let preamble_end = boundaries.first().map_or(body.len(), |&(start, _, _)| start);
    let preamble = body[..preamble_end].trim();
    if !preamble.is_empty() {
        segments.push(Segment {
            raw_markdown: preamble.to_string(),
            metadata: SegmentMetadata::default(),
            index: 0,
        });
    }

    for (i, (_, text_start, raw_json)) in boundaries.iter().enumerate() {
        let text_end = boundaries
            .get(i + 1)
            .map_or(body.len(), |&(start, _, _)| start);
        let text = body[*text_start..text_end].trim();
        let metadata = parse_boundary_metadata(raw_json.as_deref());

        if text.is_empty() && metadata.is_empty() {
            continue;
        }
        segments.push(Segment {
            raw_markdown: text.to_string(),
            metadata,
            index: segments.len(),
        });
    }

    segments
}

fn parse_boundary_metadata(raw: Option<&str>) -> SegmentMetadata {
    let Some(raw) = raw else {
        return SegmentMetadata::default();
    };
    match serde_json::from_str(raw) {
        Ok(value) => SegmentMetadata::from_json_value(value),
        Err(e) => {
            warn!("malformed segment metadata {raw:?}: {e}");
            SegmentMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::types::{SegmentKind, StoryAction};

    #[test]
    fn test_single_segment_no_boundaries() {
        let segments = split_segments("Just one block of text.");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].raw_markdown, "Just one block of text.");
        assert!(segments[0].metadata.is_empty());
        assert_eq!(segments[0].index, 0);
    }

    #[test]
    fn test_boundaries_split_text() {
        let segments = split_segments("First.\n---\nSecond.\n---\nThird.");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].raw_markdown, "First.");
        assert_eq!(segments[1].raw_markdown, "Second.");
        assert_eq!(segments[2].raw_markdown, "Third.");
        assert_eq!(segments[2].index, 2);
    }

    #[test]
    fn test_boundary_metadata_parsed() {
        let segments =
            split_segments("Intro.\n--- {\"type\": \"dialogue\", \"delay\": 500}\nHello there.");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].metadata.kind, Some(SegmentKind::Dialogue));
        assert_eq!(segments[1].metadata.delay_ms, Some(500));
    }

    #[test]
    fn test_control_segment_without_text() {
        let segments = split_segments("Story text.\n--- {\"action\": \"end\"}\n");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].raw_markdown, "");
        assert_eq!(segments[1].metadata.action, Some(StoryAction::End));
    }

    #[test]
    fn test_empty_boundary_without_text_skipped() {
        let segments = split_segments("A.\n---\n\n---\nB.");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].raw_markdown, "A.");
        assert_eq!(segments[1].raw_markdown, "B.");
        assert_eq!(segments[1].index, 1);
    }

    #[test]
    fn test_malformed_json_treated_as_absent() {
        let segments = split_segments("A.\n--- {not json}\nB.");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].raw_markdown, "B.");
        assert!(segments[1].metadata.is_empty());
    }

    #[test]
    fn test_invalid_field_values_dropped_individually() {
        let segments =
            split_segments("A.\n--- {\"delay\": -5, \"speed\": 1.5, \"mood\": \"tense\"}\nB.");
        let metadata = &segments[1].metadata;
        assert_eq!(metadata.delay_ms, None);
        assert_eq!(metadata.speed, Some(1.5));
        assert_eq!(
            metadata.extra.get("mood"),
            Some(&serde_json::json!("tense"))
        );
    }

    #[test]
    fn test_no_preamble_starts_at_boundary() {
        let segments = split_segments("--- {\"type\": \"system\"}\nBoot sequence.\n---\nDone.");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].metadata.kind, Some(SegmentKind::System));
        assert_eq!(segments[0].raw_markdown, "Boot sequence.");
    }

    #[test]
    fn test_thematic_break_with_surrounding_dashes_not_a_boundary() {
        // four dashes is a thematic break, not a segment boundary
        let segments = split_segments("A.\n----\nB.");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_crlf_boundaries() {
        let segments = split_segments("A.\r\n---\r\nB.\r\n");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].raw_markdown, "B.");
    }
}
