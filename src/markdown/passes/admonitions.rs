use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// `[!type]` marker on the first line of a blockquote.
static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[!([a-zA-Z]+)\]\s*").unwrap());

/// Warning categories the display layer knows how to style.
const KINDS: [&str; 4] = ["default", "ferromagnetic", "hazard", "neural"];

/// Turn `[!type]`-prefixed blockquotes into admonition containers.
///
/// The wrapper carries the category in a class and a data attribute;
/// the marker itself is removed from the text. Unknown categories stay
/// plain blockquotes.
pub fn mark_admonitions(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::BlockQuote(_)))
            && let Some(kind) = admonition_kind(&events, i)
        {
            out.push(Event::Html(
                format!(
                    "<blockquote class=\"admonition admonition-{kind}\" data-admonition=\"{kind}\">\n"
                )
                .into(),
            ));
            i = emit_inner(&events, i + 1, &mut out);
            out.push(Event::Html("</blockquote>\n".into()));
            continue;
        }
        out.push(events[i].clone());
        i += 1;
    }

    out
}

/// Copy the blockquote's inner events, stripping the marker from the
/// first text run. Returns the index just past the closing event.
fn emit_inner<'a>(events: &[Event<'a>], start: usize, out: &mut Vec<Event<'a>>) -> usize {
    let mut depth = 1usize;
    let mut marker_stripped = false;
    let mut i = start;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::BlockQuote(_)) => {
                depth += 1;
                out.push(events[i].clone());
            }
            Event::End(TagEnd::BlockQuote(..)) => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
                out.push(events[i].clone());
            }
            Event::Text(text) if !marker_stripped => {
                marker_stripped = true;
                let stripped = MARKER.replace(text.as_ref(), "").into_owned();
                if stripped.is_empty() {
                    // marker-only line; drop its soft break as well
                    if matches!(events.get(i + 1), Some(Event::SoftBreak)) {
                        i += 1;
                    }
                } else {
                    out.push(Event::Text(stripped.into()));
                }
            }
            other => out.push(other.clone()),
        }
        i += 1;
    }

    i
}

/// Peek into a blockquote starting at `start` for a known marker.
fn admonition_kind(events: &[Event<'_>], start: usize) -> Option<String> {
    let mut i = start + 1;
    if matches!(events.get(i), Some(Event::Start(Tag::Paragraph))) {
        i += 1;
    }
    let Some(Event::Text(text)) = events.get(i) else {
        return None;
    };
    let captures = MARKER.captures(text.as_ref())?;
    let kind = captures[1].to_lowercase();
    KINDS.contains(&kind.as_str()).then_some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    fn render(markdown: &str) -> String {
        let events: Vec<Event> = Parser::new(markdown).collect();
        let events = mark_admonitions(events);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }

    #[test]
    fn test_hazard_admonition() {
        let html = render("> [!hazard] Keep clear of the coolant loop.\n");
        assert!(html.contains("class=\"admonition admonition-hazard\""));
        assert!(html.contains("data-admonition=\"hazard\""));
        assert!(html.contains("Keep clear of the coolant loop."));
        assert!(!html.contains("[!hazard]"));
    }

    #[test]
    fn test_marker_case_insensitive() {
        let html = render("> [!NEURAL] Interface drift detected.\n");
        assert!(html.contains("admonition-neural"));
    }

    #[test]
    fn test_unknown_kind_stays_plain_blockquote() {
        let html = render("> [!sparkly] Not a thing.\n");
        assert!(!html.contains("admonition"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("[!sparkly]"));
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        let html = render("> Just a quote.\n");
        assert!(html.contains("<blockquote>"));
        assert!(!html.contains("admonition"));
    }

    #[test]
    fn test_marker_only_first_line() {
        let html = render("> [!ferromagnetic]\n> Shielding required beyond this point.\n");
        assert!(html.contains("admonition-ferromagnetic"));
        assert!(html.contains("Shielding required"));
        assert!(!html.contains("[!ferromagnetic]"));
    }

    #[test]
    fn test_nested_blockquote_preserved_inside() {
        let html = render("> [!default] Outer.\n>\n> > Inner quote.\n");
        assert!(html.contains("admonition-default"));
        assert!(html.contains("<blockquote>\n<p>Inner quote.</p>"));
    }
}
