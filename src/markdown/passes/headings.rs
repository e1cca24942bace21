use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Trailing inline id annotation: `## Title {#custom-id}`.
static ID_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{#([a-zA-Z0-9_-]+)\}\s*$").unwrap());

/// Give every heading a stable id.
///
/// A trailing `{#id}` annotation wins and is removed from the visible
/// text; otherwise the id is slugified from the heading text. Ids are
/// de-duplicated with numeric suffixes in document order.
pub fn assign_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut used: HashSet<String> = HashSet::new();
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) = event
        else {
            out.push(event);
            continue;
        };

        // Buffer the heading's inner events and accumulate its text.
        let mut inner = Vec::new();
        let mut text = String::new();
        for e in iter.by_ref() {
            match e {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) => {
                    text.push_str(&t);
                    inner.push(Event::Text(t));
                }
                Event::Code(t) => {
                    text.push_str(&t);
                    inner.push(Event::Code(t));
                }
                other => inner.push(other),
            }
        }

        let heading_id = match id {
            Some(existing) => existing.to_string(),
            None => match ID_ANNOTATION.captures(&text) {
                Some(caps) => {
                    let custom = caps[1].to_string();
                    strip_annotation(&mut inner);
                    custom
                }
                None => {
                    let slug = slugify(&text);
                    if slug.is_empty() {
                        "section".to_string()
                    } else {
                        slug
                    }
                }
            },
        };
        let unique = uniquify(&mut used, heading_id);

        out.push(Event::Start(Tag::Heading {
            level,
            id: Some(unique.into()),
            classes,
            attrs,
        }));
        out.extend(inner);
        out.push(Event::End(TagEnd::Heading(level)));
    }

    out
}

/// Remove the annotation from the last text event of a heading.
///
/// If inline markup split the annotation across events the text is
/// left alone; the renderer's final cleanup turns the leftover into an
/// anchor instead.
fn strip_annotation(inner: &mut [Event<'_>]) {
    if let Some(pos) = inner.iter().rposition(|e| matches!(e, Event::Text(_)))
        && let Event::Text(t) = &inner[pos]
    {
        let stripped = ID_ANNOTATION.replace(t.as_ref(), "").into_owned();
        inner[pos] = Event::Text(stripped.into());
    }
}

fn uniquify(used: &mut HashSet<String>, id: String) -> String {
    if used.insert(id.clone()) {
        return id;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{id}-{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// URL-safe slug from heading text: lowercase alphanumerics joined by
/// single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}
