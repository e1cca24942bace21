use regex::Regex;
use std::sync::LazyLock;

/// Explicit excerpt break marker, with or without inner spaces.
static MORE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!--\s*more\s*-->").unwrap());

const ELLIPSIS: &str = "...";

/// Derive a short markdown preview from a document body.
///
/// An explicit `<!--more-->` marker wins: the excerpt is everything
/// before it. Otherwise the first paragraph is returned whole if its
/// plain-text length fits `max_length`, or truncated at the last word
/// boundary that still fits, with an ellipsis appended. Markup
/// characters do not count against the budget.
///
/// The markup-aware accounting is a best-effort heuristic. Never
/// fails; the worst case is an empty string.
pub fn excerpt(body: &str, max_length: usize) -> String {
    if let Some(found) = MORE_MARKER.find(body) {
        return body[..found.start()].trim().to_string();
    }

    let paragraph = first_paragraph(body.trim_start());
    if paragraph.is_empty() {
        return String::new();
    }
    if plain_length(paragraph) <= max_length {
        return paragraph.trim().to_string();
    }

    truncate_at_word_boundary(paragraph, max_length)
}

/// Text up to the first blank line.
fn first_paragraph(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            return text[..offset].trim_end();
        }
        offset += line.len();
    }
    text.trim_end()
}

/// Visible length of markdown text: markup characters and link URLs
/// are excluded from the count.
fn plain_length(text: &str) -> usize {
    let mut count = 0;
    let mut in_url = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_url {
            if c == ')' {
                in_url = false;
            }
            continue;
        }
        match c {
            '[' | '*' | '_' | '`' => {}
            ']' => {
                if chars.peek() == Some(&'(') {
                    chars.next();
                    in_url = true;
                }
            }
            _ => count += 1,
        }
    }

    count
}

/// Cut at the last word boundary whose visible prefix fits the budget
/// (reserving room for the ellipsis), avoiding cuts inside link or
/// code spans so that fully consumed markup survives intact.
fn truncate_at_word_boundary(text: &str, max_length: usize) -> String {
    let budget = max_length.saturating_sub(ELLIPSIS.len());
    let mut plain = 0;
    let mut cut = 0;
    let mut in_url = false;
    let mut bracket_depth = 0i32;
    let mut in_code = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_url {
            if c == ')' {
                in_url = false;
            }
            continue;
        }
        match c {
            '[' => bracket_depth += 1,
            ']' => {
                bracket_depth -= 1;
                if chars.peek().map(|&(_, next)| next) == Some('(') {
                    chars.next();
                    in_url = true;
                }
            }
            '`' => in_code = !in_code,
            '*' | '_' => {}
            _ => {
                if c.is_whitespace() && bracket_depth <= 0 && !in_code {
                    if plain <= budget {
                        cut = i;
                    } else {
                        break;
                    }
                }
                plain += 1;
                if plain > budget && cut > 0 {
                    break;
                }
            }
        }
    }

    if cut == 0 {
        // One unbroken word longer than the budget: hard-cut it.
        let mut taken = String::new();
        let mut count = 0;
        for c in text.chars() {
            if count >= budget {
                break;
            }
            if !matches!(c, '[' | ']' | '*' | '_' | '`') {
                count += 1;
            }
            taken.push(c);
        }
        taken.push_str(ELLIPSIS);
        return taken;
    }

    let mut result = text[..cut].trim_end().to_string();
    result.push_str(ELLIPSIS);
    result
}
