use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};

const MERMAID_LANG: &str = "mermaid";

/// Replace fenced `mermaid` code blocks with a placeholder container.
///
/// The diagram source travels percent-encoded in a data attribute so a
/// client-side renderer can pick it up later; nothing here attempts to
/// draw the diagram.
pub fn rewrite_mermaid_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut diagram: Option<String> = None;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref lang)))
                if diagram.is_none() && lang.as_ref() == MERMAID_LANG =>
            {
                diagram = Some(String::new());
            }
            Event::Text(text) if diagram.is_some() => {
                if let Some(source) = diagram.as_mut() {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if diagram.is_some() => {
                if let Some(source) = diagram.take() {
                    out.push(Event::Html(placeholder(&source).into()));
                }
            }
            other => out.push(other),
        }
    }

    out
}

fn placeholder(source: &str) -> String {
    let encoded = urlencoding::encode(source.trim_end());
    format!("<div class=\"mermaid-diagram\" data-diagram=\"{encoded}\"></div>\n")
}
