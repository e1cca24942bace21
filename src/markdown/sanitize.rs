//! Allow-list sanitization of rendered HTML.
//!
//! The rendered fragment is parsed into a DOM, disallowed elements are
//! unwrapped (their children survive), disallowed attributes dropped,
//! and the tree re-serialized. The allow-list deliberately admits
//! `script` and `iframe` plus the `data-` attributes the mermaid and
//! admonition passes emit: downstream embeds depend on exactly this
//! relaxation, so it must not be tightened.

use super::error::RenderError;
use ego_tree::NodeId;
use html5ever::QualName;
use html5ever::serialize::{
    AttrRef, HtmlSerializer, Serialize, SerializeOpts, Serializer, TraversalScope,
};
use scraper::{Html, Node};
use std::io;

/// Sanitize a rendered HTML fragment against the allow-list.
pub fn sanitize_fragment(html: &str) -> Result<String, RenderError> {
    let mut doc = Html::parse_fragment(html);

    let node_ids: Vec<NodeId> = doc
        .root_element()
        .descendants()
        .skip(1) // the synthetic root element itself
        .map(|node| node.id())
        .collect();

    for id in node_ids {
        let Some(node) = doc.tree.get(id) else {
            continue;
        };
        match node.value() {
            Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {
                if let Some(mut node) = doc.tree.get_mut(id) {
                    node.detach();
                }
            }
            Node::Element(element) => {
                if allowed_tag(element.name()) {
                    filter_attributes(&mut doc, id);
                } else {
                    unwrap_element(&mut doc, id);
                }
            }
            _ => {}
        }
    }

    serialize_stable(&doc)
}

/// Drop an element but keep its children in place.
fn unwrap_element(doc: &mut Html, id: NodeId) {
    let child_ids: Vec<NodeId> = match doc.tree.get(id) {
        Some(node) => node.children().map(|child| child.id()).collect(),
        None => return,
    };
    if let Some(mut node) = doc.tree.get_mut(id) {
        for child in child_ids {
            node.insert_id_before(child);
        }
        node.detach();
    }
}

fn filter_attributes(doc: &mut Html, id: NodeId) {
    let Some(mut node) = doc.tree.get_mut(id) else {
        return;
    };
    if let Node::Element(element) = node.value() {
        let tag = element.name.local.as_ref().to_string();
        element
            .attrs
            .retain(|(name, value)| allowed_attribute(&tag, name.local.as_ref(), value));
    }
}

fn allowed_tag(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "audio"
            | "b"
            | "blockquote"
            | "br"
            | "caption"
            | "code"
            | "col"
            | "colgroup"
            | "dd"
            | "del"
            | "details"
            | "div"
            | "dl"
            | "dt"
            | "em"
            | "figcaption"
            | "figure"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "i"
            | "iframe"
            | "img"
            | "input"
            | "ins"
            | "kbd"
            | "li"
            | "mark"
            | "ol"
            | "p"
            | "pre"
            | "q"
            | "rp"
            | "rt"
            | "ruby"
            | "s"
            | "samp"
            | "script"
            | "section"
            | "small"
            | "source"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "summary"
            | "sup"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "u"
            | "ul"
            | "video"
    )
}

fn allowed_attribute(tag: &str, attr: &str, value: &str) -> bool {
    if attr.starts_with("data-") || attr.starts_with("aria-") {
        return true;
    }
    if is_url_attribute(attr) && has_javascript_scheme(value) {
        return false;
    }
    if matches!(attr, "id" | "class" | "title" | "lang" | "dir") {
        return true;
    }
    matches!(
        (tag, attr),
        ("a", "href" | "target" | "rel" | "name")
            | ("img", "src" | "alt" | "width" | "height" | "loading")
            | (
                "iframe",
                "src"
                    | "width"
                    | "height"
                    | "frameborder"
                    | "allow"
                    | "allowfullscreen"
                    | "sandbox"
                    | "loading"
            )
            | ("script", "src" | "type" | "async" | "defer" | "crossorigin")
            | ("input", "type" | "checked" | "disabled")
            | ("td" | "th", "align" | "colspan" | "rowspan")
            | ("col" | "colgroup", "span")
            | (
                "video",
                "src" | "controls" | "width" | "height" | "autoplay" | "loop" | "muted" | "poster"
            )
            | ("audio", "src" | "controls" | "loop" | "muted")
            | ("source", "src" | "type")
            | ("del" | "ins", "cite" | "datetime")
            | ("blockquote" | "q", "cite")
            | ("details", "open")
            | ("ol", "start" | "reversed" | "type")
            | ("li", "value")
    )
}

fn is_url_attribute(attr: &str) -> bool {
    matches!(attr, "href" | "src" | "cite" | "poster")
}

fn has_javascript_scheme(value: &str) -> bool {
    value
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("javascript:")
}

/// A serializer that sorts element attributes by name.
///
/// Attributes serialize in whatever order the parser stored them, so
/// fragments differing only in source attribute order would render
/// differently. Sorting by name pins one canonical output.
struct StableHtmlSerializer<S: Serializer>(S);

impl<S: Serializer> Serializer for StableHtmlSerializer<S> {
    fn start_elem<'a, AttrIter>(&mut self, name: QualName, attrs: AttrIter) -> io::Result<()>
    where
        AttrIter: Iterator<Item = AttrRef<'a>>,
    {
        let mut sorted = attrs.collect::<Vec<_>>();
        sorted.sort_by(|(a, _), (b, _)| a.local.cmp(&b.local));
        self.0.start_elem(name, sorted.into_iter())
    }

    fn end_elem(&mut self, name: QualName) -> io::Result<()> {
        self.0.end_elem(name)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.0.write_text(text)
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        self.0.write_comment(text)
    }

    fn write_doctype(&mut self, name: &str) -> io::Result<()> {
        self.0.write_doctype(name)
    }

    fn write_processing_instruction(&mut self, target: &str, data: &str) -> io::Result<()> {
        self.0.write_processing_instruction(target, data)
    }
}

fn serialize_stable(doc: &Html) -> Result<String, RenderError> {
    let opts = SerializeOpts {
        scripting_enabled: false,
        traversal_scope: TraversalScope::ChildrenOnly(None),
        create_missing_parent: false,
    };

    let mut buf = Vec::new();
    let mut serializer = StableHtmlSerializer(HtmlSerializer::new(&mut buf, opts));
    doc.root_element()
        .serialize(&mut serializer, TraversalScope::ChildrenOnly(None))?;

    Ok(String::from_utf8(buf)?)
}
