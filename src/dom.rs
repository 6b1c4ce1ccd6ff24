//! A small owned element tree over `quick-xml` events.
//!
//! Transcript handling needs look-ahead (the next sibling, whether a quote
//! sits somewhere below a paragraph) and a few in-place edits to text that has
//! not been emitted yet, so the whole document is materialised first. Text is
//! stored the way lxml does it: `text` is what precedes the first child and
//! `tail` is what follows the element's end tag inside its parent.

use crate::error::AlpheusError;
use crate::text::tame_whitespace;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub type NodeId = usize;

/// Named entities that show up in House XML without a DTD to define them.
const LATIN1_ENTITIES: &[(&str, &str)] = &[
    ("&ccedil;", "&#231;"),
    ("&eacute;", "&#233;"),
    ("&egrave;", "&#232;"),
    ("&ecirc;", "&#234;"),
    ("&agrave;", "&#224;"),
    ("&acirc;", "&#226;"),
    ("&icirc;", "&#238;"),
    ("&ocirc;", "&#244;"),
    ("&ucirc;", "&#251;"),
    ("&Eacute;", "&#201;"),
    ("&nbsp;", "&#160;"),
];

/// Empty tags that would otherwise confuse speaker detection.
const DROPPED_EMPTY_TAGS: &[&str] = &["<B />", "<ParaText />"];

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    index_in_parent: usize,
    /// Set when the element's own text has already been consumed elsewhere.
    pub skip_text: bool,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn tail_str(&self) -> &str {
        self.tail.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<XmlElement>,
    root: NodeId,
}

/// Applies the textual fixes House XML needs before it is well-formed enough
/// to parse.
pub fn preprocess(xml: &str) -> String {
    let mut cleaned = xml.strip_prefix('\u{feff}').unwrap_or(xml).to_string();
    for tag in DROPPED_EMPTY_TAGS {
        cleaned = cleaned.replace(tag, "");
    }
    for (entity, numeric) in LATIN1_ENTITIES {
        cleaned = cleaned.replace(entity, numeric);
    }
    cleaned
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, AlpheusError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push((key, value));
    }
    Ok(XmlElement {
        tag,
        attrs,
        ..XmlElement::default()
    })
}

impl XmlTree {
    /// Builds the tree from already-preprocessed XML.
    pub fn parse(xml: &str) -> Result<Self, AlpheusError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut nodes: Vec<XmlElement> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let id = Self::attach(&mut nodes, &stack, &mut root, element_from_start(e)?);
                    stack.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    Self::attach(&mut nodes, &stack, &mut root, element_from_start(e)?);
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape()?;
                    Self::append_text(&mut nodes, &stack, &text);
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    Self::append_text(&mut nodes, &stack, &text);
                }
                Ok(Event::Eof) => break,
                // Comments, processing instructions and the prolog carry no content.
                Ok(_) => {}
                Err(e) => {
                    return Err(AlpheusError::Xml(format!(
                        "at position {}: {e}",
                        reader.error_position()
                    )))
                }
            }
            buf.clear();
        }

        match root {
            Some(root) => Ok(Self { nodes, root }),
            None => Err(AlpheusError::Xml("document has no root element".to_string())),
        }
    }

    fn attach(
        nodes: &mut Vec<XmlElement>,
        stack: &[NodeId],
        root: &mut Option<NodeId>,
        mut element: XmlElement,
    ) -> NodeId {
        let id = nodes.len();
        if let Some(&parent) = stack.last() {
            element.parent = Some(parent);
            element.index_in_parent = nodes[parent].children.len();
            nodes.push(element);
            nodes[parent].children.push(id);
        } else {
            nodes.push(element);
            if root.is_none() {
                *root = Some(id);
            }
        }
        id
    }

    fn append_text(nodes: &mut [XmlElement], stack: &[NodeId], text: &str) {
        let Some(&current) = stack.last() else {
            return;
        };
        let slot = match nodes[current].children.last().copied() {
            Some(last_child) => &mut nodes[last_child].tail,
            None => &mut nodes[current].text,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &XmlElement {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut XmlElement {
        &mut self.nodes[id]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id].tag
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id].attr(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        let parent = node.parent?;
        self.nodes[parent]
            .children
            .get(node.index_in_parent + 1)
            .copied()
    }

    /// First direct child with the given tag.
    pub fn child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].tag == tag)
    }

    /// Pre-order walk over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    /// Whether any element strictly below `id` has the given tag.
    pub fn has_descendant(&self, id: NodeId, tag: &str) -> bool {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .any(|node| self.nodes[node].tag == tag)
    }

    /// First element with the given tag in document order.
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&node| self.nodes[node].tag == tag)
    }

    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&node| self.nodes[node].tag == tag)
            .collect()
    }

    /// Element text plus everything nested in it, whitespace-tamed. The
    /// element's own tail is not included.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, false, &mut raw);
        tame_whitespace(&raw)
    }

    fn collect_text(&self, id: NodeId, with_tail: bool, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(node.text_str());
        for &child in &node.children {
            self.collect_text(child, true, out);
        }
        if with_tail {
            out.push_str(node.tail_str());
        }
    }

    /// The next non-blank character after the element without leaving its
    /// parent: from its tail, or else from the start of the next sibling.
    pub fn following_char(&self, id: NodeId) -> Option<char> {
        if let Some(c) = self.nodes[id].tail_str().trim().chars().next() {
            return Some(c);
        }
        let next = self.next_sibling(id)?;
        self.nodes[next].text_str().trim().chars().next()
    }
}
