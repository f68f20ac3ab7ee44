//! Minimal element tree over `quick-xml` events.
//!
//! SPL documents are small enough to hold in memory, and the lookups the
//! parser needs ("a `code` child of some `section`", "all `ingredient`
//! elements with a class code") read far better against a tree than against
//! a raw event stream. Names are stored without namespace prefixes.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ExcipientError, Result};

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Attribute value by local name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Descendant elements with the given name, in document order.
    pub fn descendants_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
        self.descendants().filter(move |e| e.name == name)
    }

    /// First descendant named `parent` that has a direct child named `child`;
    /// returns that child. Equivalent to the XPath `.//parent/child`.
    pub fn find_child_of(&self, parent: &str, child: &str) -> Option<&Element> {
        self.descendants()
            .filter(|e| e.name == parent)
            .find_map(|p| p.child(child))
    }

    /// All text in this element and its descendants, concatenated.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Text with whitespace runs collapsed to single spaces and ends trimmed.
    pub fn collapsed_text(&self) -> String {
        self.text().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let before = self.stack.len();
        self.stack.extend(next.elements());
        self.stack[before..].reverse();
        Some(next)
    }
}

/// Parse an XML document into its root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ExcipientError::MalformedSpl("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    // Unknown entities (HTML-style `&nbsp;` and friends) are
                    // kept verbatim rather than failing the whole label.
                    let value = match text.unescape() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    parent.children.push(Node::Text(value));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(value));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ExcipientError::MalformedSpl(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }

    root.ok_or_else(|| ExcipientError::MalformedSpl("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ExcipientError::MalformedSpl(
                "multiple root elements".to_string(),
            ));
        }
    }
    Ok(())
}
