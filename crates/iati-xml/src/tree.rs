//! Minimal element tree built from quick-xml events.
//!
//! The tree never leaves this crate: extractors turn it into typed model
//! elements, so raw attribute maps stop at the parser boundary.

use std::collections::BTreeSet;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ParseError, Result};

const IATI_NAMESPACE_MARKER: &str = "iatistandard.org";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trimmed attribute value; empty values count as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn attr_owned(&self, name: &str) -> Option<String> {
        self.attr(name).map(str::to_string)
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed element text; empty text counts as absent.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(XmlNode::text)
    }

    pub fn child_attr(&self, name: &str, attr: &str) -> Option<&str> {
        self.child(name).and_then(|child| child.attr(attr))
    }
}

/// Parse `xml` into its top-level elements, in document order.
///
/// Elements whose prefix is bound to an IATI namespace lose the prefix;
/// other prefixed elements keep their qualified name and are ignored by
/// the extractors.
pub(crate) fn build_tree(xml: &str) -> Result<Vec<XmlNode>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut roots: Vec<XmlNode> = Vec::new();
    let mut iati_prefixes: BTreeSet<String> = BTreeSet::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(error) => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: error.to_string(),
                });
            }
        };
        let position = reader.buffer_position() as u64;
        match event {
            Event::Start(start) => {
                let node = open_node(&start, &mut iati_prefixes, position)?;
                stack.push(node);
            }
            Event::Empty(start) => {
                let node = open_node(&start, &mut iati_prefixes, position)?;
                attach(&mut stack, &mut roots, node);
            }
            Event::End(_) => {
                let Some(mut node) = stack.pop() else {
                    return Err(ParseError::Malformed {
                        position,
                        message: "closing tag without matching opening tag".to_string(),
                    });
                };
                let trimmed = node.text.trim();
                if trimmed.len() != node.text.len() {
                    node.text = trimmed.to_string();
                }
                attach(&mut stack, &mut roots, node);
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    let raw = utf8(&text, position)?;
                    node.text.push_str(&unescape_at(raw, position)?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(utf8(&data, position)?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(node) = stack.last_mut() {
                    let name = utf8(&reference, position)?;
                    match resolve_reference(name) {
                        Some(resolved) => node.text.push_str(&resolved),
                        None => {
                            node.text.push('&');
                            node.text.push_str(name);
                            node.text.push(';');
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed {
            position: xml.len() as u64,
            message: format!("unexpected end of document, <{}> is not closed", open.name),
        });
    }
    if roots.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(roots)
}

fn open_node(
    start: &BytesStart<'_>,
    iati_prefixes: &mut BTreeSet<String>,
    position: u64,
) -> Result<XmlNode> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|error| ParseError::Malformed {
            position,
            message: error.to_string(),
        })?;
        let key = utf8(attribute.key.as_ref(), position)?.to_string();
        let raw = utf8(attribute.value.as_ref(), position)?;
        let value = unescape_at(raw, position)?;
        if let Some(prefix) = key.strip_prefix("xmlns:")
            && value.contains(IATI_NAMESPACE_MARKER)
        {
            iati_prefixes.insert(prefix.to_string());
        }
        attributes.push((key, value));
    }
    let qname = start.name();
    let full_name = utf8(qname.as_ref(), position)?;
    let name = match full_name.split_once(':') {
        Some((prefix, local)) if iati_prefixes.contains(prefix) => local.to_string(),
        _ => full_name.to_string(),
    };
    Ok(XmlNode {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlNode], roots: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 { position })
}

fn unescape_at(raw: &str, position: u64) -> Result<String> {
    unescape(raw)
        .map(|value| value.into_owned())
        .map_err(|error| ParseError::Malformed {
            position,
            message: error.to_string(),
        })
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(resolved.to_string())
}
