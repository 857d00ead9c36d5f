//! Raw XML node types: the owned tree every cached part is parsed into

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::xml::local_name;

/// Raw XML node
#[derive(Clone, Debug, PartialEq)]
pub enum RawXmlNode {
    /// Element node
    Element(RawXmlElement),
    /// Text node (unescaped)
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment node
    Comment(String),
}

/// Raw XML element with attributes and children
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawXmlElement {
    /// Full element name (with prefix, e.g., "w:customXml")
    pub name: String,
    /// Attributes as (name, value) pairs, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<RawXmlNode>,
}

impl RawXmlElement {
    /// Create a new empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Read a complete element from XML reader (starting after the start tag was read)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut element = Self::from_empty(start)?;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e)?;
                    element.children.push(RawXmlNode::Element(child));
                }
                Event::Empty(e) => {
                    let child = Self::from_empty(&e)?;
                    element.children.push(RawXmlNode::Element(child));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.to_string();
                    if !text.is_empty() {
                        element.children.push(RawXmlNode::Text(text));
                    }
                }
                Event::CData(c) => {
                    element
                        .children
                        .push(RawXmlNode::CData(String::from_utf8_lossy(&c).to_string()));
                }
                Event::Comment(c) => {
                    element
                        .children
                        .push(RawXmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::End(e) => {
                    if e.name().as_ref() == element.name.as_bytes() {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument(format!(
                        "unexpected EOF inside <{}>",
                        element.name
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        // Indentation between child elements is not content.
        if element.elements().next().is_some() {
            element.children.retain(|child| match child {
                RawXmlNode::Text(t) => !t.trim().is_empty(),
                _ => true,
            });
        }

        Ok(element)
    }

    /// Create from an empty (or start) tag, without children
    pub fn from_empty(e: &BytesStart) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                attr.unescape_value()?.to_string(),
            ));
        }

        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attributes,
            children: Vec::new(),
        })
    }

    /// Write element to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }

        Ok(())
    }

    /// Serialize this element (without XML declaration)
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        self.write_to(&mut writer)?;
        String::from_utf8(buffer).map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Local part of the element name (`p` for `w:p`)
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Check the local name
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Get an attribute by its qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a WordprocessingML attribute (`w:<local>`, or unprefixed `<local>`)
    pub fn w_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.strip_prefix("w:") == Some(local) || k == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute by qualified name
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &RawXmlElement> {
        self.children.iter().filter_map(|c| match c {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over child elements mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut RawXmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&RawXmlElement> {
        self.elements().find(|e| e.is(local))
    }

    /// First child element with the given local name, mutably
    pub fn child_mut(&mut self, local: &str) -> Option<&mut RawXmlElement> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Child elements with the given local name
    pub fn children_named<'a>(
        &'a self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a RawXmlElement> + 'a {
        self.elements().filter(move |e| e.is(local))
    }

    /// Visit this element and all descendants in document order
    pub fn visit<F: FnMut(&RawXmlElement)>(&self, f: &mut F) {
        f(self);
        for child in self.elements() {
            child.visit(f);
        }
    }

    /// Visit this element and all descendants mutably in document order
    pub fn visit_mut<F: FnMut(&mut RawXmlElement)>(&mut self, f: &mut F) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Append a child element
    pub fn push(&mut self, child: RawXmlElement) {
        self.children.push(RawXmlNode::Element(child));
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: RawXmlElement) -> Self {
        self.children.push(RawXmlNode::Element(child));
        self
    }
}

fn collect_text(element: &RawXmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            RawXmlNode::Element(e) => collect_text(e, out),
            RawXmlNode::Text(t) | RawXmlNode::CData(t) => out.push_str(t),
            RawXmlNode::Comment(_) => {}
        }
    }
}

impl RawXmlNode {
    /// Write node to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RawXmlNode::Element(e) => e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            RawXmlNode::CData(t) => {
                writer.write_event(Event::CData(BytesCData::new(t.as_str())))?;
                Ok(())
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
                Ok(())
            }
        }
    }

    /// The element, if this node is one
    pub fn as_element(&self) -> Option<&RawXmlElement> {
        match self {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}
