//! A parsed XML part: declaration plus a single root element

use quick_xml::events::{BytesDecl, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;

/// Parsed XML part
#[derive(Clone, Debug, PartialEq)]
pub struct XmlTree {
    /// Document element
    pub root: RawXmlElement,
}

impl XmlTree {
    /// Wrap an existing root element
    pub fn new(root: RawXmlElement) -> Self {
        Self { root }
    }

    /// Parse a part's bytes (UTF-8, optional BOM)
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let xml = std::str::from_utf8(bytes)?;
        Self::from_xml(xml)
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let root = RawXmlElement::from_reader(&mut reader, &e)?;
                    return Ok(Self { root });
                }
                Event::Empty(e) => {
                    let root = RawXmlElement::from_empty(&e)?;
                    return Ok(Self { root });
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument("no root element".into()));
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// Serialize with a standalone UTF-8 declaration
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new(&mut buffer);

        writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;
        self.root.write_to(&mut writer)?;

        Ok(buffer.into_inner())
    }

    /// Serialize to a string
    pub fn to_xml(&self) -> Result<String> {
        String::from_utf8(self.to_bytes()?).map_err(|e| Error::InvalidDocument(e.to_string()))
    }
}
