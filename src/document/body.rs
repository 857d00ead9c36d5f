//! Document body and block-level content

use crate::document::Paragraph;
use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, RawXmlNode};

/// The w:body of a w:document root
pub fn body(root: &RawXmlElement) -> Result<&RawXmlElement> {
    root.child("body")
        .ok_or_else(|| Error::InvalidDocument("missing w:body element".into()))
}

/// The w:body of a w:document root, mutably
pub fn body_mut(root: &mut RawXmlElement) -> Result<&mut RawXmlElement> {
    root.child_mut("body")
        .ok_or_else(|| Error::InvalidDocument("missing w:body element".into()))
}

/// Child indices of the body's top-level paragraphs
pub fn paragraph_slots(body: &RawXmlElement) -> Vec<usize> {
    body.children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, RawXmlNode::Element(e) if e.name == "w:p"))
        .map(|(i, _)| i)
        .collect()
}

/// Index at which appended block content goes: before a trailing w:sectPr
pub fn append_index(body: &RawXmlElement) -> usize {
    match body.children.iter().rposition(|c| c.as_element().is_some()) {
        Some(i) if body.children[i].as_element().is_some_and(|e| e.name == "w:sectPr") => i,
        _ => body.children.len(),
    }
}

/// Top-level paragraphs of the body
pub fn paragraphs(body: &RawXmlElement) -> Result<Vec<Paragraph>> {
    body.elements()
        .filter(|e| e.name == "w:p")
        .map(Paragraph::from_element)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;

    const SIMPLE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r>
        <w:t>Hello, World!</w:t>
      </w:r>
    </w:p>
    <w:tbl/>
    <w:p>
      <w:pPr>
        <w:pStyle w:val="Heading1"/>
      </w:pPr>
      <w:r>
        <w:rPr>
          <w:b/>
        </w:rPr>
        <w:t>This is a heading</w:t>
      </w:r>
    </w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_simple_document() {
        let tree = XmlTree::from_xml(SIMPLE_DOC).unwrap();
        let body = body(&tree.root).unwrap();

        let paras = paragraphs(body).unwrap();
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].text(), "Hello, World!");
        assert_eq!(paras[1].text(), "This is a heading");
        assert_eq!(paras[1].style(), Some("Heading1"));
        assert!(paras[1].runs()[0].bold());

        assert_eq!(paragraph_slots(body), vec![0, 2]);
        assert_eq!(append_index(body), 3);
    }

    #[test]
    fn test_append_without_section() {
        let tree = XmlTree::from_xml("<w:document><w:body><w:p/></w:body></w:document>").unwrap();
        assert_eq!(append_index(body(&tree.root).unwrap()), 1);
    }

    #[test]
    fn test_missing_body() {
        let tree = XmlTree::from_xml("<w:document/>").unwrap();
        assert!(matches!(body(&tree.root), Err(Error::InvalidDocument(_))));
    }
}
