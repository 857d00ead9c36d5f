//! Built-in XML templates for parts a document may lack

use crate::document::numbering::ListKind;
use crate::error::Result;
use crate::xml::{RawXmlElement, XmlTree};

const BLANK_DOCUMENT: &str = include_str!("templates/document.xml");
const DEFAULT_STYLES: &str = include_str!("templates/styles.xml");
const BLANK_NUMBERING: &str = include_str!("templates/numbering.xml");
const DEFAULT_SETTINGS: &str = include_str!("templates/settings.xml");
const BULLET_LIST: &str = include_str!("templates/bullet_list.xml");
const DECIMAL_LIST: &str = include_str!("templates/decimal_list.xml");

const REVISION_SEED_TOKEN: &str = "{{REVISION_SEED}}";

/// A w:document with an empty body and a US Letter section
pub fn blank_document_template() -> Result<XmlTree> {
    XmlTree::from_xml(BLANK_DOCUMENT)
}

/// A w:styles part with Normal, heading, list and hyperlink styles
pub fn default_styles_template() -> Result<XmlTree> {
    XmlTree::from_xml(DEFAULT_STYLES)
}

/// An empty w:numbering part
pub fn blank_numbering_template() -> Result<XmlTree> {
    XmlTree::from_xml(BLANK_NUMBERING)
}

/// A nine-level w:abstractNum for the given list kind, with abstractNumId 0.
///
/// The template's own namespace declaration is dropped so the element can be
/// appended to an existing numbering part.
pub fn default_numbering_template(kind: ListKind) -> Result<RawXmlElement> {
    let xml = match kind {
        ListKind::Bulleted => BULLET_LIST,
        ListKind::Decimal => DECIMAL_LIST,
    };
    let mut root = XmlTree::from_xml(xml)?.root;
    root.remove_attr("xmlns:w");
    Ok(root)
}

/// A w:settings part whose rsid root is `revision_seed` (eight hex digits)
pub fn default_settings_template(revision_seed: &str) -> Result<XmlTree> {
    XmlTree::from_xml(&DEFAULT_SETTINGS.replace(REVISION_SEED_TOKEN, revision_seed))
}

/// A fresh revision seed derived from a random UUID
pub fn revision_seed() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
