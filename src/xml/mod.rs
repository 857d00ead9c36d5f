//! XML utilities: the raw node tree cached parts are parsed into

mod namespace;
mod raw;
mod tree;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};
pub use tree::XmlTree;

/// Local part of a qualified name (`val` for `w:val`)
pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

/// Get the w:val attribute (common in OOXML)
pub fn get_w_val(element: &RawXmlElement) -> Option<&str> {
    element.w_attr("val")
}

/// Parse a boolean toggle from OOXML (handles "1", "true", "on", or missing val)
pub fn parse_bool(element: &RawXmlElement) -> bool {
    match get_w_val(element) {
        None => true, // No val attribute means true (e.g., <w:b/>)
        Some(v) => matches!(v, "1" | "true" | "on"),
    }
}

/// Parse a numeric attribute, reporting a format error on junk
pub fn parse_id(element: &RawXmlElement, attr: &str) -> crate::Result<Option<i64>> {
    match element.attr(attr).or_else(|| element.w_attr(local_name(attr))) {
        None => Ok(None),
        Some(v) => v.trim().parse().map(Some).map_err(|_| {
            crate::Error::Format(format!(
                "attribute {} on <{}> is not numeric: '{}'",
                attr, element.name, v
            ))
        }),
    }
}
