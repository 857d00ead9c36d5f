//! Lookups over the styles part

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;

/// Ids of every w:style, in document order
pub fn style_ids(root: &RawXmlElement) -> Result<Vec<String>> {
    root.children_named("style")
        .map(|style| {
            style
                .w_attr("styleId")
                .map(str::to_string)
                .ok_or_else(|| Error::Format("w:style without w:styleId".into()))
        })
        .collect()
}

/// The w:style with the given id
pub fn find_style<'a>(root: &'a RawXmlElement, style_id: &str) -> Option<&'a RawXmlElement> {
    root.children_named("style")
        .find(|s| s.w_attr("styleId") == Some(style_id))
}
