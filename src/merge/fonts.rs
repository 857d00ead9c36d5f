//! Font table declarations

use crate::xml::RawXmlElement;
use std::collections::BTreeSet;

/// Foreign w:font declarations whose w:name the host does not declare
pub(super) fn missing_fonts(host: &RawXmlElement, foreign: &RawXmlElement) -> Vec<RawXmlElement> {
    let mut declared: BTreeSet<&str> = host
        .children_named("font")
        .filter_map(|f| f.w_attr("name"))
        .collect();

    foreign
        .children_named("font")
        .filter(|f| f.w_attr("name").is_some_and(|name| declared.insert(name)))
        .cloned()
        .collect()
}
