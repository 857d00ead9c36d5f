//! Style definitions: reuse identical ones, rename the rest

use super::numbering;
use crate::document::styles::style_ids;
use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, RawXmlNode};
use std::collections::{BTreeMap, BTreeSet};

/// Elements referring to a style from content
pub(super) const REFERENCE_ELEMENTS: &[&str] = &["w:pStyle", "w:rStyle", "w:tblStyle"];
/// Elements linking one style to another
const LINK_ELEMENTS: &[&str] = &["w:basedOn", "w:next", "w:link"];
/// Elements referring to a style from numbering definitions
pub(super) const NUMBERING_ELEMENTS: &[&str] = &["w:pStyle", "w:styleLink", "w:numStyleLink"];

/// Merge the foreign w:style definitions into the host styles root.
///
/// A foreign style identical to a host style (ignoring its id and
/// whitespace) maps onto that style. Any other is appended under a fresh
/// id, so no foreign id is carried into the host. Appended
/// styles have their numbering references moved through `num_map`.
/// Returns foreign id -> host id.
pub(super) fn merge(
    host: &mut RawXmlElement,
    foreign: &RawXmlElement,
    num_map: &BTreeMap<u32, u32>,
) -> Result<BTreeMap<String, String>> {
    let taken: BTreeSet<String> = style_ids(host)?.into_iter().collect();
    let mut fresh_ids = BTreeSet::new();
    let host_forms = host
        .children_named("style")
        .map(|s| Ok((s.w_attr("styleId").unwrap_or_default().to_string(), normalized(s)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut map = BTreeMap::new();
    let mut added = Vec::new();

    for style in foreign.children_named("style") {
        let id = style
            .w_attr("styleId")
            .ok_or_else(|| Error::Format("w:style without w:styleId".into()))?;
        let form = normalized(style)?;

        if let Some((host_id, _)) = host_forms.iter().find(|(_, f)| *f == form) {
            log::debug!("style {} reuses host style {}", id, host_id);
            map.insert(id.to_string(), host_id.clone());
            continue;
        }

        let new_id = loop {
            let fresh = fresh_style_id();
            if !taken.contains(&fresh) && fresh_ids.insert(fresh.clone()) {
                break fresh;
            }
        };
        log::debug!("style {} renamed {}", id, new_id);
        map.insert(id.to_string(), new_id.clone());
        added.push((style.clone(), new_id));
    }

    for (mut style, new_id) in added {
        style.set_attr("w:styleId", new_id);
        // one default per style type
        style.remove_attr("w:default");
        rewrite_references(&mut style, &map, LINK_ELEMENTS);
        numbering::rewrite_references(&mut style, num_map)?;
        host.push(style);
    }

    Ok(map)
}

/// Point style references among `elements` at their mapped ids
pub(super) fn rewrite_references(
    root: &mut RawXmlElement,
    map: &BTreeMap<String, String>,
    elements: &[&str],
) {
    if map.is_empty() {
        return;
    }
    root.visit_mut(&mut |element| {
        if !elements.contains(&element.name.as_str()) {
            return;
        }
        let mapped = element.w_attr("val").and_then(|v| map.get(v)).cloned();
        if let Some(new) = mapped {
            element.set_attr("w:val", new);
        }
    });
}

/// Comparable form of a style: no id, no whitespace
fn normalized(style: &RawXmlElement) -> Result<String> {
    let mut style = style.clone();
    style.remove_attr("w:styleId");
    strip_whitespace_text(&mut style);
    Ok(style.to_xml()?.chars().filter(|c| !c.is_whitespace()).collect())
}

fn strip_whitespace_text(element: &mut RawXmlElement) {
    element.children.retain(|c| match c {
        RawXmlNode::Text(t) => !t.trim().is_empty(),
        _ => true,
    });
    for child in element.elements_mut() {
        strip_whitespace_text(child);
    }
}

fn fresh_style_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;
    use pretty_assertions::assert_eq;

    fn root(xml: &str) -> RawXmlElement {
        XmlTree::from_xml(xml).unwrap().root
    }

    const HOST: &str = r#"<w:styles>
        <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
        <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:rPr><w:i/></w:rPr></w:style>
    </w:styles>"#;

    #[test]
    fn test_identical_styles_are_reused() {
        let mut host = root(HOST);
        let foreign = root(HOST);
        let map = merge(&mut host, &foreign, &BTreeMap::new()).unwrap();

        assert_eq!(host.children_named("style").count(), 2);
        assert_eq!(map["Normal"], "Normal");
        assert_eq!(map["Quote"], "Quote");
    }

    #[test]
    fn test_identical_content_under_other_id_maps_to_host_id() {
        let mut host = root(HOST);
        let foreign = root(
            r#"<w:styles><w:style w:type="paragraph" w:styleId="Zitat"> <w:name w:val="Quote"/> <w:rPr><w:i/></w:rPr></w:style></w:styles>"#,
        );
        let map = merge(&mut host, &foreign, &BTreeMap::new()).unwrap();
        assert_eq!(map["Zitat"], "Quote");
        assert_eq!(host.children_named("style").count(), 2);
    }

    #[test]
    fn test_colliding_style_is_renamed_and_links_follow() {
        let mut host = root(HOST);
        let foreign = root(
            r#"<w:styles>
                <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:b/></w:rPr></w:style>
                <w:style w:type="paragraph" w:styleId="Caption"><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style>
            </w:styles>"#,
        );
        let num_map = BTreeMap::from([(1, 4)]);
        let map = merge(&mut host, &foreign, &num_map).unwrap();

        let renamed = &map["Normal"];
        assert_ne!(renamed, "Normal");
        assert_ne!(map["Caption"], "Caption");
        assert_ne!(&map["Caption"], renamed);
        assert_eq!(host.children_named("style").count(), 4);

        let caption = crate::document::styles::find_style(&host, &map["Caption"]).unwrap();
        assert_eq!(caption.child("basedOn").unwrap().w_attr("val"), Some(renamed.as_str()));
        assert!(caption.to_xml().unwrap().contains(r#"<w:numId w:val="4"/>"#));

        let copy = crate::document::styles::find_style(&host, renamed).unwrap();
        assert!(copy.attr("w:default").is_none());
    }

    #[test]
    fn test_style_absent_from_host_gets_fresh_id() {
        let mut host = root(HOST);
        let foreign = root(
            r#"<w:styles><w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:next w:val="Caption"/></w:style></w:styles>"#,
        );
        let map = merge(&mut host, &foreign, &BTreeMap::new()).unwrap();

        let fresh = &map["Caption"];
        assert_ne!(fresh, "Caption");
        assert_eq!(fresh.len(), 32);
        assert!(crate::document::styles::find_style(&host, "Caption").is_none());
        let copy = crate::document::styles::find_style(&host, fresh).unwrap();
        assert_eq!(copy.child("next").unwrap().w_attr("val"), Some(fresh.as_str()));
    }

    #[test]
    fn test_rewrite_content_references() {
        let mut body = root(
            r#"<w:body><w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:rPr><w:rStyle w:val="Strong"/></w:rPr></w:r></w:p></w:body>"#,
        );
        let map = BTreeMap::from([("Normal".to_string(), "abc".to_string())]);
        rewrite_references(&mut body, &map, REFERENCE_ELEMENTS);
        let xml = body.to_xml().unwrap();
        assert!(xml.contains(r#"<w:pStyle w:val="abc"/>"#));
        assert!(xml.contains(r#"<w:rStyle w:val="Strong"/>"#));
    }
}
