//! Custom document properties (docProps/custom.xml)

use crate::error::Result;
use crate::opc::{rel_types, Package, PartUri};
use crate::xml::{parse_id, RawXmlElement};
use std::collections::BTreeSet;

/// Smallest pid a custom property may carry
const FIRST_PID: i64 = 2;

/// The custom properties part named by the package relationships
pub(super) fn custom_properties_part(package: &Package) -> Option<PartUri> {
    let rel = package.relationships().by_type(rel_types::CUSTOM_PROPERTIES)?;
    PartUri::resolve_from_root(&rel.target)
        .ok()
        .filter(|uri| package.contains(uri))
}

/// Append the foreign properties whose name the host lacks, numbered after
/// the host's largest pid. Returns how many were added.
pub(super) fn merge(host: &mut RawXmlElement, foreign: &RawXmlElement) -> Result<usize> {
    let mut names = BTreeSet::new();
    let mut next_pid = FIRST_PID;
    for property in host.children_named("property") {
        if let Some(name) = property.attr("name") {
            names.insert(name.to_string());
        }
        if let Some(pid) = parse_id(property, "pid")? {
            next_pid = next_pid.max(pid + 1);
        }
    }

    let mut added = 0;
    for property in foreign.children_named("property") {
        let Some(name) = property.attr("name") else {
            continue;
        };
        if !names.insert(name.to_string()) {
            continue;
        }
        let mut copy = property.clone();
        copy.set_attr("pid", next_pid.to_string());
        host.push(copy);
        next_pid += 1;
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;
    use pretty_assertions::assert_eq;

    const FMTID: &str = "{D5CDD505-2E9C-101B-9397-08002B2CF9AE}";

    fn properties(entries: &[(&str, u32, &str)]) -> RawXmlElement {
        let body: String = entries
            .iter()
            .map(|(name, pid, value)| {
                format!(
                    r#"<property fmtid="{}" pid="{}" name="{}"><vt:lpwstr>{}</vt:lpwstr></property>"#,
                    FMTID, pid, name, value
                )
            })
            .collect();
        XmlTree::from_xml(&format!("<Properties>{}</Properties>", body))
            .unwrap()
            .root
    }

    #[test]
    fn test_missing_properties_are_appended() {
        let mut host = properties(&[("Client", 2, "Acme"), ("Matter", 3, "42")]);
        let foreign = properties(&[("Client", 2, "Other"), ("Reviewer", 2, "Kim")]);

        assert_eq!(merge(&mut host, &foreign).unwrap(), 1);

        let added: Vec<_> = host.children_named("property").collect();
        assert_eq!(added.len(), 3);
        assert_eq!(added[0].text(), "Acme");
        assert_eq!(added[2].attr("name"), Some("Reviewer"));
        assert_eq!(added[2].attr("pid"), Some("4"));
    }

    #[test]
    fn test_empty_host_numbers_from_two() {
        let mut host = properties(&[]);
        merge(&mut host, &properties(&[("A", 7, "x")])).unwrap();
        assert_eq!(host.children_named("property").next().unwrap().attr("pid"), Some("2"));
    }
}
