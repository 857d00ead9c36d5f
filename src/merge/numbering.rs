//! Numbering definitions: foreign ids shifted above the host's

use super::styles;
use crate::document::numbering::{insertion_index, required_id};
use crate::error::{Error, Result};
use crate::ids::{self, CounterKind};
use crate::xml::{get_w_val, RawXmlElement, RawXmlNode};
use std::collections::BTreeMap;

/// Foreign numbering definitions renumbered for a host numbering part
#[derive(Debug)]
pub(super) struct NumberingPlan {
    /// Foreign numId -> host numId
    pub num_map: BTreeMap<u32, u32>,
    abstracts: Vec<RawXmlElement>,
    nums: Vec<RawXmlElement>,
}

impl NumberingPlan {
    /// Shift every foreign abstractNumId and numId past the host's largest.
    ///
    /// Fails with [`Error::Format`] when a foreign w:num names an abstract
    /// definition the foreign part does not have.
    pub(super) fn new(host: &RawXmlElement, foreign: &RawXmlElement) -> Result<Self> {
        let abstract_shift = ids::next_id(host, CounterKind::AbstractNumbering)?
            - CounterKind::AbstractNumbering.floor();
        let num_shift =
            ids::next_id(host, CounterKind::Numbering)? - CounterKind::Numbering.floor();

        let mut abstract_map = BTreeMap::new();
        let mut abstracts = Vec::new();
        for abstract_num in foreign.children_named("abstractNum") {
            let old = required_id(abstract_num, "w:abstractNumId")?;
            let new = old + abstract_shift;
            let mut copy = abstract_num.clone();
            copy.set_attr("w:abstractNumId", new.to_string());
            abstract_map.insert(old, new);
            abstracts.push(copy);
        }

        let mut num_map = BTreeMap::new();
        let mut nums = Vec::new();
        for num in foreign.children_named("num") {
            let old = required_id(num, "w:numId")?;
            let new = old + num_shift;
            let mut copy = num.clone();
            copy.set_attr("w:numId", new.to_string());

            let reference = copy.child_mut("abstractNumId").ok_or_else(|| {
                Error::Format(format!("w:num {} has no w:abstractNumId", old))
            })?;
            let old_abstract = required_id(reference, "w:val")?;
            let new_abstract = abstract_map.get(&old_abstract).ok_or_else(|| {
                Error::Format(format!(
                    "w:num {} refers to missing abstractNumId {}",
                    old, old_abstract
                ))
            })?;
            reference.set_attr("w:val", new_abstract.to_string());

            num_map.insert(old, new);
            nums.push(copy);
        }

        log::debug!(
            "foreign numbering shifted: abstractNumId +{}, numId +{}",
            abstract_shift,
            num_shift
        );
        Ok(Self {
            num_map,
            abstracts,
            nums,
        })
    }

    /// Append the definitions to the host numbering root, abstracts after the
    /// host's abstracts and instances after its instances
    pub(super) fn apply(self, host: &mut RawXmlElement, style_map: &BTreeMap<String, String>) {
        for mut abstract_num in self.abstracts {
            styles::rewrite_references(&mut abstract_num, style_map, styles::NUMBERING_ELEMENTS);
            let at = insertion_index(host, "w:abstractNum");
            host.children.insert(at, RawXmlNode::Element(abstract_num));
        }
        for num in self.nums {
            let at = insertion_index(host, "w:num");
            host.children.insert(at, RawXmlNode::Element(num));
        }
    }
}

/// numId -> numId for every instance of a numbering part taken over as is
pub(super) fn identity_map(foreign: &RawXmlElement) -> Result<BTreeMap<u32, u32>> {
    foreign
        .children_named("num")
        .map(|num| required_id(num, "w:numId").map(|id| (id, id)))
        .collect()
}

/// Point w:numId references at their mapped ids.
///
/// numId 0 (numbering removed) is left alone; any other id missing from the
/// map is a dangling reference and fails with [`Error::Format`].
pub(super) fn rewrite_references(root: &mut RawXmlElement, map: &BTreeMap<u32, u32>) -> Result<()> {
    let mut failure = None;
    root.visit_mut(&mut |element| {
        if failure.is_some() || element.name != "w:numId" {
            return;
        }
        let Some(value) = get_w_val(element) else {
            return;
        };
        match value.trim().parse::<u32>() {
            Ok(0) => {}
            Ok(old) => match map.get(&old) {
                Some(new) => element.set_attr("w:val", new.to_string()),
                None => {
                    failure = Some(Error::Format(format!("numId {} is not defined", old)));
                }
            },
            Err(_) => {
                failure = Some(Error::Format(format!("malformed numId '{}'", value)));
            }
        }
    });
    failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::numbering::Numbering;
    use crate::xml::XmlTree;
    use pretty_assertions::assert_eq;

    fn root(xml: &str) -> RawXmlElement {
        XmlTree::from_xml(xml).unwrap().root
    }

    const HOST: &str = r#"<w:numbering>
        <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl></w:abstractNum>
        <w:abstractNum w:abstractNumId="1"><w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl></w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
        <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
    </w:numbering>"#;

    const FOREIGN: &str = r#"<w:numbering>
        <w:abstractNum w:abstractNumId="0"><w:styleLink w:val="MyList"/><w:lvl w:ilvl="0"><w:numFmt w:val="upperRoman"/></w:lvl></w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
    </w:numbering>"#;

    #[test]
    fn test_foreign_abstract_lands_after_host_ids() {
        let mut host = root(HOST);
        let plan = NumberingPlan::new(&host, &root(FOREIGN)).unwrap();
        assert_eq!(plan.num_map, BTreeMap::from([(1, 3)]));

        let style_map = BTreeMap::from([("MyList".to_string(), "f00d".to_string())]);
        plan.apply(&mut host, &style_map);

        let names: Vec<&str> = host.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["w:abstractNum", "w:abstractNum", "w:abstractNum", "w:num", "w:num", "w:num"]
        );

        let numbering = Numbering::from_element(&host).unwrap();
        assert_eq!(numbering.nums[&3].abstract_num_id, 2);
        assert_eq!(numbering.abstract_nums[&2].style_link.as_deref(), Some("f00d"));
        assert_eq!(numbering.get_format(1, 0).unwrap().as_str(), "bullet");
        assert_eq!(numbering.get_format(3, 0).unwrap().as_str(), "upperRoman");
    }

    #[test]
    fn test_dangling_abstract_reference() {
        let foreign = root(r#"<w:numbering><w:num w:numId="1"><w:abstractNumId w:val="4"/></w:num></w:numbering>"#);
        assert!(matches!(
            NumberingPlan::new(&root(HOST), &foreign),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_rewrite_references() {
        let mut body = root(
            r#"<w:body><w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr></w:p><w:p><w:pPr><w:numPr><w:numId w:val="0"/></w:numPr></w:pPr></w:p></w:body>"#,
        );
        rewrite_references(&mut body, &BTreeMap::from([(1, 3)])).unwrap();
        let xml = body.to_xml().unwrap();
        assert!(xml.contains(r#"<w:numId w:val="3"/>"#));
        assert!(xml.contains(r#"<w:numId w:val="0"/>"#));

        assert!(matches!(
            rewrite_references(&mut body, &BTreeMap::new()),
            Err(Error::Format(_))
        ));
    }
}
