//! Body splicing and the per-object ids carried with it

use super::MergePosition;
use crate::document::body::{append_index, body_mut};
use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use std::collections::BTreeMap;

const IGNORABLE: &str = "mc:Ignorable";

/// Copy root attributes (namespace declarations mostly) the host root lacks.
///
/// `mc:Ignorable` lists are unioned rather than skipped. Returns how many
/// attributes were added or extended.
pub(super) fn copy_root_attributes(
    host: &mut RawXmlElement,
    attributes: &[(String, String)],
) -> usize {
    let mut copied = 0;
    for (key, value) in attributes {
        match host.attr(key) {
            None => {
                host.set_attr(key, value.clone());
                copied += 1;
            }
            Some(existing) if key == IGNORABLE => {
                let mut prefixes: Vec<&str> = existing.split_whitespace().collect();
                let before = prefixes.len();
                for prefix in value.split_whitespace() {
                    if !prefixes.contains(&prefix) {
                        prefixes.push(prefix);
                    }
                }
                if prefixes.len() > before {
                    let joined = prefixes.join(" ");
                    host.set_attr(IGNORABLE, joined);
                    copied += 1;
                }
            }
            Some(_) => {}
        }
    }
    copied
}

/// Take the block content out of a w:document root, leaving the final
/// section properties behind
pub(super) fn take_blocks(root: &mut RawXmlElement) -> Result<Vec<RawXmlElement>> {
    let body = body_mut(root)?;
    let end = append_index(body);
    Ok(body
        .children
        .drain(..end)
        .filter_map(|node| match node {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        })
        .collect())
}

/// Insert blocks into the host body
pub(super) fn splice(
    root: &mut RawXmlElement,
    blocks: Vec<RawXmlElement>,
    position: MergePosition,
) -> Result<()> {
    let body = body_mut(root)?;
    let at = match position {
        MergePosition::Append => append_index(body),
        MergePosition::Prepend => 0,
    };
    body.children
        .splice(at..at, blocks.into_iter().map(RawXmlNode::Element));
    Ok(())
}

/// Renumber `wp:docPr/@id` from `next`
pub(super) fn shift_drawing_ids(root: &mut RawXmlElement, next: &mut u32) {
    root.visit_mut(&mut |element| {
        if element.is("docPr") && element.attr("id").is_some() {
            element.set_attr("id", next.to_string());
            *next += 1;
        }
    });
}

/// Renumber bookmarks from `next`, pairing each w:bookmarkEnd with its start
/// through `renamed` (old id -> new id)
pub(super) fn shift_bookmark_ids(
    root: &mut RawXmlElement,
    next: &mut u32,
    renamed: &mut BTreeMap<String, u32>,
) {
    root.visit_mut(&mut |element| match element.name.as_str() {
        "w:bookmarkStart" => {
            if let Some(old) = element.attr("w:id").map(str::to_string) {
                element.set_attr("w:id", next.to_string());
                renamed.insert(old, *next);
                *next += 1;
            }
        }
        "w:bookmarkEnd" => {
            let new = element.attr("w:id").and_then(|old| renamed.get(old)).copied();
            if let Some(new) = new {
                element.set_attr("w:id", new.to_string());
            }
        }
        _ => {}
    });
}
