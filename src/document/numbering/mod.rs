//! Numbering definitions (numbering.xml)
//!
//! A read model over the cached numbering part. Edits go through the raw
//! tree; this view is rebuilt whenever it is asked for.

mod abstract_num;
mod level;
mod num;
mod types;

pub use abstract_num::AbstractNum;
pub use level::{Level, LevelOverride};
pub use num::Num;
pub(crate) use num::required_id;
pub use types::{ListKind, NumberFormat};

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;
use std::collections::BTreeMap;

/// Schema order of the numbering part's children
const CHILD_ORDER: [&str; 4] = ["w:numPicBullet", "w:abstractNum", "w:num", "w:numIdMacAtCleanup"];

/// Numbering definitions from numbering.xml
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Numbering {
    /// Abstract numbering definitions
    pub abstract_nums: BTreeMap<u32, AbstractNum>,
    /// Numbering instances
    pub nums: BTreeMap<u32, Num>,
}

impl Numbering {
    /// Create a new empty numbering definitions
    pub fn new() -> Self {
        Numbering::default()
    }

    /// Read the w:numbering root
    pub fn from_element(root: &RawXmlElement) -> Result<Self> {
        let mut numbering = Numbering::default();

        for child in root.elements() {
            match child.name.as_str() {
                "w:abstractNum" => {
                    let abs_num = AbstractNum::from_element(child)?;
                    numbering.abstract_nums.insert(abs_num.abstract_num_id, abs_num);
                }
                "w:num" => {
                    let num = Num::from_element(child)?;
                    numbering.nums.insert(num.num_id, num);
                }
                _ => {}
            }
        }

        Ok(numbering)
    }

    /// Get the level definition for a specific numId and level
    pub fn get_level(&self, num_id: u32, level: u8) -> Option<&Level> {
        self.resolve(num_id, level).ok()
    }

    /// Get the format for a specific numId and level
    pub fn get_format(&self, num_id: u32, level: u8) -> Option<&NumberFormat> {
        self.get_level(num_id, level)?.num_fmt.as_ref()
    }

    /// Check if a numId represents a bullet list
    pub fn is_bullet_list(&self, num_id: u32) -> bool {
        self.get_level(num_id, 0).is_some_and(Level::is_bullet)
    }

    /// Resolve `(numId, level)` to its level definition.
    ///
    /// Level overrides on the instance win; an abstract definition deferring
    /// to a numbering style is followed to the definition carrying that style.
    /// Anything dangling is a format error.
    pub fn resolve(&self, num_id: u32, level: u8) -> Result<&Level> {
        let num = self
            .nums
            .get(&num_id)
            .ok_or_else(|| Error::Format(format!("numId {} is not defined", num_id)))?;

        if let Some(lvl) = num.level_override(level).and_then(|o| o.lvl.as_ref()) {
            return Ok(lvl);
        }

        let mut abs_num = self.abstract_nums.get(&num.abstract_num_id).ok_or_else(|| {
            Error::Format(format!(
                "numId {} refers to missing abstractNumId {}",
                num_id, num.abstract_num_id
            ))
        })?;

        if let Some(link) = &abs_num.num_style_link {
            if let Some(target) = self
                .abstract_nums
                .values()
                .find(|a| a.style_link.as_deref() == Some(link.as_str()))
            {
                abs_num = target;
            }
        }

        abs_num.levels.get(&level).ok_or_else(|| {
            Error::Format(format!(
                "abstractNumId {} has no level {}",
                abs_num.abstract_num_id, level
            ))
        })
    }
}

/// Child index at which a new `name` element keeps the numbering part in
/// schema order: after the last sibling of the same or an earlier kind
pub(crate) fn insertion_index(root: &RawXmlElement, name: &str) -> usize {
    let rank = |n: &str| CHILD_ORDER.iter().position(|o| *o == n);
    let Some(target) = rank(name) else {
        return root.children.len();
    };
    root.children
        .iter()
        .rposition(|c| {
            c.as_element()
                .and_then(|e| rank(&e.name))
                .is_some_and(|r| r <= target)
        })
        .map_or(0, |i| i + 1)
}
