//! Abstract numbering definitions

use std::collections::BTreeMap;

use crate::error::Result;
use crate::xml::{get_w_val, RawXmlElement};

use super::level::Level;
use super::num::required_id;

/// Abstract numbering definition (w:abstractNum)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbstractNum {
    /// Abstract numbering ID
    pub abstract_num_id: u32,
    /// Multi-level type
    pub multi_level_type: Option<String>,
    /// Numbering style this definition defines (w:styleLink)
    pub style_link: Option<String>,
    /// Numbering style this definition defers to (w:numStyleLink)
    pub num_style_link: Option<String>,
    /// Level definitions
    pub levels: BTreeMap<u8, Level>,
}

impl AbstractNum {
    pub(crate) fn from_element(element: &RawXmlElement) -> Result<Self> {
        let mut abs_num = AbstractNum {
            abstract_num_id: required_id(element, "w:abstractNumId")?,
            ..Default::default()
        };

        for child in element.elements() {
            match child.local_name() {
                "lvl" => {
                    let lvl = Level::from_element(child)?;
                    abs_num.levels.insert(lvl.ilvl, lvl);
                }
                "multiLevelType" => {
                    abs_num.multi_level_type = get_w_val(child).map(str::to_string)
                }
                "styleLink" => abs_num.style_link = get_w_val(child).map(str::to_string),
                "numStyleLink" => abs_num.num_style_link = get_w_val(child).map(str::to_string),
                _ => {}
            }
        }

        Ok(abs_num)
    }
}
