//! Numbering instance definitions

use crate::error::{Error, Result};
use crate::xml::{parse_id, RawXmlElement};

use super::level::LevelOverride;

/// Numbering instance (w:num)
#[derive(Clone, Debug, PartialEq)]
pub struct Num {
    /// Numbering ID (referenced by paragraphs)
    pub num_id: u32,
    /// Referenced abstract numbering ID
    pub abstract_num_id: u32,
    /// Level overrides
    pub level_overrides: Vec<LevelOverride>,
}

impl Num {
    /// Create a new numbering instance
    pub fn new(num_id: u32, abstract_num_id: u32) -> Self {
        Num {
            num_id,
            abstract_num_id,
            level_overrides: Vec::new(),
        }
    }

    pub(crate) fn from_element(element: &RawXmlElement) -> Result<Self> {
        let num_id = required_id(element, "w:numId")?;
        let abstract_ref = element.child("abstractNumId").ok_or_else(|| {
            Error::Format(format!("w:num {} has no w:abstractNumId", num_id))
        })?;
        let abstract_num_id = required_id(abstract_ref, "w:val")?;

        let level_overrides = element
            .children_named("lvlOverride")
            .map(LevelOverride::from_element)
            .collect::<Result<Vec<_>>>()?;

        Ok(Num {
            num_id,
            abstract_num_id,
            level_overrides,
        })
    }

    /// Override for a level, if any
    pub fn level_override(&self, ilvl: u8) -> Option<&LevelOverride> {
        self.level_overrides.iter().find(|o| o.ilvl == ilvl)
    }
}

pub(crate) fn required_id(element: &RawXmlElement, attr: &str) -> Result<u32> {
    let value = parse_id(element, attr)?
        .ok_or_else(|| Error::Format(format!("<{}> has no {}", element.name, attr)))?;
    u32::try_from(value)
        .map_err(|_| Error::Format(format!("<{}> has a negative {}", element.name, attr)))
}
