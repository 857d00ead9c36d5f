//! Level definitions for numbering

use crate::error::{Error, Result};
use crate::xml::{get_w_val, RawXmlElement};

use super::types::NumberFormat;

/// Level definition (w:lvl)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    /// Level index (0-8)
    pub ilvl: u8,
    /// Start value
    pub start: Option<u32>,
    /// Number format
    pub num_fmt: Option<NumberFormat>,
    /// Level text (e.g., "%1.", "%1.%2.")
    pub level_text: Option<String>,
    /// Level justification
    pub lvl_jc: Option<String>,
    /// Paragraph style tied to this level
    pub p_style: Option<String>,
    /// Left indentation (twips)
    pub ind_left: Option<i32>,
    /// Hanging indentation (twips)
    pub ind_hanging: Option<i32>,
}

/// Level override (w:lvlOverride)
#[derive(Clone, Debug, PartialEq)]
pub struct LevelOverride {
    /// Level index
    pub ilvl: u8,
    /// Start override
    pub start_override: Option<u32>,
    /// Level definition override
    pub lvl: Option<Level>,
}

impl Level {
    pub(crate) fn from_element(element: &RawXmlElement) -> Result<Self> {
        let mut level = Level {
            ilvl: parse_ilvl(element)?,
            ..Default::default()
        };

        for child in element.elements() {
            match child.local_name() {
                "start" => level.start = get_w_val(child).and_then(|v| v.parse().ok()),
                "numFmt" => {
                    level.num_fmt = get_w_val(child)
                        .map(|v| v.parse().unwrap_or(NumberFormat::Other(v.to_string())))
                }
                "lvlText" => level.level_text = get_w_val(child).map(str::to_string),
                "lvlJc" => level.lvl_jc = get_w_val(child).map(str::to_string),
                "pStyle" => level.p_style = get_w_val(child).map(str::to_string),
                "pPr" => {
                    if let Some(ind) = child.child("ind") {
                        level.ind_left = ind
                            .w_attr("left")
                            .or_else(|| ind.w_attr("start"))
                            .and_then(|v| v.parse().ok());
                        level.ind_hanging = ind.w_attr("hanging").and_then(|v| v.parse().ok());
                    }
                }
                _ => {}
            }
        }

        Ok(level)
    }

    /// Check if this level draws bullets
    pub fn is_bullet(&self) -> bool {
        self.num_fmt.as_ref().is_some_and(NumberFormat::is_bullet)
    }
}

impl LevelOverride {
    pub(crate) fn from_element(element: &RawXmlElement) -> Result<Self> {
        Ok(LevelOverride {
            ilvl: parse_ilvl(element)?,
            start_override: element
                .child("startOverride")
                .and_then(get_w_val)
                .and_then(|v| v.parse().ok()),
            lvl: element.child("lvl").map(Level::from_element).transpose()?,
        })
    }
}

fn parse_ilvl(element: &RawXmlElement) -> Result<u8> {
    match element.w_attr("ilvl") {
        None => Ok(0),
        Some(v) => v.trim().parse().map_err(|_| {
            Error::Format(format!("<{}> has a malformed w:ilvl '{}'", element.name, v))
        }),
    }
}
