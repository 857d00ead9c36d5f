//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::error::{Error, Result};
use crate::xml::{get_w_val, parse_bool, RawXmlElement, RawXmlNode};

/// Run element (w:r)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    /// Attributes of the w:r element (rsids and the like)
    pub attributes: Vec<(String, String)>,
    /// Run properties (w:rPr), kept as written
    pub properties: Option<RawXmlElement>,
    /// Run content
    pub content: Vec<RunContent>,
}

/// Content within a run
#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    /// Text (w:t)
    Text(String),
    /// Deleted text (w:delText)
    DeletedText(String),
    /// Tab (w:tab)
    Tab,
    /// Break (w:br)
    Break(Break),
    /// Carriage return (w:cr)
    CarriageReturn,
    /// Soft hyphen
    SoftHyphen,
    /// Non-breaking hyphen
    NoBreakHyphen,
    /// Anything else (fields, drawings, note references), preserved
    Other(RawXmlNode),
}

/// A w:br element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Break {
    pub break_type: BreakType,
    /// w:clear, when present
    pub clear: Option<String>,
}

/// Break type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

/// Run properties (w:rPr), resolved into comparable fields
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProperties {
    /// Style ID
    pub style: Option<String>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// Underline type
    pub underline: Option<String>,
    /// Strike-through
    pub strike: Option<bool>,
    /// Double strike-through
    pub double_strike: Option<bool>,
    /// Font size (in half-points, e.g., 24 = 12pt)
    pub size: Option<u32>,
    /// Color (RGB hex)
    pub color: Option<String>,
    /// Highlight color
    pub highlight: Option<String>,
    /// Font (ASCII)
    pub font_ascii: Option<String>,
    /// Font (East Asia)
    pub font_east_asia: Option<String>,
    /// Vertical alignment (superscript/subscript)
    pub vertical_align: Option<String>,
    /// Everything not modelled above
    pub unknown_children: Vec<RawXmlNode>,
}

impl Run {
    /// Create a plain run, turning `\t` and `\n` into tab and break nodes
    pub fn new(text: &str) -> Self {
        Self::with_properties(text, None)
    }

    /// Create a run carrying a copy of `properties`
    pub fn with_properties(text: &str, properties: Option<RawXmlElement>) -> Self {
        let mut content = Vec::new();
        let mut pending = String::new();

        for ch in text.chars() {
            let special = match ch {
                '\t' => Some(RunContent::Tab),
                '\n' => Some(RunContent::Break(Break::default())),
                _ => None,
            };
            match special {
                Some(node) => {
                    if !pending.is_empty() {
                        content.push(RunContent::Text(std::mem::take(&mut pending)));
                    }
                    content.push(node);
                }
                None => pending.push(ch),
            }
        }
        if !pending.is_empty() {
            content.push(RunContent::Text(pending));
        }

        Run {
            attributes: Vec::new(),
            properties,
            content,
        }
    }

    /// Read a w:r element
    pub fn from_element(element: &RawXmlElement) -> Result<Self> {
        let mut run = Run {
            attributes: element.attributes.clone(),
            ..Default::default()
        };

        for child in &element.children {
            let RawXmlNode::Element(e) = child else {
                run.content.push(RunContent::Other(child.clone()));
                continue;
            };

            match e.name.as_str() {
                "w:rPr" => run.properties = Some(e.clone()),
                "w:t" => run.content.push(RunContent::Text(e.text())),
                "w:delText" => run.content.push(RunContent::DeletedText(e.text())),
                "w:tab" => run.content.push(RunContent::Tab),
                "w:br" => {
                    let break_type = match e.w_attr("type") {
                        Some("page") => BreakType::Page,
                        Some("column") => BreakType::Column,
                        _ => BreakType::TextWrapping,
                    };
                    run.content.push(RunContent::Break(Break {
                        break_type,
                        clear: e.w_attr("clear").map(str::to_string),
                    }));
                }
                "w:cr" => run.content.push(RunContent::CarriageReturn),
                "w:softHyphen" => run.content.push(RunContent::SoftHyphen),
                "w:noBreakHyphen" => run.content.push(RunContent::NoBreakHyphen),
                _ => run.content.push(RunContent::Other(child.clone())),
            }
        }

        Ok(run)
    }

    /// Build the w:r element
    pub fn to_element(&self) -> RawXmlElement {
        let mut element = RawXmlElement::new("w:r");
        element.attributes = self.attributes.clone();

        if let Some(props) = &self.properties {
            element.push(props.clone());
        }
        for content in &self.content {
            element.children.push(content.to_node());
        }

        element
    }

    /// Text as seen by offsets: tabs as `\t`, breaks as `\n`
    pub fn text(&self) -> String {
        self.content.iter().filter_map(RunContent::text).collect()
    }

    /// Number of offset positions this run spans
    pub fn effective_len(&self) -> usize {
        self.content.iter().map(RunContent::effective_len).sum()
    }

    /// Resolved formatting of this run
    pub fn formatting(&self) -> RunProperties {
        self.properties
            .as_ref()
            .map(RunProperties::from_element)
            .unwrap_or_default()
    }

    /// Check if bold
    pub fn bold(&self) -> bool {
        self.formatting().bold.unwrap_or(false)
    }

    /// Check if italic
    pub fn italic(&self) -> bool {
        self.formatting().italic.unwrap_or(false)
    }

    /// Get font size in points (None if not specified)
    pub fn font_size_pt(&self) -> Option<f32> {
        self.formatting().size.map(|s| s as f32 / 2.0)
    }

    /// Get color (RGB hex string)
    pub fn color(&self) -> Option<String> {
        self.formatting().color
    }

    /// Split at a local offset.
    ///
    /// Both halves carry a copy of the properties and attributes. An empty
    /// side comes back as `None`.
    pub fn split_at(&self, offset: usize) -> Result<(Option<Run>, Option<Run>)> {
        let len = self.effective_len();
        if offset > len {
            return Err(Error::OffsetOutOfRange { offset, length: len });
        }
        if offset == 0 {
            return Ok((None, Some(self.clone())));
        }
        if offset == len {
            return Ok((Some(self.clone()), None));
        }

        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut pos = 0;

        for content in &self.content {
            let item_len = content.effective_len();
            if pos + item_len <= offset && !(item_len == 0 && pos == offset) {
                before.push(content.clone());
            } else if pos >= offset {
                after.push(content.clone());
            } else {
                let (head, tail) = content.split_text(offset - pos)?;
                before.push(head);
                after.push(tail);
            }
            pos += item_len;
        }

        Ok((Some(self.with_content(before)), Some(self.with_content(after))))
    }

    /// Turn inserted text into deleted text (for a tracked deletion)
    pub fn to_deleted(&self) -> Run {
        let content = self
            .content
            .iter()
            .map(|c| match c {
                RunContent::Text(t) => RunContent::DeletedText(t.clone()),
                RunContent::Other(RawXmlNode::Element(e)) if e.name == "w:instrText" => {
                    let mut e = e.clone();
                    e.name = "w:delInstrText".into();
                    RunContent::Other(RawXmlNode::Element(e))
                }
                other => other.clone(),
            })
            .collect();
        self.with_content(content)
    }

    fn with_content(&self, content: Vec<RunContent>) -> Run {
        Run {
            attributes: self.attributes.clone(),
            properties: self.properties.clone(),
            content,
        }
    }
}

impl RunContent {
    /// Offset positions covered by this node
    pub fn effective_len(&self) -> usize {
        match self {
            RunContent::Text(t) | RunContent::DeletedText(t) => t.chars().count(),
            RunContent::Tab | RunContent::Break(_) => 1,
            _ => 0,
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            RunContent::Text(t) | RunContent::DeletedText(t) => Some(t.clone()),
            RunContent::Tab => Some("\t".into()),
            RunContent::Break(_) => Some("\n".into()),
            _ => None,
        }
    }

    /// Split a text node strictly inside
    fn split_text(&self, at: usize) -> Result<(RunContent, RunContent)> {
        let (text, deleted) = match self {
            RunContent::Text(t) => (t, false),
            RunContent::DeletedText(t) => (t, true),
            other => return Err(Error::UnsplittableNode(format!("{:?}", other))),
        };

        let byte = text
            .char_indices()
            .nth(at)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (head, tail) = text.split_at(byte);
        let wrap = |s: &str| {
            if deleted {
                RunContent::DeletedText(s.to_string())
            } else {
                RunContent::Text(s.to_string())
            }
        };
        Ok((wrap(head), wrap(tail)))
    }

    /// Build the XML node
    pub fn to_node(&self) -> RawXmlNode {
        let element = match self {
            RunContent::Text(text) => text_element("w:t", text),
            RunContent::DeletedText(text) => text_element("w:delText", text),
            RunContent::Tab => RawXmlElement::new("w:tab"),
            RunContent::Break(br) => {
                let mut e = RawXmlElement::new("w:br");
                match br.break_type {
                    BreakType::Page => e.set_attr("w:type", "page"),
                    BreakType::Column => e.set_attr("w:type", "column"),
                    BreakType::TextWrapping => {}
                }
                if let Some(clear) = &br.clear {
                    e.set_attr("w:clear", clear.as_str());
                }
                e
            }
            RunContent::CarriageReturn => RawXmlElement::new("w:cr"),
            RunContent::SoftHyphen => RawXmlElement::new("w:softHyphen"),
            RunContent::NoBreakHyphen => RawXmlElement::new("w:noBreakHyphen"),
            RunContent::Other(node) => return node.clone(),
        };
        RawXmlNode::Element(element)
    }
}

fn text_element(name: &str, text: &str) -> RawXmlElement {
    let mut e = RawXmlElement::new(name);
    if text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ")
    {
        e.set_attr("xml:space", "preserve");
    }
    if !text.is_empty() {
        e.children.push(RawXmlNode::Text(text.to_string()));
    }
    e
}

impl RunProperties {
    /// Resolve a w:rPr element
    pub fn from_element(rpr: &RawXmlElement) -> Self {
        let mut props = RunProperties::default();

        for child in &rpr.children {
            let RawXmlNode::Element(e) = child else {
                continue;
            };

            match e.local_name() {
                "rStyle" => props.style = get_w_val(e).map(str::to_string),
                "b" => props.bold = Some(parse_bool(e)),
                "i" => props.italic = Some(parse_bool(e)),
                "u" => {
                    props.underline = Some(get_w_val(e).unwrap_or("single").to_string());
                }
                "strike" => props.strike = Some(parse_bool(e)),
                "dstrike" => props.double_strike = Some(parse_bool(e)),
                "sz" => props.size = get_w_val(e).and_then(|v| v.parse().ok()),
                "color" => props.color = get_w_val(e).map(str::to_string),
                "highlight" => props.highlight = get_w_val(e).map(str::to_string),
                "vertAlign" => props.vertical_align = get_w_val(e).map(str::to_string),
                "rFonts" => {
                    props.font_ascii = e.w_attr("ascii").map(str::to_string);
                    props.font_east_asia = e.w_attr("eastAsia").map(str::to_string);
                }
                // Complex-script twins and revision markers don't change the look
                "bCs" | "iCs" | "szCs" | "ins" | "del" | "rPrChange" => {}
                _ => props.unknown_children.push(child.clone()),
            }
        }

        props
    }

    /// True when nothing is set
    pub fn is_empty(&self) -> bool {
        *self == RunProperties::default()
    }
}
