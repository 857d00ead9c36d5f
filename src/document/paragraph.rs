//! Paragraph element (w:p)

use crate::document::revision::Revision;
use crate::document::Run;
use crate::error::Result;
use crate::xml::{get_w_val, RawXmlElement, RawXmlNode};

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    /// Attributes of the w:p element (rsids, w14:paraId, ...)
    pub attributes: Vec<(String, String)>,
    /// Paragraph properties (w:pPr), kept as written
    pub properties: Option<RawXmlElement>,
    /// Paragraph content (runs, tracked changes, hyperlinks, etc.)
    pub content: Vec<ParagraphContent>,
}

/// Content within a paragraph
#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphContent {
    /// Text run
    Run(Run),
    /// Tracked insertion or deletion wrapping runs
    Tracked(TrackedChange),
    /// Hyperlink
    Hyperlink(Hyperlink),
    /// Bookmarks, fields, comments and anything else, preserved
    Other(RawXmlNode),
}

/// Which kind of tracked change a wrapper records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// w:ins
    Insertion,
    /// w:del
    Deletion,
}

impl ChangeKind {
    pub fn element_name(self) -> &'static str {
        match self {
            ChangeKind::Insertion => "w:ins",
            ChangeKind::Deletion => "w:del",
        }
    }
}

/// A w:ins / w:del wrapper
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedChange {
    pub kind: ChangeKind,
    /// w:id, w:author, w:date and whatever else was present
    pub attributes: Vec<(String, String)>,
    pub content: Vec<ParagraphContent>,
}

/// Hyperlink element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hyperlink {
    /// r:id, w:anchor, w:history, ...
    pub attributes: Vec<(String, String)>,
    pub content: Vec<ParagraphContent>,
}

/// A paragraph's list membership (w:numPr)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingReference {
    pub num_id: u32,
    pub level: u32,
}

impl Paragraph {
    /// Create a new paragraph with a single plain run
    pub fn new(text: &str) -> Self {
        let mut para = Paragraph::default();
        if !text.is_empty() {
            para.content.push(ParagraphContent::Run(Run::new(text)));
        }
        para
    }

    /// Read a w:p element
    pub fn from_element(element: &RawXmlElement) -> Result<Self> {
        let mut para = Paragraph {
            attributes: element.attributes.clone(),
            ..Default::default()
        };

        for child in &element.children {
            match child {
                RawXmlNode::Element(e) if e.name == "w:pPr" => {
                    para.properties = Some(e.clone());
                }
                _ => para.content.push(ParagraphContent::from_node(child)?),
            }
        }

        Ok(para)
    }

    /// Build the w:p element
    pub fn to_element(&self) -> RawXmlElement {
        let mut element = RawXmlElement::new("w:p");
        element.attributes = self.attributes.clone();

        if let Some(props) = &self.properties {
            element.push(props.clone());
        }
        for content in &self.content {
            element.children.push(content.to_node());
        }

        element
    }

    /// Get all text in this paragraph (tabs as `\t`, breaks as `\n`)
    pub fn text(&self) -> String {
        self.content.iter().map(ParagraphContent::text).collect()
    }

    /// Number of offset positions this paragraph spans
    pub fn effective_len(&self) -> usize {
        self.content.iter().map(ParagraphContent::effective_len).sum()
    }

    /// Get style ID
    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.child("pStyle").and_then(get_w_val)
    }

    /// Set the paragraph style
    pub fn set_style(&mut self, style: &str) {
        let props = self
            .properties
            .get_or_insert_with(|| RawXmlElement::new("w:pPr"));
        match props.child_mut("pStyle") {
            Some(existing) => existing.set_attr("w:val", style),
            None => {
                let style = RawXmlElement::new("w:pStyle").with_attr("w:val", style);
                props.children.insert(0, RawXmlNode::Element(style));
            }
        }
    }

    /// List membership, if the paragraph has w:numPr
    pub fn numbering(&self) -> Option<NumberingReference> {
        let num_pr = self.properties.as_ref()?.child("numPr")?;
        let num_id = num_pr.child("numId").and_then(get_w_val)?.parse().ok()?;
        let level = num_pr
            .child("ilvl")
            .and_then(get_w_val)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Some(NumberingReference { num_id, level })
    }

    /// Put the paragraph in list `num_id` at `level`
    pub fn set_numbering(&mut self, num_id: u32, level: u32) {
        let props = self
            .properties
            .get_or_insert_with(|| RawXmlElement::new("w:pPr"));
        props
            .children
            .retain(|c| !matches!(c, RawXmlNode::Element(e) if e.is("numPr")));

        let num_pr = RawXmlElement::new("w:numPr")
            .with_child(RawXmlElement::new("w:ilvl").with_attr("w:val", level.to_string()))
            .with_child(RawXmlElement::new("w:numId").with_attr("w:val", num_id.to_string()));

        // numPr follows pStyle, keepNext, keepLines and pageBreakBefore
        let pos = props
            .elements()
            .take_while(|e| {
                matches!(
                    e.local_name(),
                    "pStyle"
                        | "keepNext"
                        | "keepLines"
                        | "pageBreakBefore"
                        | "framePr"
                        | "widowControl"
                )
            })
            .count();
        props.children.insert(pos, RawXmlNode::Element(num_pr));
    }

    /// Runs in document order, including those inside wrappers and hyperlinks
    pub fn runs(&self) -> Vec<&Run> {
        let mut runs = Vec::new();
        collect_runs(&self.content, &mut runs);
        runs
    }

    /// Append a run
    pub fn add_run(&mut self, run: Run) {
        self.content.push(ParagraphContent::Run(run));
    }
}

fn collect_runs<'a>(items: &'a [ParagraphContent], out: &mut Vec<&'a Run>) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => out.push(run),
            ParagraphContent::Tracked(t) => collect_runs(&t.content, out),
            ParagraphContent::Hyperlink(h) => collect_runs(&h.content, out),
            ParagraphContent::Other(_) => {}
        }
    }
}

impl ParagraphContent {
    /// Classify a child node of w:p (or of a wrapper)
    pub fn from_node(node: &RawXmlNode) -> Result<Self> {
        let RawXmlNode::Element(e) = node else {
            return Ok(ParagraphContent::Other(node.clone()));
        };

        Ok(match e.name.as_str() {
            "w:r" => ParagraphContent::Run(Run::from_element(e)?),
            "w:ins" | "w:del" => {
                let kind = if e.name == "w:ins" {
                    ChangeKind::Insertion
                } else {
                    ChangeKind::Deletion
                };
                ParagraphContent::Tracked(TrackedChange {
                    kind,
                    attributes: e.attributes.clone(),
                    content: parse_items(e)?,
                })
            }
            "w:hyperlink" => ParagraphContent::Hyperlink(Hyperlink {
                attributes: e.attributes.clone(),
                content: parse_items(e)?,
            }),
            _ => ParagraphContent::Other(node.clone()),
        })
    }

    /// Build the XML node
    pub fn to_node(&self) -> RawXmlNode {
        match self {
            ParagraphContent::Run(run) => RawXmlNode::Element(run.to_element()),
            ParagraphContent::Tracked(t) => {
                RawXmlNode::Element(wrapper(t.kind.element_name(), &t.attributes, &t.content))
            }
            ParagraphContent::Hyperlink(h) => {
                RawXmlNode::Element(wrapper("w:hyperlink", &h.attributes, &h.content))
            }
            ParagraphContent::Other(node) => node.clone(),
        }
    }

    /// Number of offset positions covered
    pub fn effective_len(&self) -> usize {
        match self {
            ParagraphContent::Run(run) => run.effective_len(),
            ParagraphContent::Tracked(t) => t.content.iter().map(Self::effective_len).sum(),
            ParagraphContent::Hyperlink(h) => h.content.iter().map(Self::effective_len).sum(),
            ParagraphContent::Other(RawXmlNode::Element(e)) => measure(e).0,
            ParagraphContent::Other(_) => 0,
        }
    }

    /// Text covered, consistent with `effective_len`
    pub fn text(&self) -> String {
        match self {
            ParagraphContent::Run(run) => run.text(),
            ParagraphContent::Tracked(t) => t.content.iter().map(Self::text).collect(),
            ParagraphContent::Hyperlink(h) => h.content.iter().map(Self::text).collect(),
            ParagraphContent::Other(RawXmlNode::Element(e)) => measure(e).1,
            ParagraphContent::Other(_) => String::new(),
        }
    }

    /// Runs, wrappers and hyperlinks carry text the edit engine can work with
    pub fn is_run_bearing(&self) -> bool {
        !matches!(self, ParagraphContent::Other(_))
    }
}

impl TrackedChange {
    /// A fresh wrapper stamped with `revision`
    pub fn new(kind: ChangeKind, revision: &Revision, content: Vec<ParagraphContent>) -> Self {
        Self {
            kind,
            attributes: revision.attributes(),
            content,
        }
    }
}

fn parse_items(element: &RawXmlElement) -> Result<Vec<ParagraphContent>> {
    element
        .children
        .iter()
        .map(ParagraphContent::from_node)
        .collect()
}

fn wrapper(
    name: &str,
    attributes: &[(String, String)],
    content: &[ParagraphContent],
) -> RawXmlElement {
    let mut element = RawXmlElement::new(name);
    element.attributes = attributes.to_vec();
    element.children = content.iter().map(ParagraphContent::to_node).collect();
    element
}

/// Length and text of an opaque inline element.
///
/// Text inside drawings, text boxes and alternate content belongs to another
/// story and is not counted.
fn measure(element: &RawXmlElement) -> (usize, String) {
    let mut len = 0;
    let mut text = String::new();
    measure_into(element, &mut len, &mut text);
    (len, text)
}

fn measure_into(element: &RawXmlElement, len: &mut usize, text: &mut String) {
    match element.local_name() {
        "t" | "delText" => {
            let t = element.text();
            *len += t.chars().count();
            text.push_str(&t);
        }
        "tab" | "br" => {
            *len += 1;
            text.push(if element.is("tab") { '\t' } else { '\n' });
        }
        "tr" => {
            *len += 1;
            text.push('\n');
        }
        "tc" => {
            *len += 1;
            text.push('\t');
        }
        "drawing" | "pict" | "object" | "AlternateContent" | "txbxContent" | "pPr" | "rPr" => {}
        _ => {
            for child in element.elements() {
                measure_into(child, len, text);
            }
        }
    }
}
