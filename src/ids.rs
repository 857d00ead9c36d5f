//! Identifier allocation over parsed parts
//!
//! Every counter is derived from the tree itself: the next free value is one
//! past the largest value present, so asking twice without a mutation in
//! between yields the same answer.

use crate::error::Result;
use crate::xml::{parse_id, RawXmlElement};

/// The identifier families a document allocates from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// `w:abstractNum/@w:abstractNumId` in the numbering part
    AbstractNumbering,
    /// `w:num/@w:numId` in the numbering part
    Numbering,
    /// `wp:docPr/@id` in the main document
    Drawing,
    /// `w:bookmarkStart/@w:id` in the main document
    Bookmark,
    /// `w:ins/@w:id` and `w:del/@w:id` in any story part
    TrackedChange,
}

impl CounterKind {
    /// Value handed out when nothing of this kind exists yet
    pub fn floor(self) -> u32 {
        match self {
            CounterKind::AbstractNumbering => 0,
            CounterKind::Numbering => 1,
            CounterKind::Drawing => 1,
            CounterKind::Bookmark => 0,
            CounterKind::TrackedChange => 0,
        }
    }

    /// Attribute carrying the id, when `element` belongs to this kind
    pub fn id_attribute(self, element: &RawXmlElement) -> Option<&'static str> {
        match self {
            CounterKind::AbstractNumbering if element.name == "w:abstractNum" => {
                Some("w:abstractNumId")
            }
            CounterKind::Numbering if element.name == "w:num" => Some("w:numId"),
            CounterKind::Drawing if element.is("docPr") => Some("id"),
            CounterKind::Bookmark if element.name == "w:bookmarkStart" => Some("w:id"),
            CounterKind::TrackedChange if is_tracked_change(element) => Some("w:id"),
            _ => None,
        }
    }
}

/// `w:ins` or `w:del`
pub fn is_tracked_change(element: &RawXmlElement) -> bool {
    element.name == "w:ins" || element.name == "w:del"
}

/// Largest id of `kind` present under `root`
pub fn max_id(root: &RawXmlElement, kind: CounterKind) -> Result<Option<u32>> {
    let mut max: Option<u32> = None;
    let mut failure = None;

    root.visit(&mut |element| {
        if failure.is_some() {
            return;
        }
        let Some(attr) = kind.id_attribute(element) else {
            return;
        };
        match parse_id(element, attr) {
            Ok(Some(value)) if value >= 0 => {
                let value = u32::try_from(value).unwrap_or(u32::MAX);
                max = Some(max.map_or(value, |m| m.max(value)));
            }
            Ok(_) => {}
            Err(e) => failure = Some(e),
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(max),
    }
}

/// Next free id of `kind` under `root`.
///
/// Fails with [`crate::Error::Format`] when an existing id is not numeric.
pub fn next_id(root: &RawXmlElement, kind: CounterKind) -> Result<u32> {
    Ok(match max_id(root, kind)? {
        Some(max) => max.saturating_add(1).max(kind.floor()),
        None => kind.floor(),
    })
}

/// Whether the tracked changes under `root` already read `start, start + 1, ...`.
///
/// Returns the id following them alongside the answer.
pub fn tracked_changes_in_sequence(root: &RawXmlElement, start: u32) -> (u32, bool) {
    let mut next = start;
    let mut in_sequence = true;
    root.visit(&mut |element| {
        if is_tracked_change(element) {
            in_sequence &= element.attr("w:id") == Some(next.to_string().as_str());
            next += 1;
        }
    });
    (next, in_sequence)
}

/// Assign sequential tracked-change ids in document order, starting at `start`.
///
/// Returns the next unused id so callers can chain parts.
pub fn renumber_tracked_changes(root: &mut RawXmlElement, start: u32) -> u32 {
    let mut next = start;
    root.visit_mut(&mut |element| {
        if is_tracked_change(element) {
            element.set_attr("w:id", next.to_string());
            next += 1;
        }
    });
    next
}
