//! Footnotes and endnotes

use crate::error::Result;
use crate::opc::{content_types, rel_types};
use crate::xml::{parse_id, RawXmlElement};
use std::collections::BTreeMap;

/// The two note stories
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    /// Relationship type linking the notes part from the main document
    pub fn rel_type(self) -> &'static str {
        match self {
            NoteKind::Footnote => rel_types::FOOTNOTES,
            NoteKind::Endnote => rel_types::ENDNOTES,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            NoteKind::Footnote => content_types::FOOTNOTES,
            NoteKind::Endnote => content_types::ENDNOTES,
        }
    }

    /// Qualified name of a single note
    pub fn element(self) -> &'static str {
        match self {
            NoteKind::Footnote => "w:footnote",
            NoteKind::Endnote => "w:endnote",
        }
    }

    /// Qualified name of the in-text reference mark
    pub fn reference(self) -> &'static str {
        match self {
            NoteKind::Footnote => "w:footnoteReference",
            NoteKind::Endnote => "w:endnoteReference",
        }
    }
}

/// Regular foreign notes renumbered above the host's largest note id.
///
/// Separator and continuation notes (any w:type other than `normal`) belong
/// to the part, not to the content, and are left behind. Returns old id ->
/// new id with the renumbered copies.
pub(super) fn renumber(
    host: &RawXmlElement,
    foreign: &RawXmlElement,
    kind: NoteKind,
) -> Result<(BTreeMap<i64, i64>, Vec<RawXmlElement>)> {
    let mut next = 1;
    for note in host.elements().filter(|e| e.name == kind.element()) {
        if let Some(id) = parse_id(note, "w:id")? {
            next = next.max(id + 1);
        }
    }

    let mut map = BTreeMap::new();
    let mut notes = Vec::new();
    for note in foreign.elements().filter(|e| e.name == kind.element()) {
        if note.w_attr("type").is_some_and(|t| t != "normal") {
            continue;
        }
        let Some(old) = parse_id(note, "w:id")? else {
            log::warn!("{} without w:id skipped", kind.element());
            continue;
        };
        let mut copy = note.clone();
        copy.set_attr("w:id", next.to_string());
        map.insert(old, next);
        notes.push(copy);
        next += 1;
    }
    Ok((map, notes))
}

/// Point note reference marks at their renumbered notes
pub(super) fn rewrite_references(
    root: &mut RawXmlElement,
    kind: NoteKind,
    map: &BTreeMap<i64, i64>,
) {
    if map.is_empty() {
        return;
    }
    root.visit_mut(&mut |element| {
        if element.name != kind.reference() {
            return;
        }
        let mapped = parse_id(element, "w:id")
            .ok()
            .flatten()
            .and_then(|old| map.get(&old).copied());
        if let Some(new) = mapped {
            element.set_attr("w:id", new.to_string());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;
    use pretty_assertions::assert_eq;

    fn root(xml: &str) -> RawXmlElement {
        XmlTree::from_xml(xml).unwrap().root
    }

    const NOTES: &str = r#"<w:footnotes>
        <w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
        <w:footnote w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:footnote>
        <w:footnote w:id="1"><w:p><w:r><w:t>first</w:t></w:r></w:p></w:footnote>
        <w:footnote w:id="2"><w:p><w:r><w:t>second</w:t></w:r></w:p></w:footnote>
    </w:footnotes>"#;

    #[test]
    fn test_regular_notes_move_above_host_ids() {
        let (map, notes) = renumber(&root(NOTES), &root(NOTES), NoteKind::Footnote).unwrap();
        assert_eq!(map, BTreeMap::from([(1, 3), (2, 4)]));
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].attr("w:id"), Some("3"));
        assert_eq!(notes[0].text(), "first");
    }

    #[test]
    fn test_empty_host_starts_at_one() {
        let (map, _) = renumber(&root("<w:endnotes/>"), &root(NOTES), NoteKind::Footnote).unwrap();
        assert_eq!(map[&1], 1);
        assert_eq!(map[&2], 2);
    }

    #[test]
    fn test_reference_marks_follow() {
        let mut body = root(
            r#"<w:body><w:p><w:r><w:footnoteReference w:id="1"/></w:r><w:r><w:endnoteReference w:id="1"/></w:r></w:p></w:body>"#,
        );
        rewrite_references(&mut body, NoteKind::Footnote, &BTreeMap::from([(1, 7)]));
        let xml = body.to_xml().unwrap();
        assert!(xml.contains(r#"<w:footnoteReference w:id="7"/>"#));
        assert!(xml.contains(r#"<w:endnoteReference w:id="1"/>"#));
    }
}
