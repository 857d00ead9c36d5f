//! Offset-based editing of paragraphs
//!
//! Offsets count text characters, tabs and breaks (see
//! [`Paragraph::effective_len`]). Every operation validates its offsets and
//! builds the new content before touching the paragraph, so a failed edit
//! leaves it unchanged.

use crate::document::paragraph::{ChangeKind, Hyperlink, ParagraphContent, TrackedChange};
use crate::document::revision::Revision;
use crate::document::{Paragraph, Run, RunContent};
use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, RawXmlNode};

const PARAGRAPH_ID_ATTRS: [&str; 2] = ["w14:paraId", "w14:textId"];

impl Paragraph {
    /// Split into the content before and after `offset`.
    ///
    /// Runs, tracked-change wrappers and hyperlinks straddling the offset are
    /// cut in two; each half keeps the formatting and wrapper attributes. A
    /// side without text content comes back as `None`.
    pub fn split_at(&self, offset: usize) -> Result<(Option<Paragraph>, Option<Paragraph>)> {
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

        let (before, after) = split_items(&self.content, offset)?;
        Ok(self.assemble(before, after))
    }

    fn assemble(
        &self,
        mut before: Vec<ParagraphContent>,
        mut after: Vec<ParagraphContent>,
    ) -> (Option<Paragraph>, Option<Paragraph>) {
        if !has_text_content(&after) {
            before.append(&mut after);
            return (Some(self.with_content(before)), None);
        }
        if !has_text_content(&before) {
            before.append(&mut after);
            return (None, Some(self.with_content(before)));
        }

        let mut first = self.with_content(before);
        // the section break belongs to the paragraph mark, which stays with the second half
        if let Some(props) = first.properties.as_mut() {
            props
                .children
                .retain(|c| !matches!(c, RawXmlNode::Element(e) if e.name == "w:sectPr"));
        }

        let mut second = self.with_content(after);
        second
            .attributes
            .retain(|(k, _)| !PARAGRAPH_ID_ATTRS.contains(&k.as_str()));

        (Some(first), Some(second))
    }

    fn with_content(&self, content: Vec<ParagraphContent>) -> Paragraph {
        Paragraph {
            attributes: self.attributes.clone(),
            properties: self.properties.clone(),
            content,
        }
    }

    /// Insert `text` at `offset`.
    ///
    /// The new run copies the formatting of the run ending at the offset (or
    /// the run starting there). With a revision the run is wrapped in w:ins.
    pub fn insert_text(
        &mut self,
        offset: usize,
        text: &str,
        revision: Option<&Revision>,
    ) -> Result<()> {
        let len = self.effective_len();
        if offset > len {
            return Err(Error::OffsetOutOfRange { offset, length: len });
        }
        if text.is_empty() {
            return Ok(());
        }

        let properties = self.properties_for_insert(offset);
        self.insert_run(offset, Run::with_properties(text, properties), revision)
    }

    fn insert_run(&mut self, offset: usize, run: Run, revision: Option<&Revision>) -> Result<()> {
        let item = match revision {
            Some(rev) => ParagraphContent::Tracked(TrackedChange::new(
                ChangeKind::Insertion,
                rev,
                vec![ParagraphContent::Run(run)],
            )),
            None => ParagraphContent::Run(run),
        };
        self.content = insert_item(&self.content, offset, item)?;
        Ok(())
    }

    /// Remove `count` positions starting at `offset`.
    ///
    /// Untracked removal drops the text. Tracked removal wraps it in w:del
    /// (w:t becoming w:delText) and retracts text that was a tracked
    /// insertion. Content without text positions (bookmarks, field markers)
    /// is never removed.
    pub fn remove_text(
        &mut self,
        offset: usize,
        count: usize,
        revision: Option<&Revision>,
    ) -> Result<()> {
        let len = self.effective_len();
        let end = offset.saturating_add(count);
        if end > len {
            return Err(Error::OffsetOutOfRange { offset: end, length: len });
        }
        if count == 0 {
            return Ok(());
        }

        let (mut content, rest) = split_items(&self.content, offset)?;
        let (middle, after) = split_items(&rest, count)?;

        match revision {
            Some(rev) => content.extend(mark_deleted(middle, rev)),
            None => content.extend(middle.into_iter().filter(|i| i.effective_len() == 0)),
        }
        content.extend(after);

        self.content = content;
        Ok(())
    }

    /// Replace every occurrence of `search`, returning how many were replaced.
    ///
    /// Only live text is searched: text already deleted under tracking is
    /// skipped. Replacement text takes the formatting of the first replaced
    /// character.
    pub fn replace_text(
        &mut self,
        search: &str,
        replacement: &str,
        revision: Option<&Revision>,
    ) -> Result<usize> {
        if search.is_empty() {
            return Err(Error::InvalidArgument("search text is empty".into()));
        }

        let (text, positions) = self.live_text();
        let search_len = search.chars().count();
        let spans: Vec<(usize, usize)> = text
            .match_indices(search)
            .map(|(byte, _)| {
                let first = text[..byte].chars().count();
                let last = first + search_len - 1;
                (positions[first], positions[last] + 1)
            })
            .collect();
        if spans.is_empty() {
            return Ok(0);
        }

        let mut edited = self.clone();
        // back to front so earlier offsets stay valid
        for &(start, end) in spans.iter().rev() {
            let properties = edited
                .run_spans()
                .into_iter()
                .find(|(s, r)| *s <= start && start < s + r.effective_len())
                .and_then(|(_, r)| r.properties.clone());

            let len_before = edited.effective_len();
            edited.remove_text(start, end - start, revision)?;
            // tracked deletions keep their positions; the insertion follows them
            let kept = (end - start) - (len_before - edited.effective_len());
            if !replacement.is_empty() {
                edited.insert_run(
                    start + kept,
                    Run::with_properties(replacement, properties),
                    revision,
                )?;
            }
        }

        *self = edited;
        Ok(spans.len())
    }

    /// Text not deleted under tracking, with the offset of each character
    pub fn live_text(&self) -> (String, Vec<usize>) {
        let mut text = String::new();
        let mut positions = Vec::new();
        let mut pos = 0;
        collect_live(&self.content, &mut pos, &mut text, &mut positions);
        (text, positions)
    }

    fn properties_for_insert(&self, offset: usize) -> Option<RawXmlElement> {
        let spans = self.run_spans();
        let ending = spans
            .iter()
            .find(|(start, run)| {
                let len = run.effective_len();
                len > 0 && *start < offset && offset <= start + len
            });
        let starting = || {
            spans
                .iter()
                .find(|(start, run)| *start >= offset && run.effective_len() > 0)
        };

        ending
            .or_else(starting)
            .or(spans.first())
            .and_then(|(_, run)| run.properties.clone())
    }

    /// Every run with the offset it starts at
    fn run_spans(&self) -> Vec<(usize, &Run)> {
        let mut spans = Vec::new();
        let mut pos = 0;
        collect_spans(&self.content, &mut pos, &mut spans);
        spans
    }
}

fn collect_spans<'a>(
    items: &'a [ParagraphContent],
    pos: &mut usize,
    out: &mut Vec<(usize, &'a Run)>,
) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => {
                out.push((*pos, run));
                *pos += run.effective_len();
            }
            ParagraphContent::Tracked(t) => collect_spans(&t.content, pos, out),
            ParagraphContent::Hyperlink(h) => collect_spans(&h.content, pos, out),
            other => *pos += other.effective_len(),
        }
    }
}

fn collect_live(
    items: &[ParagraphContent],
    pos: &mut usize,
    text: &mut String,
    positions: &mut Vec<usize>,
) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => {
                for content in &run.content {
                    match content {
                        RunContent::Text(t) => {
                            text.push_str(t);
                            positions.extend(*pos..*pos + t.chars().count());
                        }
                        RunContent::Tab => {
                            text.push('\t');
                            positions.push(*pos);
                        }
                        RunContent::Break(_) => {
                            text.push('\n');
                            positions.push(*pos);
                        }
                        _ => {}
                    }
                    *pos += content.effective_len();
                }
            }
            ParagraphContent::Tracked(t) if t.kind == ChangeKind::Deletion => {
                *pos += item.effective_len();
            }
            ParagraphContent::Tracked(t) => collect_live(&t.content, pos, text, positions),
            ParagraphContent::Hyperlink(h) => collect_live(&h.content, pos, text, positions),
            other => {
                let t = other.text();
                text.push_str(&t);
                positions.extend(*pos..*pos + t.chars().count());
                *pos += other.effective_len();
            }
        }
    }
}

fn has_text_content(items: &[ParagraphContent]) -> bool {
    items
        .iter()
        .any(|i| i.is_run_bearing() || i.effective_len() > 0)
}

/// Partition `items` at `offset`; an item straddling it is split in two.
///
/// An offset on a boundary belongs to the following item, so zero-width
/// items sitting exactly at the offset land on the after side.
fn split_items(
    items: &[ParagraphContent],
    offset: usize,
) -> Result<(Vec<ParagraphContent>, Vec<ParagraphContent>)> {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;

    for item in items {
        let len = item.effective_len();
        if pos + len <= offset && !(len == 0 && pos == offset) {
            before.push(item.clone());
        } else if pos >= offset {
            after.push(item.clone());
        } else {
            let (head, tail) = split_item(item, offset - pos)?;
            before.push(head);
            after.push(tail);
        }
        pos += len;
    }

    Ok((before, after))
}

fn split_item(
    item: &ParagraphContent,
    offset: usize,
) -> Result<(ParagraphContent, ParagraphContent)> {
    match item {
        ParagraphContent::Run(run) => match run.split_at(offset)? {
            (Some(head), Some(tail)) => {
                Ok((ParagraphContent::Run(head), ParagraphContent::Run(tail)))
            }
            _ => Err(Error::UnsplittableNode("w:r".into())),
        },
        ParagraphContent::Tracked(t) => {
            let (head, tail) = split_items(&t.content, offset)?;
            let rewrap = |content| {
                ParagraphContent::Tracked(TrackedChange {
                    kind: t.kind,
                    attributes: t.attributes.clone(),
                    content,
                })
            };
            Ok((rewrap(head), rewrap(tail)))
        }
        ParagraphContent::Hyperlink(h) => {
            let (head, tail) = split_items(&h.content, offset)?;
            let rewrap = |content| {
                ParagraphContent::Hyperlink(Hyperlink {
                    attributes: h.attributes.clone(),
                    content,
                })
            };
            Ok((rewrap(head), rewrap(tail)))
        }
        ParagraphContent::Other(node) => Err(Error::UnsplittableNode(match node {
            RawXmlNode::Element(e) => e.name.clone(),
            _ => "non-element node".into(),
        })),
    }
}

/// Place `item` at `offset`, inside a hyperlink when the offset falls within one
fn insert_item(
    items: &[ParagraphContent],
    offset: usize,
    item: ParagraphContent,
) -> Result<Vec<ParagraphContent>> {
    let mut pos = 0;
    for (i, existing) in items.iter().enumerate() {
        let len = existing.effective_len();
        if pos < offset && offset < pos + len {
            if let ParagraphContent::Hyperlink(link) = existing {
                let mut out = items.to_vec();
                out[i] = ParagraphContent::Hyperlink(Hyperlink {
                    attributes: link.attributes.clone(),
                    content: insert_item(&link.content, offset - pos, item)?,
                });
                return Ok(out);
            }
            break;
        }
        pos += len;
    }

    let (mut out, after) = split_items(items, offset)?;
    out.push(item);
    out.extend(after);
    Ok(out)
}

/// Tracked removal of a whole range of items
fn mark_deleted(items: Vec<ParagraphContent>, revision: &Revision) -> Vec<ParagraphContent> {
    let mut out = Vec::new();
    let mut pending = Vec::new();

    let flush = |pending: &mut Vec<ParagraphContent>, out: &mut Vec<ParagraphContent>| {
        if !pending.is_empty() {
            out.push(ParagraphContent::Tracked(TrackedChange::new(
                ChangeKind::Deletion,
                revision,
                std::mem::take(pending),
            )));
        }
    };

    for item in items {
        if item.effective_len() == 0 {
            flush(&mut pending, &mut out);
            out.push(item);
            continue;
        }
        match item {
            ParagraphContent::Run(run) => pending.push(ParagraphContent::Run(run.to_deleted())),
            ParagraphContent::Tracked(t) if t.kind == ChangeKind::Insertion => {
                log::trace!("retracting tracked insertion {:?}", t.attributes);
            }
            ParagraphContent::Hyperlink(link) => {
                flush(&mut pending, &mut out);
                out.push(ParagraphContent::Hyperlink(Hyperlink {
                    content: mark_deleted(link.content, revision),
                    attributes: link.attributes,
                }));
            }
            other => {
                flush(&mut pending, &mut out);
                out.push(other);
            }
        }
    }
    flush(&mut pending, &mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn para(xml: &str) -> Paragraph {
        Paragraph::from_element(&XmlTree::from_xml(xml).unwrap().root).unwrap()
    }

    fn revision() -> Revision {
        Revision::new("Tester").with_date(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn xml(p: &Paragraph) -> String {
        p.to_element().to_xml().unwrap()
    }

    #[test]
    fn test_split_sentence_keeps_formatting() {
        let p = para(
            r#"<w:p><w:r><w:rPr><w:b/><w:color w:val="FF0000"/></w:rPr><w:t>This is a test. Will it work?</w:t></w:r></w:p>"#,
        );
        let (before, after) = p.split_at(15).unwrap();
        let (before, after) = (before.unwrap(), after.unwrap());

        assert_eq!(before.text(), "This is a test.");
        assert_eq!(after.text(), " Will it work?");
        for half in [&before, &after] {
            let run = half.runs()[0];
            assert!(run.bold());
            assert_eq!(run.color().as_deref(), Some("FF0000"));
        }
    }

    #[test]
    fn test_split_edges_return_original() {
        let p = para(r#"<w:p><w:r><w:t>abc</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#);
        assert_eq!(p.split_at(0).unwrap(), (None, Some(p.clone())));
        assert_eq!(p.split_at(3).unwrap(), (Some(p.clone()), None));
        assert!(matches!(
            p.split_at(4),
            Err(Error::OffsetOutOfRange { offset: 4, length: 3 })
        ));
    }

    #[test]
    fn test_split_empty_paragraph() {
        let p = Paragraph::new("");
        assert_eq!(p.split_at(0).unwrap(), (None, Some(p.clone())));
    }

    #[test]
    fn test_split_lengths_add_up() {
        let p = para(
            r#"<w:p><w:r><w:t>ab</w:t><w:tab/></w:r><w:ins w:id="1" w:author="x" w:date="2024-01-01T00:00:00Z"><w:r><w:t>cd</w:t></w:r></w:ins><w:hyperlink w:anchor="a"><w:r><w:t>ef</w:t><w:br/></w:r></w:hyperlink></w:p>"#,
        );
        let total = p.effective_len();
        for offset in 1..total {
            let (before, after) = p.split_at(offset).unwrap();
            let (before, after) = (before.unwrap(), after.unwrap());
            assert_eq!(before.effective_len() + after.effective_len(), total);
            assert_eq!(format!("{}{}", before.text(), after.text()), p.text());
        }
    }

    #[test]
    fn test_split_inside_tracked_change_keeps_attributes() {
        let p = para(
            r#"<w:p><w:ins w:id="4" w:author="Ann" w:date="2024-01-01T00:00:00Z"><w:r><w:t>abcd</w:t></w:r></w:ins></w:p>"#,
        );
        let (before, after) = p.split_at(2).unwrap();
        for half in [before.unwrap(), after.unwrap()] {
            match &half.content[0] {
                ParagraphContent::Tracked(t) => {
                    assert_eq!(t.kind, ChangeKind::Insertion);
                    assert_eq!(t.attributes, vec![
                        ("w:id".to_string(), "4".to_string()),
                        ("w:author".to_string(), "Ann".to_string()),
                        ("w:date".to_string(), "2024-01-01T00:00:00Z".to_string()),
                    ]);
                }
                other => panic!("expected wrapper, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_split_inside_opaque_node_fails() {
        let p = para(
            r#"<w:p><w:fldSimple w:instr="PAGE"><w:r><w:t>12</w:t></w:r></w:fldSimple></w:p>"#,
        );
        assert!(matches!(p.split_at(1), Err(Error::UnsplittableNode(_))));
    }

    #[test]
    fn test_split_moves_paragraph_ids_and_section_break() {
        let p = para(
            r#"<w:p w14:paraId="1A2B" w:rsidR="00C1"><w:pPr><w:sectPr/></w:pPr><w:r><w:t>abcd</w:t></w:r></w:p>"#,
        );
        let (before, after) = p.split_at(2).unwrap();
        let (before, after) = (before.unwrap(), after.unwrap());
        assert_eq!(before.attributes, p.attributes);
        assert_eq!(after.attributes, vec![("w:rsidR".to_string(), "00C1".to_string())]);
        assert!(before.properties.unwrap().child("sectPr").is_none());
        assert!(after.properties.unwrap().child("sectPr").is_some());
    }

    #[test]
    fn test_insert_inherits_preceding_formatting() {
        let mut p = para(
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>Hello</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>World</w:t></w:r></w:p>"#,
        );
        p.insert_text(5, ", ", None).unwrap();
        assert_eq!(p.text(), "Hello, World");
        let runs = p.runs();
        assert_eq!(runs.len(), 3);
        assert!(runs[1].italic());
        assert!(!runs[1].bold());

        p.insert_text(0, ">", None).unwrap();
        assert!(p.runs()[0].italic());
    }

    #[test]
    fn test_insert_tab_and_break() {
        let mut p = Paragraph::new("ab");
        p.insert_text(1, "\t-\n", None).unwrap();
        assert_eq!(p.text(), "a\t-\nb");
        assert_eq!(p.effective_len(), 5);
    }

    #[test]
    fn test_tracked_insert_wraps_in_ins() {
        let mut p = Paragraph::new("abcd");
        p.insert_text(2, "XY", Some(&revision())).unwrap();
        assert_eq!(
            xml(&p),
            r#"<w:p><w:r><w:t>ab</w:t></w:r><w:ins w:id="0" w:author="Tester" w:date="2024-01-02T03:04:05Z"><w:r><w:t>XY</w:t></w:r></w:ins><w:r><w:t>cd</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_insert_inside_hyperlink_stays_in_link() {
        let mut p = para(r#"<w:p><w:hyperlink r:id="rId3"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#);
        p.insert_text(2, "--", None).unwrap();
        assert_eq!(p.content.len(), 1);
        assert_eq!(p.text(), "li--nk");
    }

    #[test]
    fn test_insert_out_of_range_leaves_paragraph() {
        let mut p = Paragraph::new("ab");
        let copy = p.clone();
        assert!(matches!(
            p.insert_text(3, "x", None),
            Err(Error::OffsetOutOfRange { .. })
        ));
        assert_eq!(p, copy);
    }

    #[test]
    fn test_remove_untracked_keeps_bookmarks() {
        let mut p = para(
            r#"<w:p><w:r><w:t>ab</w:t></w:r><w:bookmarkStart w:id="0" w:name="m"/><w:r><w:t>cd</w:t></w:r><w:bookmarkEnd w:id="0"/><w:r><w:t>ef</w:t></w:r></w:p>"#,
        );
        p.remove_text(1, 4, None).unwrap();
        assert_eq!(p.text(), "af");
        assert_eq!(
            xml(&p),
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:bookmarkStart w:id="0" w:name="m"/><w:bookmarkEnd w:id="0"/><w:r><w:t>f</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_remove_tracked_wraps_in_del() {
        let mut p = Paragraph::new("abcdef");
        p.remove_text(2, 2, Some(&revision())).unwrap();
        assert_eq!(
            xml(&p),
            r#"<w:p><w:r><w:t>ab</w:t></w:r><w:del w:id="0" w:author="Tester" w:date="2024-01-02T03:04:05Z"><w:r><w:delText>cd</w:delText></w:r></w:del><w:r><w:t>ef</w:t></w:r></w:p>"#
        );
        // deleted text still occupies positions
        assert_eq!(p.effective_len(), 6);
    }

    #[test]
    fn test_remove_tracked_retracts_insertion() {
        let mut p = Paragraph::new("ad");
        p.insert_text(1, "bc", Some(&revision())).unwrap();
        p.remove_text(1, 2, Some(&revision())).unwrap();
        assert_eq!(p.text(), "ad");
        assert!(!xml(&p).contains("w:ins"));
        assert!(!xml(&p).contains("w:del"));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut p = Paragraph::new("abc");
        assert!(matches!(
            p.remove_text(2, 5, None),
            Err(Error::OffsetOutOfRange { offset: 7, length: 3 })
        ));
        assert_eq!(p.text(), "abc");
    }

    #[test]
    fn test_replace_text() {
        let mut p = para(
            r#"<w:p><w:r><w:t xml:space="preserve">cat and </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>cat</w:t></w:r></w:p>"#,
        );
        let replaced = p.replace_text("cat", "dog", None).unwrap();
        assert_eq!(replaced, 2);
        assert_eq!(p.text(), "dog and dog");
        let bold: String = p
            .runs()
            .iter()
            .filter(|r| r.bold())
            .map(|r| r.text())
            .collect();
        assert_eq!(bold, "dog");
    }

    #[test]
    fn test_replace_rejects_empty_search() {
        let mut p = Paragraph::new("abc");
        assert!(matches!(
            p.replace_text("", "x", None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tracked_replace() {
        let mut p = Paragraph::new("one two");
        p.replace_text("two", "2", Some(&revision())).unwrap();
        let out = xml(&p);
        assert!(out.contains("<w:ins"));
        assert!(out.contains("<w:delText>two</w:delText>"));
    }

    #[test]
    fn test_tracked_replace_skips_deleted_text() {
        let mut p = Paragraph::new("one two");
        assert_eq!(p.replace_text("two", "2", Some(&revision())).unwrap(), 1);
        assert_eq!(p.replace_text("two", "3", Some(&revision())).unwrap(), 0);

        assert_eq!(p.live_text().0, "one 2");
        let out = xml(&p);
        assert_eq!(out.matches("<w:ins").count(), 1);
        assert!(!out.contains(">3<"));
    }

    #[test]
    fn test_live_text_offsets_skip_deletions() {
        let p = para(
            r#"<w:p><w:r><w:t>ab</w:t></w:r><w:del w:id="1" w:author="A"><w:r><w:delText>X</w:delText></w:r></w:del><w:r><w:t>cd</w:t></w:r></w:p>"#,
        );
        assert_eq!(p.live_text(), ("abcd".to_string(), vec![0, 1, 3, 4]));

        let mut untracked = p.clone();
        assert_eq!(untracked.replace_text("bc", "Z", None).unwrap(), 1);
        assert_eq!(untracked.text(), "aZd");

        let mut tracked = p;
        tracked.replace_text("bc", "Z", Some(&revision())).unwrap();
        assert_eq!(tracked.live_text().0, "aZd");
        assert_eq!(tracked.text(), "abXcZd");
    }

    #[test]
    fn test_failed_replace_leaves_paragraph() {
        let mut p = para(
            r#"<w:p><w:r><w:t>x</w:t></w:r><w:fldSimple w:instr="PAGE"><w:r><w:t>yq</w:t></w:r></w:fldSimple><w:r><w:t>xy</w:t></w:r></w:p>"#,
        );
        let original = p.clone();

        assert!(matches!(
            p.replace_text("xy", "Z", None),
            Err(Error::UnsplittableNode(_))
        ));
        assert_eq!(p, original);
    }
}
