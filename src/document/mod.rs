//! Document model - high-level API for DOCX documents

pub mod body;
pub mod cache;
mod edit;
mod formatted;
pub mod numbering;
mod paragraph;
mod revision;
mod run;
pub mod styles;

pub use cache::PartCache;
pub use formatted::FormattedText;
pub use numbering::{Level, ListKind, NumberFormat, Numbering};
pub use paragraph::{
    ChangeKind, Hyperlink, NumberingReference, Paragraph, ParagraphContent, TrackedChange,
};
pub use revision::Revision;
pub use run::{Break, BreakType, Run, RunContent, RunProperties};

use crate::error::{Error, Result};
use crate::ids::{self, CounterKind};
use crate::merge::{self, MergePosition};
use crate::opc::{content_types, rel_types, well_known, Package, Part, PartUri};
use crate::resources;
use crate::xml::{RawXmlElement, RawXmlNode, XmlTree};
use std::path::Path;

const LIST_PARAGRAPH_STYLE: &str = "ListParagraph";

/// A DOCX document
///
/// Parts are parsed on demand into a [`PartCache`]; every edit goes through
/// the cached trees and reaches the package on [`Document::save`].
#[derive(Clone, Debug)]
pub struct Document {
    /// Underlying OPC package
    pub(crate) package: Package,
    /// Parsed XML parts
    pub(crate) cache: PartCache,
    /// URI of the main document part
    pub(crate) main: PartUri,
    track_changes: Option<Revision>,
}

impl Document {
    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = Package::open(path)?;
        Self::from_package(package)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        Self::from_package(package)
    }

    /// Create document from an OPC package
    pub fn from_package(package: Package) -> Result<Self> {
        let main = package.main_document_uri()?;
        let mut cache = PartCache::new();
        body::body(&cache.tree(&package, &main)?.root)?;

        Ok(Self {
            package,
            cache,
            main,
            track_changes: None,
        })
    }

    /// Create a new empty document with default styles and settings
    pub fn new() -> Result<Self> {
        let main = well_known::document();
        let styles = well_known::styles();
        let settings = well_known::settings();
        let seed = resources::revision_seed();

        let mut package = Package::new();
        package.add_part(Part::new(
            main.clone(),
            content_types::MAIN_DOCUMENT,
            resources::blank_document_template()?.to_bytes()?,
        ));
        package.add_part(Part::new(
            styles.clone(),
            content_types::STYLES,
            resources::default_styles_template()?.to_bytes()?,
        ));
        package.add_part(Part::new(
            settings.clone(),
            content_types::SETTINGS,
            resources::default_settings_template(&seed)?.to_bytes()?,
        ));

        package
            .relationships_mut()
            .add(rel_types::OFFICE_DOCUMENT, main.zip_path());
        let rels = package.part_relationships_mut(&main)?;
        rels.add(rel_types::STYLES, &styles.relative_to(&main));
        rels.add(rel_types::SETTINGS, &settings.relative_to(&main));

        log::debug!("created blank document (revision seed {})", seed);
        Self::from_package(package)
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.update_package()?;
        self.package.save(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.update_package()?;
        self.package.to_bytes()
    }

    /// Renumber tracked changes and write pending edits into the package
    fn update_package(&mut self) -> Result<()> {
        self.renumber_tracked_changes()?;
        self.cache.flush(&mut self.package)
    }

    /// Give every w:ins / w:del a sequential id across all story parts.
    ///
    /// Parts are visited main document first, then headers and footers in
    /// relationship order, then footnotes and endnotes. Returns the number of
    /// tracked changes.
    pub fn renumber_tracked_changes(&mut self) -> Result<u32> {
        let mut next = 0;
        for uri in self.story_parts() {
            let tree = self.cache.tree(&self.package, &uri)?;
            let (after, in_sequence) = ids::tracked_changes_in_sequence(&tree.root, next);
            if !in_sequence {
                let tree = self.cache.tree_mut(&self.package, &uri)?;
                ids::renumber_tracked_changes(&mut tree.root, next);
            }
            next = after;
        }
        Ok(next)
    }

    /// Parts that can carry text: main document, headers, footers, notes
    pub(crate) fn story_parts(&self) -> Vec<PartUri> {
        let mut parts = vec![self.main.clone()];
        let Some(rels) = self.package.part_relationships(&self.main) else {
            return parts;
        };

        let headers_footers = rels
            .iter()
            .filter(|r| r.rel_type == rel_types::HEADER || r.rel_type == rel_types::FOOTER)
            .filter_map(|r| self.package.relationship_target(&self.main, r).ok());
        let notes = [rel_types::FOOTNOTES, rel_types::ENDNOTES]
            .into_iter()
            .filter_map(|t| self.package.related_part(&self.main, t));

        for uri in headers_footers.chain(notes) {
            if self.package.contains(&uri) && !parts.contains(&uri) {
                parts.push(uri);
            }
        }
        parts
    }

    // === Track changes ===

    /// Record subsequent text edits as tracked changes by `revision`, or stop
    /// tracking with `None`
    pub fn set_track_changes(&mut self, revision: Option<Revision>) {
        self.track_changes = revision;
    }

    /// Revision stamped on edits, when tracking is on
    pub fn track_changes(&self) -> Option<&Revision> {
        self.track_changes.as_ref()
    }

    // === Paragraphs ===

    fn main_root(&self) -> Result<&RawXmlElement> {
        self.cache
            .get(&self.main)
            .map(|tree| &tree.root)
            .ok_or_else(|| Error::MissingPart(self.main.to_string()))
    }

    fn main_root_mut(&mut self) -> Result<&mut RawXmlElement> {
        Ok(&mut self.cache.tree_mut(&self.package, &self.main)?.root)
    }

    /// Get all top-level paragraphs of the body
    pub fn paragraphs(&self) -> Result<Vec<Paragraph>> {
        body::paragraphs(body::body(self.main_root()?)?)
    }

    /// Get paragraph count
    pub fn paragraph_count(&self) -> Result<usize> {
        Ok(body::paragraph_slots(body::body(self.main_root()?)?).len())
    }

    /// Get paragraph by index
    pub fn paragraph(&self, index: usize) -> Result<Option<Paragraph>> {
        body::body(self.main_root()?)?
            .elements()
            .filter(|e| e.name == "w:p")
            .nth(index)
            .map(Paragraph::from_element)
            .transpose()
    }

    /// Get all text in the document, one line per paragraph
    pub fn text(&self) -> Result<String> {
        Ok(self
            .paragraphs()?
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn slot(&self, index: usize) -> Result<usize> {
        let slots = body::paragraph_slots(body::body(self.main_root()?)?);
        slots.get(index).copied().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "paragraph {} out of range ({} paragraphs)",
                index,
                slots.len()
            ))
        })
    }

    /// Replace the paragraph at `index`
    pub fn set_paragraph(&mut self, index: usize, paragraph: &Paragraph) -> Result<()> {
        let slot = self.slot(index)?;
        let body = body::body_mut(self.main_root_mut()?)?;
        body.children[slot] = RawXmlNode::Element(paragraph.to_element());
        Ok(())
    }

    /// Insert a paragraph so that it becomes paragraph `index`.
    ///
    /// `index == paragraph_count()` appends before the final section
    /// properties.
    pub fn insert_paragraph(&mut self, index: usize, paragraph: &Paragraph) -> Result<()> {
        let body = body::body(self.main_root()?)?;
        let slots = body::paragraph_slots(body);
        let at = match slots.get(index) {
            Some(&slot) => slot,
            None if index == slots.len() => body::append_index(body),
            None => {
                return Err(Error::InvalidArgument(format!(
                    "paragraph {} out of range ({} paragraphs)",
                    index,
                    slots.len()
                )))
            }
        };

        let body = body::body_mut(self.main_root_mut()?)?;
        body.children
            .insert(at, RawXmlNode::Element(paragraph.to_element()));
        Ok(())
    }

    /// Remove and return the paragraph at `index`
    pub fn remove_paragraph(&mut self, index: usize) -> Result<Paragraph> {
        let slot = self.slot(index)?;
        let removed = self.paragraph(index)?.ok_or_else(|| {
            Error::InvalidArgument(format!("paragraph {} out of range", index))
        })?;
        body::body_mut(self.main_root_mut()?)?.children.remove(slot);
        Ok(removed)
    }

    /// Append a paragraph with text, returning its index
    pub fn add_paragraph(&mut self, text: &str) -> Result<usize> {
        self.push_paragraph(&Paragraph::new(text))
    }

    fn push_paragraph(&mut self, paragraph: &Paragraph) -> Result<usize> {
        let index = self.paragraph_count()?;
        self.insert_paragraph(index, paragraph)?;
        Ok(index)
    }

    // === Text editing ===

    fn edit_paragraph<T>(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut Paragraph, Option<&Revision>) -> Result<T>,
    ) -> Result<T> {
        let mut paragraph = self.paragraph(index)?.ok_or_else(|| {
            Error::InvalidArgument(format!("paragraph {} out of range", index))
        })?;
        let out = edit(&mut paragraph, self.track_changes.as_ref())?;
        self.set_paragraph(index, &paragraph)?;
        Ok(out)
    }

    /// Split paragraph `index` in two at `offset`.
    ///
    /// Returns whether a split happened; an offset at either end leaves the
    /// paragraph whole.
    pub fn split_paragraph(&mut self, index: usize, offset: usize) -> Result<bool> {
        let slot = self.slot(index)?;
        let paragraph = self.paragraph(index)?.ok_or_else(|| {
            Error::InvalidArgument(format!("paragraph {} out of range", index))
        })?;

        let (Some(before), Some(after)) = paragraph.split_at(offset)? else {
            return Ok(false);
        };

        let body = body::body_mut(self.main_root_mut()?)?;
        body.children[slot] = RawXmlNode::Element(before.to_element());
        body.children
            .insert(slot + 1, RawXmlNode::Element(after.to_element()));
        Ok(true)
    }

    /// Insert text into paragraph `index` at `offset`
    pub fn insert_text(&mut self, index: usize, offset: usize, text: &str) -> Result<()> {
        self.edit_paragraph(index, |p, rev| p.insert_text(offset, text, rev))
    }

    /// Remove `count` positions from paragraph `index` starting at `offset`
    pub fn remove_text(&mut self, index: usize, offset: usize, count: usize) -> Result<()> {
        self.edit_paragraph(index, |p, rev| p.remove_text(offset, count, rev))
    }

    /// Replace `search` in every body paragraph, returning the replacement count.
    ///
    /// Nothing is written back unless every paragraph was edited successfully.
    pub fn replace_text(&mut self, search: &str, replacement: &str) -> Result<usize> {
        if search.is_empty() {
            return Err(Error::InvalidArgument("search text is empty".into()));
        }

        let mut total = 0;
        let mut edited = Vec::new();
        for (index, mut paragraph) in self.paragraphs()?.into_iter().enumerate() {
            if !paragraph.live_text().0.contains(search) {
                continue;
            }
            total += paragraph.replace_text(search, replacement, self.track_changes.as_ref())?;
            edited.push((index, paragraph));
        }

        for (index, paragraph) in &edited {
            self.set_paragraph(*index, paragraph)?;
        }
        Ok(total)
    }

    /// Text of paragraph `index` grouped by formatting
    pub fn formatted_text(&self, index: usize) -> Result<Vec<FormattedText>> {
        self.paragraph(index)?
            .map(|p| p.formatted_text())
            .ok_or_else(|| Error::InvalidArgument(format!("paragraph {} out of range", index)))
    }

    // === Identifiers and lists ===

    fn numbering_uri(&self) -> Option<PartUri> {
        self.package
            .related_part(&self.main, rel_types::NUMBERING)
            .filter(|uri| self.package.contains(uri))
    }

    fn styles_uri(&self) -> Option<PartUri> {
        self.package
            .related_part(&self.main, rel_types::STYLES)
            .filter(|uri| self.package.contains(uri))
    }

    /// Next free identifier of `kind`, scanning the part that owns it.
    ///
    /// Tracked-change ids are scanned across every story part.
    pub fn next_id(&mut self, kind: CounterKind) -> Result<u32> {
        match kind {
            CounterKind::AbstractNumbering | CounterKind::Numbering => match self.numbering_uri() {
                Some(uri) => ids::next_id(&self.cache.tree(&self.package, &uri)?.root, kind),
                None => Ok(kind.floor()),
            },
            CounterKind::Drawing | CounterKind::Bookmark => ids::next_id(self.main_root()?, kind),
            CounterKind::TrackedChange => {
                let mut next = kind.floor();
                for uri in self.story_parts() {
                    let root = &self.cache.tree(&self.package, &uri)?.root;
                    next = next.max(ids::next_id(root, kind)?);
                }
                Ok(next)
            }
        }
    }

    /// Numbering definitions; empty when the document has no numbering part
    pub fn numbering(&mut self) -> Result<Numbering> {
        match self.numbering_uri() {
            Some(uri) => Numbering::from_element(&self.cache.tree(&self.package, &uri)?.root),
            None => Ok(Numbering::new()),
        }
    }

    /// Level definition used by list `num_id` at `level`
    pub fn list_level(&mut self, num_id: u32, level: u8) -> Result<Level> {
        self.numbering()?.resolve(num_id, level).cloned()
    }

    /// Start a new list, returning its numId
    pub fn add_list(&mut self, kind: ListKind) -> Result<u32> {
        let uri = self.ensure_part(
            rel_types::NUMBERING,
            &well_known::numbering(),
            content_types::NUMBERING,
            resources::blank_numbering_template,
        )?;
        let mut abstract_num = resources::default_numbering_template(kind)?;

        let root = &mut self.cache.tree_mut(&self.package, &uri)?.root;
        let abstract_id = ids::next_id(root, CounterKind::AbstractNumbering)?;
        let num_id = ids::next_id(root, CounterKind::Numbering)?;

        abstract_num.set_attr("w:abstractNumId", abstract_id.to_string());
        let at = numbering::insertion_index(root, "w:abstractNum");
        root.children.insert(at, RawXmlNode::Element(abstract_num));

        let num = RawXmlElement::new("w:num")
            .with_attr("w:numId", num_id.to_string())
            .with_child(
                RawXmlElement::new("w:abstractNumId").with_attr("w:val", abstract_id.to_string()),
            );
        let at = numbering::insertion_index(root, "w:num");
        root.children.insert(at, RawXmlNode::Element(num));

        log::debug!(
            "added {:?} list: numId {} -> abstractNumId {}",
            kind,
            num_id,
            abstract_id
        );
        Ok(num_id)
    }

    /// Append a list item paragraph, returning its index.
    ///
    /// Fails with [`Error::Format`] when `(num_id, level)` does not resolve.
    pub fn insert_list_item(&mut self, text: &str, num_id: u32, level: u8) -> Result<usize> {
        self.list_level(num_id, level)?;

        let mut paragraph = Paragraph::new(text);
        if self.style_ids()?.iter().any(|id| id == LIST_PARAGRAPH_STYLE) {
            paragraph.set_style(LIST_PARAGRAPH_STYLE);
        }
        paragraph.set_numbering(num_id, u32::from(level));
        self.push_paragraph(&paragraph)
    }

    /// Part of `rel_type` related from the main document, created from
    /// `template` at (a free variant of) `uri` when missing
    pub(crate) fn ensure_part(
        &mut self,
        rel_type: &str,
        uri: &PartUri,
        content_type: &str,
        template: impl FnOnce() -> Result<XmlTree>,
    ) -> Result<PartUri> {
        if let Some(existing) = self
            .package
            .related_part(&self.main, rel_type)
            .filter(|u| self.package.contains(u))
        {
            return Ok(existing);
        }

        let uri = self.package.unique_part_uri(uri);
        let tree = template()?;
        self.add_related_part(rel_type, &uri, content_type, tree)?;
        Ok(uri)
    }

    /// Add a part built from `tree`, related from the main document
    pub(crate) fn add_related_part(
        &mut self,
        rel_type: &str,
        uri: &PartUri,
        content_type: &str,
        tree: XmlTree,
    ) -> Result<()> {
        self.package
            .add_part(Part::new(uri.clone(), content_type, tree.to_bytes()?));
        let target = uri.relative_to(&self.main);
        self.package
            .part_relationships_mut(&self.main)?
            .add(rel_type, &target);
        self.cache.insert(uri.clone(), tree);
        log::debug!("created part {}", uri);
        Ok(())
    }

    // === Read accessors ===

    /// Style ids defined by the styles part
    pub fn style_ids(&mut self) -> Result<Vec<String>> {
        match self.styles_uri() {
            Some(uri) => styles::style_ids(&self.cache.tree(&self.package, &uri)?.root),
            None => Ok(Vec::new()),
        }
    }

    /// Image parts reachable from the package relationships
    pub fn image_parts(&self) -> Vec<PartUri> {
        self.package
            .reachable_parts()
            .into_iter()
            .filter(|uri| {
                self.package
                    .part(uri)
                    .is_some_and(|p| p.content_type().starts_with("image/"))
            })
            .collect()
    }

    /// Parsed tree of any XML part
    pub fn part_tree(&mut self, uri: &PartUri) -> Result<&XmlTree> {
        self.cache.tree(&self.package, uri)
    }

    /// URI of the main document part
    pub fn main_document_uri(&self) -> &PartUri {
        &self.main
    }

    /// Get the underlying package. Pending edits reach it on save.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// A part's tree, cloned from the cache when parsed, else parsed fresh
    pub(crate) fn load_tree(&self, uri: &PartUri) -> Result<XmlTree> {
        if let Some(tree) = self.cache.get(uri) {
            return Ok(tree.clone());
        }
        let part = self
            .package
            .part(uri)
            .ok_or_else(|| Error::PartNotFound(uri.to_string()))?;
        XmlTree::parse(part.data())
    }

    /// A part's current bytes, including unsaved edits
    pub(crate) fn part_bytes(&self, uri: &PartUri) -> Result<Vec<u8>> {
        match self.cache.get(uri) {
            Some(tree) if self.cache.is_dirty(uri) => tree.to_bytes(),
            _ => self
                .package
                .part(uri)
                .map(|p| p.data().to_vec())
                .ok_or_else(|| Error::PartNotFound(uri.to_string())),
        }
    }

    // === Merge ===

    /// Insert the content of `foreign` at the end (or start) of this document.
    ///
    /// Styles, numbering, notes, fonts, images and other related parts come
    /// along with the body, renumbered so nothing collides with this
    /// document's identifiers. On error this document is left unchanged.
    pub fn insert_document(&mut self, foreign: &Document, position: MergePosition) -> Result<()> {
        let mut merged = self.clone();
        merge::merge_into(&mut merged, foreign, position)?;
        *self = merged;
        Ok(())
    }
}
