//! Importing one document into another
//!
//! A merge runs in two phases. The first rewrites a private copy of the
//! foreign content against the host's identifiers: style ids, numbering
//! ids, note ids, drawing and bookmark ids. The second copies related parts
//! and relationships into the host and splices the foreign body in.
//!
//! Nothing in the foreign document is modified.

mod body;
mod fonts;
mod images;
mod notes;
mod numbering;
mod properties;
mod relationships;
mod styles;

pub use notes::NoteKind;

use crate::document::Document;
use crate::error::Result;
use crate::ids::{self, CounterKind};
use crate::opc::{content_types, rel_types, PartUri};
use crate::xml::{RawXmlElement, RawXmlNode, XmlTree};
use images::ImageIndex;
use numbering::NumberingPlan;
use std::collections::BTreeMap;

/// Where the foreign body lands in the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePosition {
    /// After the host's last block, before its final section properties
    #[default]
    Append,
    /// Before the host's first block
    Prepend,
}

/// Foreign nodes headed for one host part.
///
/// Relationship ids inside `nodes` belong to `foreign_owner` until
/// [`Merger::remap_relationships`] rewrites them for `host_owner`.
struct Transplant {
    foreign_owner: PartUri,
    host_owner: PartUri,
    /// Attributes of the foreign part's root, namespace declarations mostly
    root_attributes: Vec<(String, String)>,
    nodes: Vec<RawXmlElement>,
}

/// Numbering and style id translations applied to foreign content
#[derive(Debug, Default)]
struct IdMaps {
    styles: BTreeMap<String, String>,
    numbering: BTreeMap<u32, u32>,
}

impl IdMaps {
    fn apply(&self, root: &mut RawXmlElement) -> Result<()> {
        styles::rewrite_references(root, &self.styles, styles::REFERENCE_ELEMENTS);
        numbering::rewrite_references(root, &self.numbering)
    }
}

/// Merge `foreign` into `host` at `position`
pub fn merge_into(host: &mut Document, foreign: &Document, position: MergePosition) -> Result<()> {
    let images = ImageIndex::build(&host.package);
    Merger {
        host,
        foreign,
        copied: BTreeMap::new(),
        images,
        maps: IdMaps::default(),
    }
    .run(position)
}

pub(crate) struct Merger<'a> {
    host: &'a mut Document,
    foreign: &'a Document,
    /// Foreign part -> the host part it was copied to
    copied: BTreeMap<PartUri, PartUri>,
    images: ImageIndex,
    /// Set once definitions are merged; applied to copied headers and footers
    maps: IdMaps,
}

impl Merger<'_> {
    fn run(mut self, position: MergePosition) -> Result<()> {
        let foreign_main = self.foreign.main.clone();
        let host_main = self.host.main.clone();
        log::debug!("merging {} into {}", foreign_main, host_main);

        // Phase one: foreign content against host ids
        let mut document = self.foreign.load_tree(&foreign_main)?;
        let maps = self.merge_definitions()?;
        maps.apply(&mut document.root)?;

        let mut transplants = Vec::new();
        for kind in [NoteKind::Footnote, NoteKind::Endnote] {
            let (note_map, transplant) = self.merge_notes(kind, &maps)?;
            notes::rewrite_references(&mut document.root, kind, &note_map);
            transplants.extend(transplant);
        }
        transplants.extend(self.merge_fonts()?);
        self.shift_object_ids(&mut document.root, &mut transplants)?;
        self.maps = maps;

        // Phase two: parts, relationships and the body itself
        for transplant in &mut transplants {
            self.remap_relationships(transplant)?;
            let host_root = &mut self
                .host
                .cache
                .tree_mut(&self.host.package, &transplant.host_owner)?
                .root;
            body::copy_root_attributes(host_root, &transplant.root_attributes);
            host_root
                .children
                .extend(transplant.nodes.drain(..).map(RawXmlNode::Element));
        }

        self.merge_custom_properties()?;

        let mut body = Transplant {
            foreign_owner: foreign_main,
            host_owner: host_main.clone(),
            root_attributes: document.root.attributes.clone(),
            nodes: body::take_blocks(&mut document.root)?,
        };
        self.remap_relationships(&mut body)?;

        let host_root = &mut self.host.cache.tree_mut(&self.host.package, &host_main)?.root;
        let copied = body::copy_root_attributes(host_root, &body.root_attributes);
        log::debug!(
            "splicing {} blocks ({:?}), {} root attributes copied",
            body.nodes.len(),
            position,
            copied
        );
        body::splice(host_root, body.nodes, position)
    }

    /// Styles and numbering: merged into the host parts, or adopted whole
    /// when the host has none
    fn merge_definitions(&mut self) -> Result<IdMaps> {
        let mut maps = IdMaps::default();

        let foreign_numbering = self.foreign_part(rel_types::NUMBERING);
        let host_numbering = self.host_part(rel_types::NUMBERING);
        let numbering_tree = foreign_numbering
            .as_ref()
            .map(|uri| self.foreign.load_tree(uri))
            .transpose()?;

        let plan = match (&host_numbering, &numbering_tree) {
            (Some(host_uri), Some(tree)) => {
                let host_root = &self.host.cache.tree(&self.host.package, host_uri)?.root;
                let plan = NumberingPlan::new(host_root, &tree.root)?;
                maps.numbering = plan.num_map.clone();
                Some(plan)
            }
            (None, Some(tree)) => {
                maps.numbering = numbering::identity_map(&tree.root)?;
                None
            }
            _ => None,
        };

        if let Some(foreign_uri) = self.foreign_part(rel_types::STYLES) {
            let mut tree = self.foreign.load_tree(&foreign_uri)?;
            match self.host_part(rel_types::STYLES) {
                Some(host_uri) => {
                    let host_root = &mut self
                        .host
                        .cache
                        .tree_mut(&self.host.package, &host_uri)?
                        .root;
                    maps.styles = styles::merge(host_root, &tree.root, &maps.numbering)?;
                }
                None => {
                    numbering::rewrite_references(&mut tree.root, &maps.numbering)?;
                    self.adopt_part(&foreign_uri, rel_types::STYLES, tree)?;
                }
            }
        }

        if let (Some(foreign_uri), Some(mut tree)) = (foreign_numbering, numbering_tree) {
            match (host_numbering, plan) {
                (Some(host_uri), Some(plan)) => {
                    let host_root = &mut self
                        .host
                        .cache
                        .tree_mut(&self.host.package, &host_uri)?
                        .root;
                    plan.apply(host_root, &maps.styles);
                }
                _ => {
                    styles::rewrite_references(
                        &mut tree.root,
                        &maps.styles,
                        styles::NUMBERING_ELEMENTS,
                    );
                    self.adopt_part(&foreign_uri, rel_types::NUMBERING, tree)?;
                }
            }
        }

        Ok(maps)
    }

    /// Footnotes or endnotes: foreign notes renumbered above the host's and
    /// queued for the host notes part, or the whole part adopted
    fn merge_notes(
        &mut self,
        kind: NoteKind,
        maps: &IdMaps,
    ) -> Result<(BTreeMap<i64, i64>, Option<Transplant>)> {
        let Some(foreign_uri) = self.foreign_part(kind.rel_type()) else {
            return Ok((BTreeMap::new(), None));
        };
        let mut tree = self.foreign.load_tree(&foreign_uri)?;

        let Some(host_uri) = self.host_part(kind.rel_type()) else {
            maps.apply(&mut tree.root)?;
            self.adopt_part(&foreign_uri, kind.rel_type(), tree)?;
            return Ok((BTreeMap::new(), None));
        };

        let host_root = &self.host.cache.tree(&self.host.package, &host_uri)?.root;
        let (note_map, mut nodes) = notes::renumber(host_root, &tree.root, kind)?;
        for node in &mut nodes {
            maps.apply(node)?;
        }
        log::debug!("{} {:?}s queued for {}", nodes.len(), kind, host_uri);

        Ok((
            note_map,
            Some(Transplant {
                foreign_owner: foreign_uri,
                host_owner: host_uri,
                root_attributes: tree.root.attributes,
                nodes,
            }),
        ))
    }

    /// Font declarations missing from the host, or the whole font table
    fn merge_fonts(&mut self) -> Result<Option<Transplant>> {
        let Some(foreign_uri) = self.foreign_part(rel_types::FONT_TABLE) else {
            return Ok(None);
        };
        let tree = self.foreign.load_tree(&foreign_uri)?;

        let Some(host_uri) = self.host_part(rel_types::FONT_TABLE) else {
            self.adopt_part(&foreign_uri, rel_types::FONT_TABLE, tree)?;
            return Ok(None);
        };

        let host_root = &self.host.cache.tree(&self.host.package, &host_uri)?.root;
        let nodes = fonts::missing_fonts(host_root, &tree.root);
        if nodes.is_empty() {
            return Ok(None);
        }
        log::debug!("{} fonts added to {}", nodes.len(), host_uri);

        Ok(Some(Transplant {
            foreign_owner: foreign_uri,
            host_owner: host_uri,
            root_attributes: tree.root.attributes,
            nodes,
        }))
    }

    /// Drawing and bookmark ids of everything headed for the host, moved
    /// above the largest the host uses in any story part
    fn shift_object_ids(
        &mut self,
        document: &mut RawXmlElement,
        transplants: &mut [Transplant],
    ) -> Result<()> {
        let mut next_drawing = CounterKind::Drawing.floor();
        let mut next_bookmark = CounterKind::Bookmark.floor();
        for uri in self.host.story_parts() {
            let root = &self.host.cache.tree(&self.host.package, &uri)?.root;
            next_drawing = next_drawing.max(ids::next_id(root, CounterKind::Drawing)?);
            next_bookmark = next_bookmark.max(ids::next_id(root, CounterKind::Bookmark)?);
        }
        log::debug!(
            "foreign drawings numbered from {}, bookmarks from {}",
            next_drawing,
            next_bookmark
        );

        let mut bookmarks = BTreeMap::new();
        let nodes = transplants.iter_mut().flat_map(|t| t.nodes.iter_mut());
        for root in std::iter::once(document).chain(nodes) {
            body::shift_drawing_ids(root, &mut next_drawing);
            body::shift_bookmark_ids(root, &mut next_bookmark, &mut bookmarks);
        }
        Ok(())
    }

    /// Custom document properties the host lacks, by name
    fn merge_custom_properties(&mut self) -> Result<()> {
        let Some(foreign_uri) = properties::custom_properties_part(&self.foreign.package) else {
            return Ok(());
        };
        let foreign_root = self.foreign.load_tree(&foreign_uri)?.root;

        match properties::custom_properties_part(&self.host.package) {
            Some(host_uri) => {
                let host_root = &mut self.host.cache.tree_mut(&self.host.package, &host_uri)?.root;
                let added = properties::merge(host_root, &foreign_root)?;
                log::debug!("{} custom properties added", added);
            }
            None => {
                let uri = self.copy_part(&foreign_uri)?;
                self.host
                    .package
                    .relationships_mut()
                    .add(rel_types::CUSTOM_PROPERTIES, uri.zip_path());
            }
        }
        Ok(())
    }

    /// A foreign part related from the foreign main document
    fn foreign_part(&self, rel_type: &str) -> Option<PartUri> {
        let foreign = self.foreign;
        foreign
            .package
            .related_part(&foreign.main, rel_type)
            .filter(|uri| foreign.package.contains(uri))
    }

    /// A host part related from the host main document
    fn host_part(&self, rel_type: &str) -> Option<PartUri> {
        self.host
            .package
            .related_part(&self.host.main, rel_type)
            .filter(|uri| self.host.package.contains(uri))
    }

    /// Install a rewritten copy of a foreign part the host lacks, linked from
    /// the host main document
    fn adopt_part(
        &mut self,
        foreign_uri: &PartUri,
        rel_type: &str,
        tree: XmlTree,
    ) -> Result<PartUri> {
        let content_type = self
            .foreign
            .package
            .part(foreign_uri)
            .map_or(content_types::XML, |p| p.content_type())
            .to_string();
        let uri = self.host.package.unique_part_uri(foreign_uri);

        self.copied.insert(foreign_uri.clone(), uri.clone());
        self.host.add_related_part(rel_type, &uri, &content_type, tree)?;
        self.copy_relationships(foreign_uri, &uri)?;

        log::debug!("adopted {} as {}", foreign_uri, uri);
        Ok(uri)
    }
}
