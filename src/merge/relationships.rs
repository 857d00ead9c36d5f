//! Carrying relationships, and the parts they point at, across packages

use super::{images, Merger, Transplant};
use crate::error::Result;
use crate::opc::{
    content_types, numeric_rel_id, rel_types, Part, PartUri, Relationship, TargetMode,
};
use crate::xml::{RawXmlElement, XmlTree};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of attributes holding relationship ids (r:id, r:embed, r:link, ...)
const RELATIONSHIP_ATTR_PREFIX: &str = "r:";

impl Merger<'_> {
    /// Give every relationship referenced from the transplant's nodes a
    /// counterpart in the host owner part, and point the nodes at it
    pub(super) fn remap_relationships(&mut self, transplant: &mut Transplant) -> Result<()> {
        let referenced = referenced_ids(&transplant.nodes);
        if referenced.is_empty() {
            return Ok(());
        }

        let foreign_rels = self
            .foreign
            .package
            .part_relationships(&transplant.foreign_owner)
            .cloned()
            .unwrap_or_default();

        let mut map = BTreeMap::new();
        for id in referenced {
            let Some(rel) = foreign_rels.get(&id) else {
                log::warn!(
                    "{} references missing relationship {}",
                    transplant.foreign_owner,
                    id
                );
                continue;
            };

            let new_id = self.import_relationship(
                &transplant.foreign_owner,
                &transplant.host_owner,
                rel,
            )?;

            // Ids that are not Word's own rId<n> are also rewritten in the host
            // part's existing image references.
            if rel.rel_type == rel_types::IMAGE && numeric_rel_id(&id).is_none() && new_id != id {
                let host_root = &mut self
                    .host
                    .cache
                    .tree_mut(&self.host.package, &transplant.host_owner)?
                    .root;
                let rewritten = images::rewrite_image_references(host_root, &id, &new_id);
                log::debug!(
                    "image relationship {} -> {} also rewritten in {} host references",
                    id,
                    new_id,
                    rewritten
                );
            }

            map.insert(id, new_id);
        }

        for node in &mut transplant.nodes {
            rewrite_ids(node, &map);
        }
        Ok(())
    }

    /// Host relationship id, owned by `host_owner`, equivalent to `rel`
    fn import_relationship(
        &mut self,
        foreign_owner: &PartUri,
        host_owner: &PartUri,
        rel: &Relationship,
    ) -> Result<String> {
        if rel.is_external() {
            let rels = self.host.package.part_relationships_mut(host_owner)?;
            return Ok(rels.add_external(&rel.rel_type, &rel.target));
        }

        let target = foreign_owner.resolve(&rel.target)?;
        if !self.foreign.package.contains(&target) {
            log::warn!(
                "relationship {} of {} points at missing part {}",
                rel.id,
                foreign_owner,
                target
            );
            let rels = self.host.package.part_relationships_mut(host_owner)?;
            return Ok(rels.add(&rel.rel_type, &rel.target));
        }

        let host_target = self.import_part(&target, &rel.rel_type)?;
        self.relationship_to(host_owner, &rel.rel_type, &host_target)
    }

    /// Host counterpart of a foreign part: the host main document for the
    /// foreign one, a deduplicated image, or a deep copy
    fn import_part(&mut self, foreign_uri: &PartUri, rel_type: &str) -> Result<PartUri> {
        if *foreign_uri == self.foreign.main {
            return Ok(self.host.main.clone());
        }
        if rel_type == rel_types::IMAGE {
            return self.import_image(foreign_uri);
        }
        self.copy_part(foreign_uri)
    }

    /// Id of a relationship of `rel_type` from `owner` to `target`, added
    /// when the owner has none
    fn relationship_to(
        &mut self,
        owner: &PartUri,
        rel_type: &str,
        target: &PartUri,
    ) -> Result<String> {
        let rels = self.host.package.part_relationships_mut(owner)?;
        let existing = rels
            .iter()
            .filter(|r| !r.is_external() && r.rel_type == rel_type)
            .find(|r| owner.resolve(&r.target).is_ok_and(|t| t == *target))
            .map(|r| r.id.clone());

        Ok(match existing {
            Some(id) => id,
            None => rels.add(rel_type, &target.relative_to(owner)),
        })
    }

    /// Copy a foreign part and, recursively, everything it relates to.
    ///
    /// Each foreign part is copied at most once per merge.
    pub(super) fn copy_part(&mut self, foreign_uri: &PartUri) -> Result<PartUri> {
        if let Some(done) = self.copied.get(foreign_uri) {
            return Ok(done.clone());
        }

        let content_type = self
            .foreign
            .package
            .part(foreign_uri)
            .map(|p| p.content_type().to_string())
            .unwrap_or_default();
        let mut data = self.foreign.part_bytes(foreign_uri)?;
        if is_header_or_footer(&content_type) {
            let mut tree = XmlTree::parse(&data)?;
            self.maps.apply(&mut tree.root)?;
            data = tree.to_bytes()?;
        }
        let uri = self.host.package.unique_part_uri(foreign_uri);

        self.copied.insert(foreign_uri.clone(), uri.clone());
        self.host
            .package
            .add_part(Part::new(uri.clone(), content_type, data));
        self.copy_relationships(foreign_uri, &uri)?;

        log::debug!("copied {} to {}", foreign_uri, uri);
        Ok(uri)
    }

    /// Recreate the relationships of a foreign part on its fresh host copy,
    /// keeping their ids
    pub(super) fn copy_relationships(
        &mut self,
        foreign_uri: &PartUri,
        host_uri: &PartUri,
    ) -> Result<()> {
        let foreign = self.foreign;
        let Some(rels) = foreign.package.part_relationships(foreign_uri) else {
            return Ok(());
        };

        for rel in rels.iter() {
            let (target, mode) = if rel.is_external() {
                (rel.target.clone(), TargetMode::External)
            } else {
                let foreign_target = foreign_uri.resolve(&rel.target)?;
                if foreign.package.contains(&foreign_target) {
                    let host_target = self.import_part(&foreign_target, &rel.rel_type)?;
                    (host_target.relative_to(host_uri), TargetMode::Internal)
                } else {
                    log::warn!(
                        "relationship {} of {} points at missing part {}",
                        rel.id,
                        foreign_uri,
                        foreign_target
                    );
                    (rel.target.clone(), TargetMode::Internal)
                }
            };

            self.host
                .package
                .part_relationships_mut(host_uri)?
                .add_with_id(&rel.id, &rel.rel_type, &target, mode);
        }
        Ok(())
    }
}

fn is_header_or_footer(content_type: &str) -> bool {
    content_type == content_types::HEADER || content_type == content_types::FOOTER
}

/// Relationship ids referenced anywhere under `nodes`
fn referenced_ids(nodes: &[RawXmlElement]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for node in nodes {
        node.visit(&mut |element| {
            for (key, value) in &element.attributes {
                if key.starts_with(RELATIONSHIP_ATTR_PREFIX) {
                    ids.insert(value.clone());
                }
            }
        });
    }
    ids
}

/// Point relationship-id attributes at their new ids
fn rewrite_ids(root: &mut RawXmlElement, map: &BTreeMap<String, String>) {
    root.visit_mut(&mut |element| {
        for (key, value) in element.attributes.iter_mut() {
            if key.starts_with(RELATIONSHIP_ATTR_PREFIX) {
                if let Some(new) = map.get(value.as_str()) {
                    *value = new.clone();
                }
            }
        }
    });
}
