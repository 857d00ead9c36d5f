//! Image parts: stored once per distinct content

use super::Merger;
use crate::error::Result;
use crate::opc::{Package, Part, PartUri};
use crate::xml::RawXmlElement;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Image parts of a package, by SHA-256 of their bytes
#[derive(Debug, Default)]
pub(super) struct ImageIndex {
    by_digest: BTreeMap<Vec<u8>, Vec<PartUri>>,
}

impl ImageIndex {
    /// Index every image part reachable from the package relationships
    pub(super) fn build(package: &Package) -> Self {
        let mut index = Self::default();
        for uri in package.reachable_parts() {
            if let Some(part) = package.part(&uri).filter(|p| is_image(p.content_type())) {
                index.insert(uri, part.data());
            }
        }
        index
    }

    pub(super) fn insert(&mut self, uri: PartUri, data: &[u8]) {
        self.by_digest.entry(digest(data)).or_default().push(uri);
    }

    /// A part with exactly these bytes; the digest only narrows the search
    pub(super) fn find(&self, package: &Package, data: &[u8]) -> Option<PartUri> {
        self.by_digest
            .get(&digest(data))?
            .iter()
            .find(|uri| package.part(uri).is_some_and(|p| p.data() == data))
            .cloned()
    }
}

fn digest(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

impl Merger<'_> {
    /// Host part holding the foreign image's bytes, copied under
    /// `/word/media/` only when no host image has the same content
    pub(super) fn import_image(&mut self, foreign_uri: &PartUri) -> Result<PartUri> {
        if let Some(done) = self.copied.get(foreign_uri) {
            return Ok(done.clone());
        }

        let data = self.foreign.part_bytes(foreign_uri)?;
        if let Some(existing) = self.images.find(&self.host.package, &data) {
            log::debug!("image {} already stored as {}", foreign_uri, existing);
            self.copied.insert(foreign_uri.clone(), existing.clone());
            return Ok(existing);
        }

        let base = PartUri::new(&format!("/word/media/{}", foreign_uri.file_name()))?;
        let uri = self.host.package.unique_part_uri(&base);
        let content_type = self
            .foreign
            .package
            .part(foreign_uri)
            .map(|p| p.content_type().to_string())
            .unwrap_or_default();

        self.host
            .package
            .add_part(Part::new(uri.clone(), content_type, data.clone()));
        self.images.insert(uri.clone(), &data);
        self.copied.insert(foreign_uri.clone(), uri.clone());

        log::debug!("image {} stored as {}", foreign_uri, uri);
        Ok(uri)
    }
}

/// Point image references (a:blip r:embed / r:link, v:imagedata r:id)
/// carrying `old` at `new`, returning how many changed
pub(super) fn rewrite_image_references(root: &mut RawXmlElement, old: &str, new: &str) -> usize {
    let mut count = 0;
    root.visit_mut(&mut |element| {
        let attrs: &[&str] = match element.local_name() {
            "blip" => &["r:embed", "r:link"],
            "imagedata" => &["r:id"],
            _ => return,
        };
        for attr in attrs {
            if element.attr(attr) == Some(old) {
                element.set_attr(attr, new);
                count += 1;
            }
        }
    });
    count
}
