//! Parsed-part cache
//!
//! XML parts are parsed on first access and kept until the document is
//! dropped. A part is serialized back into the package only when it was
//! handed out mutably.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::opc::{Package, PartUri};
use crate::xml::XmlTree;

#[derive(Clone, Debug)]
struct CachedPart {
    tree: XmlTree,
    dirty: bool,
}

/// Owner of every parsed part tree of one package
#[derive(Clone, Debug, Default)]
pub struct PartCache {
    entries: BTreeMap<PartUri, CachedPart>,
}

impl PartCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn load<'a>(&'a mut self, package: &Package, uri: &PartUri) -> Result<&'a mut CachedPart> {
        if !self.entries.contains_key(uri) {
            let part = package
                .part(uri)
                .ok_or_else(|| Error::PartNotFound(uri.to_string()))?;
            log::trace!("parsing part {}", uri);
            let tree = XmlTree::parse(part.data())?;
            self.entries
                .insert(uri.clone(), CachedPart { tree, dirty: false });
        }
        self.entries
            .get_mut(uri)
            .ok_or_else(|| Error::PartNotFound(uri.to_string()))
    }

    /// Parsed tree of a part, loading it on first access
    pub fn tree<'a>(&'a mut self, package: &Package, uri: &PartUri) -> Result<&'a XmlTree> {
        Ok(&self.load(package, uri)?.tree)
    }

    /// Already-parsed tree of a part, without loading
    pub fn get(&self, uri: &PartUri) -> Option<&XmlTree> {
        self.entries.get(uri).map(|e| &e.tree)
    }

    /// Parsed tree of a part for mutation; the part is written back on flush
    pub fn tree_mut<'a>(
        &'a mut self,
        package: &Package,
        uri: &PartUri,
    ) -> Result<&'a mut XmlTree> {
        let entry = self.load(package, uri)?;
        entry.dirty = true;
        Ok(&mut entry.tree)
    }

    /// Install a freshly built tree (marked dirty)
    pub fn insert(&mut self, uri: PartUri, tree: XmlTree) {
        self.entries.insert(uri, CachedPart { tree, dirty: true });
    }

    /// Whether a part has been parsed
    pub fn contains(&self, uri: &PartUri) -> bool {
        self.entries.contains_key(uri)
    }

    /// Whether a cached part has pending changes
    pub fn is_dirty(&self, uri: &PartUri) -> bool {
        self.entries.get(uri).is_some_and(|e| e.dirty)
    }

    /// Forget a cached tree, discarding pending changes
    pub fn remove(&mut self, uri: &PartUri) -> Option<XmlTree> {
        self.entries.remove(uri).map(|e| e.tree)
    }

    /// Serialize dirty trees into their parts
    pub fn flush(&mut self, package: &mut Package) -> Result<()> {
        for (uri, entry) in self.entries.iter_mut().filter(|(_, e)| e.dirty) {
            let part = package
                .part_mut(uri)
                .ok_or_else(|| Error::PartNotFound(uri.to_string()))?;
            log::trace!("writing back part {}", uri);
            part.set_data(entry.tree.to_bytes()?);
            entry.dirty = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::Part;

    fn package() -> (Package, PartUri) {
        let uri = PartUri::new("/word/styles.xml").unwrap();
        let mut package = Package::new();
        package.add_part(Part::new(
            uri.clone(),
            crate::opc::content_types::STYLES,
            br#"<w:styles><w:style w:styleId="Normal"/></w:styles>"#.to_vec(),
        ));
        (package, uri)
    }

    #[test]
    fn test_lazy_load_and_clean_flush() {
        let (mut package, uri) = package();
        let mut cache = PartCache::new();
        assert!(!cache.contains(&uri));

        assert!(cache.get(&uri).is_none());
        let tree = cache.tree(&package, &uri).unwrap();
        assert_eq!(tree.root.name, "w:styles");
        assert!(cache.get(&uri).is_some());
        assert!(!cache.is_dirty(&uri));

        let before = package.part(&uri).unwrap().data().to_vec();
        cache.flush(&mut package).unwrap();
        assert_eq!(package.part(&uri).unwrap().data(), before.as_slice());
    }

    #[test]
    fn test_mutation_is_written_back() {
        let (mut package, uri) = package();
        let mut cache = PartCache::new();

        cache
            .tree_mut(&package, &uri)
            .unwrap()
            .root
            .set_attr("xmlns:w", crate::xml::W);
        assert!(cache.is_dirty(&uri));

        cache.flush(&mut package).unwrap();
        assert!(!cache.is_dirty(&uri));
        let data = std::str::from_utf8(package.part(&uri).unwrap().data()).unwrap();
        assert!(data.starts_with("<?xml"));
        assert!(data.contains("xmlns:w="));
    }

    #[test]
    fn test_missing_part() {
        let (package, _) = package();
        let mut cache = PartCache::new();
        let missing = PartUri::new("/word/numbering.xml").unwrap();
        assert!(matches!(
            cache.tree(&package, &missing),
            Err(Error::PartNotFound(_))
        ));
    }
}
