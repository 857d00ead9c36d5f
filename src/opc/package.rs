//! OPC Package implementation
//!
//! Handles reading and writing DOCX files as ZIP packages

use crate::error::{Error, Result};
use crate::opc::content_types;
use crate::opc::relationships::rel_types;
use crate::opc::{ContentTypes, Part, PartUri, Relationship, Relationships};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
const PACKAGE_RELS_PATH: &str = "_rels/.rels";

/// An OPC package (ZIP-based container for DOCX, XLSX, PPTX, etc.)
#[derive(Clone, Debug)]
pub struct Package {
    /// All parts in the package, ordered by URI
    parts: BTreeMap<PartUri, Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Create a new empty package
    pub fn new() -> Self {
        Self {
            parts: BTreeMap::new(),
            relationships: Relationships::new(),
            content_types: ContentTypes::new(),
        }
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        Self::from_reader(cursor)
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        package.content_types = Self::read_content_types(&mut archive)?;
        package.relationships = Self::read_package_rels(&mut archive)?;
        package.read_parts(&mut archive)?;
        package.read_part_relationships(&mut archive)?;

        log::debug!(
            "opened package with {} parts, {} package relationships",
            package.parts.len(),
            package.relationships.len()
        );

        Ok(package)
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let cursor = Cursor::new(&mut buf);
        self.write_to(cursor)?;
        Ok(buf)
    }

    /// Write the package to a writer.
    ///
    /// Entry order is stable: content types, package relationships, then
    /// every part in URI order followed by its relationships.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_PATH, options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(PACKAGE_RELS_PATH, options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for (uri, part) in &self.parts {
            zip.start_file(uri.zip_path(), options)?;
            zip.write_all(part.data())?;

            if let Some(rels) = part.relationships() {
                if !rels.is_empty() {
                    zip.start_file(uri.relationships_uri().zip_path(), options)?;
                    rels.write_to(&mut zip)?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.get(uri)
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        self.parts.get_mut(uri)
    }

    /// Check whether a part exists
    pub fn contains(&self, uri: &PartUri) -> bool {
        self.parts.contains_key(uri)
    }

    /// Add a part to the package, registering its content type
    pub fn add_part(&mut self, part: Part) {
        let uri = part.uri().clone();
        self.content_types.register(&uri, part.content_type());
        self.parts.insert(uri, part);
    }

    /// Get all parts
    pub fn parts(&self) -> impl Iterator<Item = (&PartUri, &Part)> {
        self.parts.iter()
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get mutable package-level relationships
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Relationships owned by a part (None when it has none or does not exist)
    pub fn part_relationships(&self, uri: &PartUri) -> Option<&Relationships> {
        self.parts.get(uri).and_then(|p| p.relationships())
    }

    /// Relationships owned by a part, created empty if needed
    pub fn part_relationships_mut(&mut self, uri: &PartUri) -> Result<&mut Relationships> {
        self.parts
            .get_mut(uri)
            .map(|p| p.ensure_relationships())
            .ok_or_else(|| Error::PartNotFound(uri.to_string()))
    }

    /// URI of the main document part.
    ///
    /// Follows the package `officeDocument` relationship; falls back to the
    /// first part whose content type is a main document.
    pub fn main_document_uri(&self) -> Result<PartUri> {
        if let Some(rel) = self.relationships.by_type(rel_types::OFFICE_DOCUMENT) {
            let uri = PartUri::resolve_from_root(&rel.target)?;
            if self.parts.contains_key(&uri) {
                return Ok(uri);
            }
        }

        self.parts
            .iter()
            .find(|(_, p)| content_types::is_main_document(p.content_type()))
            .map(|(uri, _)| uri.clone())
            .ok_or_else(|| Error::MissingPart("main document".into()))
    }

    /// Resolve an internal relationship of `source` to a part URI
    pub fn relationship_target(&self, source: &PartUri, rel: &Relationship) -> Result<PartUri> {
        if rel.is_external() {
            return Err(Error::InvalidRelationship(format!(
                "{} is external: {}",
                rel.id, rel.target
            )));
        }
        source.resolve(&rel.target)
    }

    /// First part of `rel_type` related from `source`
    pub fn related_part(&self, source: &PartUri, rel_type: &str) -> Option<PartUri> {
        let rel = self.part_relationships(source)?.by_type(rel_type)?;
        self.relationship_target(source, rel).ok()
    }

    /// `base` if free, else `base` with `_1`, `_2`, ... appended to its stem
    pub fn unique_part_uri(&self, base: &PartUri) -> PartUri {
        if !self.parts.contains_key(base) {
            return base.clone();
        }
        (1..)
            .map(|n| base.with_stem_suffix(&format!("_{}", n)))
            .find(|candidate| !self.parts.contains_key(candidate))
            .unwrap_or_else(|| base.clone())
    }

    /// Every part reachable from the package relationships
    pub fn reachable_parts(&self) -> BTreeSet<PartUri> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<PartUri> = self
            .relationships
            .iter()
            .filter(|r| !r.is_external())
            .filter_map(|r| PartUri::resolve_from_root(&r.target).ok())
            .collect();

        while let Some(uri) = queue.pop_front() {
            if !self.parts.contains_key(&uri) || !seen.insert(uri.clone()) {
                continue;
            }
            if let Some(rels) = self.part_relationships(&uri) {
                for rel in rels.iter().filter(|r| !r.is_external()) {
                    if let Ok(target) = uri.resolve(&rel.target) {
                        queue.push_back(target);
                    }
                }
            }
        }

        seen
    }

    // === Private methods ===

    fn read_content_types<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<ContentTypes> {
        let mut file = archive
            .by_name(CONTENT_TYPES_PATH)
            .map_err(|_| Error::MissingPart(CONTENT_TYPES_PATH.into()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        ContentTypes::from_xml(&content)
    }

    fn read_package_rels<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Relationships> {
        match archive.by_name(PACKAGE_RELS_PATH) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                Relationships::from_xml(&content)
            }
            Err(_) => Ok(Relationships::new()),
        }
    }

    fn read_parts<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') || name == CONTENT_TYPES_PATH {
                continue;
            }

            let uri = PartUri::new(&name)?;
            if uri.is_relationships() {
                continue;
            }

            let content_type = self
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            self.parts
                .insert(uri.clone(), Part::new(uri, content_type, data));
        }

        Ok(())
    }

    fn read_part_relationships<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
    ) -> Result<()> {
        for (uri, part) in self.parts.iter_mut() {
            if let Ok(mut file) = archive.by_name(uri.relationships_uri().zip_path()) {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                part.set_relationships(Relationships::from_xml(&content)?);
            }
        }

        Ok(())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}
