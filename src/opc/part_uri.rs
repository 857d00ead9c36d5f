//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// Represents a URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'.
/// Example: `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri from a string.
    ///
    /// The path will be normalized (leading '/' ensured, no trailing '/').
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.is_empty() || normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': empty or contains double slashes",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    /// Create PartUri without validation (for internal use)
    pub(crate) fn from_string_unchecked(path: String) -> Self {
        Self { path }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path inside the zip archive (no leading '/')
    pub fn zip_path(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// File name without its extension
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Directory portion, always ending in '/' (`/word/` for `/word/document.xml`)
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[..=pos],
            None => "/",
        }
    }

    /// Get the relationships URI for this part.
    ///
    /// For `/word/document.xml`, returns `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        PartUri {
            path: format!("{}_rels/{}.rels", self.directory(), self.file_name()),
        }
    }

    /// Resolve a relationship target relative to this part.
    ///
    /// For `/word/document.xml` and `../media/image1.png`, returns `/media/image1.png`
    pub fn resolve(&self, relative: &str) -> Result<PartUri> {
        resolve_in(self.directory(), relative)
    }

    /// Resolve a target from a package-level relationship (relative to the root)
    pub fn resolve_from_root(relative: &str) -> Result<PartUri> {
        resolve_in("/", relative)
    }

    /// Express this URI as a relationship target relative to `source`.
    ///
    /// `/word/media/a.png` relative to `/word/document.xml` is `media/a.png`;
    /// relative to `/word/glossary/document.xml` it is `../media/a.png`.
    pub fn relative_to(&self, source: &PartUri) -> String {
        let base: Vec<&str> = source
            .directory()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let target: Vec<&str> = self.path.split('/').filter(|s| !s.is_empty()).collect();

        let common = base
            .iter()
            .zip(target.iter())
            .take_while(|(a, b)| a == b)
            .count()
            // the file name itself is never a shared directory
            .min(target.len().saturating_sub(1));

        let mut segments: Vec<&str> = vec![".."; base.len() - common];
        segments.extend(&target[common..]);
        segments.join("/")
    }

    /// Same directory and extension, file stem extended with `suffix`
    pub fn with_stem_suffix(&self, suffix: &str) -> PartUri {
        let path = match self.extension() {
            Some(ext) => format!("{}{}{}.{}", self.directory(), self.file_stem(), suffix, ext),
            None => format!("{}{}{}", self.directory(), self.file_stem(), suffix),
        };
        PartUri { path }
    }

    /// Check if this URI points to a relationships file
    pub fn is_relationships(&self) -> bool {
        self.path.contains("/_rels/") && self.path.ends_with(".rels")
    }
}

fn resolve_in(base_dir: &str, relative: &str) -> Result<PartUri> {
    if relative.starts_with('/') {
        return PartUri::new(relative);
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    PartUri::new(&format!("/{}", parts.join("/")))
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl std::str::FromStr for PartUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartUri::new(s)
    }
}

/// Well-known part URIs
pub mod well_known {
    use super::PartUri;

    pub fn document() -> PartUri {
        PartUri::from_string_unchecked("/word/document.xml".into())
    }

    pub fn styles() -> PartUri {
        PartUri::from_string_unchecked("/word/styles.xml".into())
    }

    pub fn numbering() -> PartUri {
        PartUri::from_string_unchecked("/word/numbering.xml".into())
    }

    pub fn settings() -> PartUri {
        PartUri::from_string_unchecked("/word/settings.xml".into())
    }

    pub fn font_table() -> PartUri {
        PartUri::from_string_unchecked("/word/fontTable.xml".into())
    }

    pub fn footnotes() -> PartUri {
        PartUri::from_string_unchecked("/word/footnotes.xml".into())
    }

    pub fn custom_props() -> PartUri {
        PartUri::from_string_unchecked("/docProps/custom.xml".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_leading_slash() {
        let uri = PartUri::new("word/document.xml").unwrap();
        assert_eq!(uri.as_str(), "/word/document.xml");
        assert_eq!(uri.zip_path(), "word/document.xml");
    }

    #[test]
    fn test_name_parts() {
        let uri = PartUri::new("/word/media/image1.png").unwrap();
        assert_eq!(uri.file_name(), "image1.png");
        assert_eq!(uri.file_stem(), "image1");
        assert_eq!(uri.extension(), Some("png"));
        assert_eq!(uri.directory(), "/word/media/");
        assert_eq!(PartUri::new("/word/noext").unwrap().extension(), None);
    }

    #[test]
    fn test_relationships_uri() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(uri.relationships_uri().as_str(), "/word/_rels/document.xml.rels");
    }

    #[test]
    fn test_resolve_relative() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(uri.resolve("../media/image1.png").unwrap().as_str(), "/media/image1.png");
        assert_eq!(uri.resolve("styles.xml").unwrap().as_str(), "/word/styles.xml");
        assert_eq!(
            PartUri::resolve_from_root("word/document.xml").unwrap().as_str(),
            "/word/document.xml"
        );
    }

    #[test]
    fn test_relative_to() {
        let doc = PartUri::new("/word/document.xml").unwrap();
        let image = PartUri::new("/word/media/image1.png").unwrap();
        assert_eq!(image.relative_to(&doc), "media/image1.png");

        let glossary = PartUri::new("/word/glossary/document.xml").unwrap();
        assert_eq!(image.relative_to(&glossary), "../media/image1.png");

        let root_rels_source = PartUri::new("/document.xml").unwrap();
        assert_eq!(image.relative_to(&root_rels_source), "word/media/image1.png");
    }

    #[test]
    fn test_with_stem_suffix() {
        let image = PartUri::new("/word/media/image1.png").unwrap();
        assert_eq!(image.with_stem_suffix("_2").as_str(), "/word/media/image1_2.png");
    }

    #[test]
    fn test_is_relationships() {
        let rels = PartUri::new("/word/_rels/document.xml.rels").unwrap();
        assert!(rels.is_relationships());
        assert!(!PartUri::new("/word/document.xml").unwrap().is_relationships());
    }
}
