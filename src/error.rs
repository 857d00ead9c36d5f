//! Error types for docx-compose

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A cross-part reference that cannot be resolved (dangling numId, missing
    /// abstract definition, non-numeric id). Never silently defaulted.
    #[error("Document format error: {0}")]
    Format(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Offset {offset} is outside 0..={length}")]
    OffsetOutOfRange { offset: usize, length: usize },

    /// An edit landed inside a node that has no defined split point.
    #[error("Cannot split inside <{0}>")]
    UnsplittableNode(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
