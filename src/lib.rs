//! # docx-compose
//!
//! Edit and merge DOCX packages while keeping every cross-part identifier
//! (styles, numbering, notes, relationships, drawing, bookmark and
//! tracked-change ids) consistent.
//!
//! ## Features
//!
//! - Edit paragraphs by character offset: split, insert, remove, replace
//! - Optional change tracking with `w:ins` / `w:del` wrappers
//! - Merge one document into another, appended or prepended
//! - Round-trip preservation (unknown elements are kept intact)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_compose::{Document, MergePosition, Revision};
//!
//! let mut doc = Document::open("contract.docx")?;
//! doc.set_track_changes(Some(Revision::new("Reviewer")));
//! doc.replace_text("ACME Ltd", "ACME GmbH")?;
//!
//! let appendix = Document::open("appendix.docx")?;
//! doc.insert_document(&appendix, MergePosition::Append)?;
//! doc.save("merged.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod ids;
pub mod merge;
pub mod opc;
pub mod resources;
pub mod xml;

pub use document::{Document, ListKind, Paragraph, Revision, Run};
pub use error::{Error, Result};
pub use ids::CounterKind;
pub use merge::MergePosition;
pub use opc::{Package, Part, PartUri};
