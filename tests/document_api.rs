//! Integration test: Document API

mod common;

use common::*;
use docx_compose::opc::{rel_types, well_known};
use docx_compose::{CounterKind, Document, ListKind, Paragraph};
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn test_create_new_document() {
    init_logging();
    let mut doc = Document::new().unwrap();
    doc.add_paragraph("Hello from Rust!").unwrap();
    doc.add_paragraph("This is the second paragraph.").unwrap();

    assert_eq!(doc.paragraph_count().unwrap(), 2);
    assert_eq!(
        doc.text().unwrap(),
        "Hello from Rust!\nThis is the second paragraph."
    );

    let bytes = doc.to_bytes().expect("Should serialize to bytes");
    assert_eq!(&bytes[0..2], b"PK", "Should be valid ZIP file");

    let reopened = Document::from_bytes(&bytes).unwrap();
    assert_eq!(reopened.paragraph_count().unwrap(), 2);
}

#[test]
fn test_new_document_parts() {
    let doc = Document::new().unwrap();
    let package = doc.package();
    let main = doc.main_document_uri();

    assert_eq!(main, &well_known::document());
    assert_eq!(
        package.related_part(main, rel_types::STYLES),
        Some(well_known::styles())
    );
    assert_eq!(
        package.related_part(main, rel_types::SETTINGS),
        Some(well_known::settings())
    );
    assert_eq!(package.related_part(main, rel_types::NUMBERING), None);
}

#[test]
fn test_styled_paragraph_roundtrip() {
    let mut doc = Document::new().unwrap();
    let mut heading = Paragraph::new("My Document Title");
    heading.set_style("Heading1");
    doc.insert_paragraph(0, &heading).unwrap();
    doc.add_paragraph("Body text").unwrap();

    let mut reopened = reopen(&mut doc);
    let first = reopened.paragraph(0).unwrap().unwrap();
    assert_eq!(first.style(), Some("Heading1"));
    assert!(reopened.style_ids().unwrap().contains(&"Heading1".to_string()));
    assert_eq!(reopened.text().unwrap(), "My Document Title\nBody text");
}

#[test]
fn test_lists_survive_save() {
    let mut doc = Document::new().unwrap();
    let num_id = doc.add_list(ListKind::Bulleted).unwrap();
    doc.insert_list_item("first", num_id, 0).unwrap();
    doc.insert_list_item("nested", num_id, 1).unwrap();

    let mut reopened = reopen(&mut doc);
    assert!(reopened.list_level(num_id, 1).unwrap().is_bullet());
    assert_eq!(reopened.next_id(CounterKind::Numbering).unwrap(), num_id + 1);

    let nested = reopened.paragraph(1).unwrap().unwrap();
    let reference = nested.numbering().unwrap();
    assert_eq!((reference.num_id, reference.level), (num_id, 1));
}

#[test]
fn test_unknown_content_is_preserved() {
    let body = r#"<w:p><w:r><w:t>before</w:t></w:r><w:customXml w:element="clause"><w:r><w:t>kept</w:t></w:r></w:customXml></w:p>"#;
    let mut doc = DocxBuilder::new(body).build();
    doc.insert_text(0, 6, "!").unwrap();

    let mut reopened = reopen(&mut doc);
    let xml = part_xml(&mut reopened, "/word/document.xml");
    assert!(xml.contains(r#"<w:customXml w:element="clause"><w:r><w:t>kept</w:t></w:r></w:customXml>"#));
    assert_eq!(reopened.text().unwrap(), "before!kept");
}

#[test]
fn test_save_to_file() {
    let output_path = Path::new("target/test_output.docx");
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let mut doc = Document::new().unwrap();
    doc.add_paragraph("Test document created by docx-compose").unwrap();
    doc.save(output_path).expect("Should save to file");

    let reopened = Document::open(output_path).expect("Should reopen");
    assert!(reopened.text().unwrap().contains("Test document"));

    std::fs::remove_file(output_path).ok();
}
