//! In-memory DOCX packages for integration tests

#![allow(dead_code)]

use docx_compose::opc::{content_types, rel_types, well_known, Package, Part, PartUri};
use docx_compose::xml::{A, PIC, R, W, WP};
use docx_compose::Document;

pub use docx_compose::xml::W as W_NS;

/// Tiny PNG-ish payloads; only their bytes matter here
pub const RED_PIXEL: &[u8] = b"\x89PNG\r\n\x1a\nred";
pub const BLUE_PIXEL: &[u8] = b"\x89PNG\r\n\x1a\nblue";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A paragraph with a single run of `text`
pub fn para(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
}

/// A paragraph in list `num_id`
pub fn list_para(text: &str, num_id: u32) -> String {
    format!(
        "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{}\"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>",
        num_id, text
    )
}

/// A paragraph showing the image behind relationship `rel_id`
pub fn picture(rel_id: &str, docpr_id: u32) -> String {
    format!(
        "<w:p><w:r><w:drawing><wp:inline><wp:docPr id=\"{}\" name=\"Picture {}\"/><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed=\"{}\"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>",
        docpr_id, docpr_id, rel_id
    )
}

pub const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:rPr><w:b/></w:rPr></w:style></w:styles>"#;

pub const FONTS: &str = r#"<w:fonts xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:font w:name="Calibri"/></w:fonts>"#;

/// Custom properties part holding string properties `(name, pid)`
pub fn custom_properties(entries: &[(&str, u32)]) -> String {
    let body: String = entries
        .iter()
        .map(|(name, pid)| {
            format!(
                "<property fmtid=\"{{D5CDD505-2E9C-101B-9397-08002B2CF9AE}}\" pid=\"{}\" name=\"{}\"><vt:lpwstr>{}</vt:lpwstr></property>",
                pid, name, name
            )
        })
        .collect();
    format!(
        "<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/custom-properties\" xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">{}</Properties>",
        body
    )
}

/// Numbering part with one bullet abstract per entry of `abstract_ids`,
/// each referenced by a num with id `abstract id + 1`
pub fn numbering(abstract_ids: &[u32]) -> String {
    let abstracts: String = abstract_ids
        .iter()
        .map(|id| {
            format!(
                "<w:abstractNum w:abstractNumId=\"{}\"><w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"-\"/></w:lvl></w:abstractNum>",
                id
            )
        })
        .collect();
    let nums: String = abstract_ids
        .iter()
        .map(|id| {
            format!(
                "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{}\"/></w:num>",
                id + 1,
                id
            )
        })
        .collect();
    format!(
        "<w:numbering xmlns:w=\"{}\">{}{}</w:numbering>",
        W, abstracts, nums
    )
}

/// Builds a package around a main document body
pub struct DocxBuilder {
    package: Package,
    main: PartUri,
}

impl DocxBuilder {
    pub fn new(body: &str) -> Self {
        let main = PartUri::new("/word/document.xml").unwrap();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{}\" xmlns:r=\"{}\" xmlns:wp=\"{}\" xmlns:a=\"{}\" xmlns:pic=\"{}\">\
             <w:body>{}<w:sectPr/></w:body></w:document>",
            W, R, WP, A, PIC, body
        );

        let mut package = Package::new();
        package.add_part(Part::new(
            main.clone(),
            content_types::MAIN_DOCUMENT,
            xml.into_bytes(),
        ));
        package
            .relationships_mut()
            .add(rel_types::OFFICE_DOCUMENT, main.zip_path());
        Self { package, main }
    }

    /// Add an XML part related from the main document
    pub fn part(mut self, rel_type: &str, path: &str, content_type: &str, xml: &str) -> Self {
        let uri = PartUri::new(path).unwrap();
        self.package.add_part(Part::new(
            uri.clone(),
            content_type,
            xml.as_bytes().to_vec(),
        ));
        self.package
            .part_relationships_mut(&self.main)
            .unwrap()
            .add(rel_type, &uri.relative_to(&self.main));
        self
    }

    pub fn styles(self, xml: &str) -> Self {
        self.part(rel_types::STYLES, "/word/styles.xml", content_types::STYLES, xml)
    }

    pub fn numbering(self, xml: &str) -> Self {
        self.part(
            rel_types::NUMBERING,
            "/word/numbering.xml",
            content_types::NUMBERING,
            xml,
        )
    }

    pub fn fonts(self, xml: &str) -> Self {
        self.part(
            rel_types::FONT_TABLE,
            well_known::font_table().as_str(),
            content_types::FONT_TABLE,
            xml,
        )
    }

    pub fn footnotes(self, xml: &str) -> Self {
        self.part(
            rel_types::FOOTNOTES,
            well_known::footnotes().as_str(),
            content_types::FOOTNOTES,
            xml,
        )
    }

    pub fn header(self, xml: &str) -> Self {
        self.part(
            rel_types::HEADER,
            "/word/header1.xml",
            content_types::HEADER,
            xml,
        )
    }

    /// Add docProps/custom.xml, related from the package root
    pub fn custom_properties(mut self, xml: &str) -> Self {
        let uri = well_known::custom_props();
        self.package.add_part(Part::new(
            uri.clone(),
            content_types::CUSTOM_PROPERTIES,
            xml.as_bytes().to_vec(),
        ));
        self.package
            .relationships_mut()
            .add(rel_types::CUSTOM_PROPERTIES, uri.zip_path());
        self
    }

    /// Add an image part related from the main document under `rel_id`
    pub fn image(mut self, rel_id: &str, path: &str, data: &[u8]) -> Self {
        let uri = PartUri::new(path).unwrap();
        self.package
            .add_part(Part::new(uri.clone(), "image/png", data.to_vec()));
        self.package
            .part_relationships_mut(&self.main)
            .unwrap()
            .add_with_id(
                rel_id,
                rel_types::IMAGE,
                &uri.relative_to(&self.main),
                docx_compose::opc::TargetMode::Internal,
            );
        self
    }

    /// Add an external hyperlink relationship under `rel_id`
    pub fn hyperlink(mut self, rel_id: &str, target: &str) -> Self {
        self.package
            .part_relationships_mut(&self.main)
            .unwrap()
            .add_with_id(
                rel_id,
                rel_types::HYPERLINK,
                target,
                docx_compose::opc::TargetMode::External,
            );
        self
    }

    pub fn build(self) -> Document {
        Document::from_package(self.package).unwrap()
    }
}

/// Serialize and reopen, so assertions see what a reader of the file sees
pub fn reopen(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().unwrap();
    Document::from_bytes(&bytes).unwrap()
}

/// XML of a part as the document currently holds it
pub fn part_xml(doc: &mut Document, path: &str) -> String {
    let uri = PartUri::new(path).unwrap();
    doc.part_tree(&uri).unwrap().to_xml().unwrap()
}
