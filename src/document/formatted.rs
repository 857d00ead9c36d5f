//! Paragraph text grouped by formatting

use crate::document::paragraph::ParagraphContent;
use crate::document::run::RunProperties;
use crate::document::Paragraph;

/// A stretch of text sharing one formatting
#[derive(Clone, Debug, PartialEq)]
pub struct FormattedText {
    /// Offset of the first character within the paragraph
    pub index: usize,
    pub text: String,
    /// `None` for unformatted text
    pub formatting: Option<RunProperties>,
}

impl Paragraph {
    /// Text spans in document order, adjacent spans with equal formatting merged
    pub fn formatted_text(&self) -> Vec<FormattedText> {
        let mut spans = Vec::new();
        let mut pos = 0;
        collect(&self.content, &mut pos, &mut spans);
        spans
    }
}

fn collect(items: &[ParagraphContent], pos: &mut usize, out: &mut Vec<FormattedText>) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => {
                let formatting = Some(run.formatting()).filter(|f| !f.is_empty());
                push(out, pos, run.text(), run.effective_len(), formatting);
            }
            ParagraphContent::Tracked(t) => collect(&t.content, pos, out),
            ParagraphContent::Hyperlink(h) => collect(&h.content, pos, out),
            other => push(out, pos, other.text(), other.effective_len(), None),
        }
    }
}

fn push(
    out: &mut Vec<FormattedText>,
    pos: &mut usize,
    text: String,
    len: usize,
    formatting: Option<RunProperties>,
) {
    if len == 0 {
        return;
    }
    match out.last_mut() {
        Some(last) if last.formatting == formatting => last.text.push_str(&text),
        _ => out.push(FormattedText {
            index: *pos,
            text,
            formatting,
        }),
    }
    *pos += len;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;
    use pretty_assertions::assert_eq;

    fn para(xml: &str) -> Paragraph {
        Paragraph::from_element(&XmlTree::from_xml(xml).unwrap().root).unwrap()
    }

    #[test]
    fn test_adjacent_equal_formatting_merges() {
        let p = para(
            r#"<w:p><w:r><w:t xml:space="preserve">plain </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>bo</w:t></w:r><w:ins w:id="1" w:author="a"><w:r><w:rPr><w:b/></w:rPr><w:t>ld</w:t></w:r></w:ins><w:r><w:rPr></w:rPr><w:t> end</w:t></w:r></w:p>"#,
        );
        let spans = p.formatted_text();
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].index, spans[0].text.as_str()), (0, "plain "));
        assert_eq!(spans[0].formatting, None);
        assert_eq!((spans[1].index, spans[1].text.as_str()), (6, "bold"));
        assert_eq!(spans[1].formatting.as_ref().and_then(|f| f.bold), Some(true));
        assert_eq!((spans[2].index, spans[2].text.as_str()), (10, " end"));
        assert_eq!(spans[2].formatting, None);
    }

    #[test]
    fn test_empty_paragraph() {
        assert!(Paragraph::new("").formatted_text().is_empty());
    }
}
