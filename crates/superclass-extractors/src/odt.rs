//! OpenDocument text extraction.
//!
//! Reads `content.xml` from the ODF container. Each `<text:p>` and
//! `<text:h>` becomes one line; headings are also reported as sections.

use std::path::Path;

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::archive::Archive;
use crate::error::ExtractResult;
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::xml::{attribute, parse_error, text_of};
use crate::{collapse_whitespace, read_source, Extractor};

const FORMAT: &str = "ODT";

#[derive(Debug, Default)]
struct OdtText {
    paragraphs: Vec<String>,
    headings: Vec<String>,
    title: Option<String>,
}

/// Inline elements that stand for whitespace.
fn inline_whitespace(e: &BytesStart<'_>) -> Option<String> {
    match e.local_name().as_ref() {
        b"s" => {
            let count = attribute(e, b"c")
                .and_then(|c| c.parse::<usize>().ok())
                .unwrap_or(1);
            Some(" ".repeat(count))
        }
        b"tab" => Some("\t".to_string()),
        b"line-break" => Some("\n".to_string()),
        _ => None,
    }
}

fn parse_content(xml: &str) -> ExtractResult<OdtText> {
    let mut reader = Reader::from_str(xml);
    let mut result = OdtText::default();

    let mut in_body = false;
    let mut skip_depth = 0usize;
    let mut block_depth = 0usize;
    let mut is_heading = false;
    let mut buffer = String::new();

    loop {
        match reader.read_event().map_err(|e| parse_error(FORMAT, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"body" => in_body = true,
                _ if skip_depth > 0 => skip_depth += 1,
                b"annotation" | b"tracked-changes" | b"sequence-decls" => skip_depth = 1,
                b"p" | b"h" if in_body => {
                    if block_depth == 0 {
                        is_heading = e.local_name().as_ref() == b"h";
                        buffer.clear();
                    }
                    block_depth += 1;
                }
                _ => {
                    if block_depth > 0 {
                        if let Some(ws) = inline_whitespace(&e) {
                            buffer.push_str(&ws);
                        }
                    }
                }
            },
            Event::Empty(e) => {
                if skip_depth == 0 && block_depth > 0 {
                    if let Some(ws) = inline_whitespace(&e) {
                        buffer.push_str(&ws);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"body" => in_body = false,
                _ if skip_depth > 0 => skip_depth -= 1,
                b"p" | b"h" if block_depth > 0 => {
                    block_depth -= 1;
                    if block_depth == 0 {
                        let line = buffer
                            .split('\n')
                            .map(collapse_whitespace)
                            .collect::<Vec<_>>()
                            .join("\n")
                            .trim()
                            .to_string();
                        if !line.is_empty() {
                            if is_heading {
                                result.headings.push(line.clone());
                            }
                            result.paragraphs.push(line);
                        }
                        buffer.clear();
                    }
                }
                _ => {}
            },
            Event::Text(t) if skip_depth == 0 && block_depth > 0 => {
                buffer.push_str(&text_of(&t));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(result)
}

/// `dc:title` from `meta.xml`, if present.
fn parse_title(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_title = false;
    let mut title = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"title" => in_title = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"title" => break,
            Ok(Event::Text(t)) if in_title => title.push_str(&text_of(&t)),
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    let title = collapse_whitespace(&title);
    (!title.is_empty()).then_some(title)
}

fn extract_sync(bytes: Vec<u8>) -> ExtractResult<OdtText> {
    let mut archive = Archive::open(FORMAT, bytes)?;
    let content = archive.read("content.xml")?;
    let mut parsed = parse_content(&content)?;
    parsed.title = archive
        .read_optional("meta.xml")?
        .and_then(|meta| parse_title(&meta));
    Ok(parsed)
}

/// OpenDocument text extractor.
#[derive(Debug, Clone, Default)]
pub struct OdtExtractor;

impl OdtExtractor {
    /// Create new ODT extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for OdtExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let bytes = read_source(path).await?;
        let parsed = tokio::task::spawn_blocking(move || extract_sync(bytes)).await??;
        debug!(
            path = %path.display(),
            paragraphs = parsed.paragraphs.len(),
            headings = parsed.headings.len(),
            "Extracted ODT text"
        );

        let mut result = ExtractedContent::new(
            parsed.paragraphs.join("\n"),
            Modality::Odt,
            ContentSource::path(path),
        )
        .with_structure(DocumentStructure {
            sections: parsed.headings,
            ..Default::default()
        });
        if let Some(title) = parsed.title {
            result = result.with_metadata("title", title);
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".odt"]
    }

    fn name(&self) -> &str {
        "odt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{inflated_zip64, zip_file};
    use crate::ExtractError;

    const CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="o" xmlns:text="t" xmlns:table="tb">
  <office:automatic-styles><style:style xmlns:style="s" style:name="P1"/></office:automatic-styles>
  <office:body>
    <office:text>
      <text:sequence-decls><text:sequence-decl text:name="Table"/></text:sequence-decls>
      <text:h text:outline-level="1">Project <text:span>Plan</text:span></text:h>
      <text:p>Phase<text:s text:c="3"/>one<text:tab/>starts</text:p>
      <text:p>Line one<text:line-break/>Line two</text:p>
      <text:p><office:annotation><text:p>reviewer note</text:p></office:annotation>Kept text</text:p>
      <text:p/>
    </office:text>
  </office:body>
</office:document-content>"#;

    #[test]
    fn test_parse_content() {
        let parsed = parse_content(CONTENT).unwrap();
        assert_eq!(
            parsed.paragraphs,
            vec!["Project Plan", "Phase one starts", "Line one\nLine two", "Kept text"]
        );
        assert_eq!(parsed.headings, vec!["Project Plan"]);
    }

    #[test]
    fn test_parse_title() {
        let meta = r#"<office:document-meta xmlns:office="o" xmlns:dc="d"><office:meta><dc:title>Roadmap</dc:title></office:meta></office:document-meta>"#;
        assert_eq!(parse_title(meta).as_deref(), Some("Roadmap"));
        assert_eq!(parse_title("<office:document-meta/>"), None);
    }

    #[tokio::test]
    async fn test_odt_extract_file() {
        let file = zip_file(
            ".odt",
            &[
                ("mimetype", "application/vnd.oasis.opendocument.text"),
                ("content.xml", CONTENT),
            ],
        );
        let content = OdtExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(content.modality, Modality::Odt);
        assert!(content.text.starts_with("Project Plan\nPhase one starts"));
        assert!(!content.text.contains("reviewer note"));
        assert!(content.metadata.get("title").is_none());
    }

    #[tokio::test]
    async fn test_odt_inflated_entry_rejected() {
        let file = tempfile::Builder::new().suffix(".odt").tempfile().unwrap();
        std::fs::write(file.path(), inflated_zip64()).unwrap();

        let err = tokio_test::assert_err!(OdtExtractor::new().extract(file.path()).await);
        assert!(matches!(err, ExtractError::UnsupportedStructure { format: "ODT", .. }));
    }

    #[tokio::test]
    async fn test_odt_missing_content() {
        let file = zip_file(".odt", &[("mimetype", "application/vnd.oasis.opendocument.text")]);
        let result = OdtExtractor::new().extract(file.path()).await;
        assert!(matches!(
            result,
            Err(ExtractError::UnsupportedStructure { format: "ODT", .. })
        ));
    }
}
