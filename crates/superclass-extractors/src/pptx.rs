//! PPTX content extraction.
//!
//! Slides live at `ppt/slides/slideN.xml`; their visible text is held in
//! DrawingML `<a:t>` runs grouped into `<a:p>` paragraphs.

use std::path::Path;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::archive::Archive;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::xml::{parse_error, text_of};
use crate::{collapse_whitespace, read_source, Extractor};

const FORMAT: &str = "PPTX";

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text of one slide, one line per non-empty paragraph.
fn slide_text(xml: &str) -> ExtractResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(|e| parse_error(FORMAT, e))? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => {
                    let line = collapse_whitespace(&current);
                    if !line.is_empty() {
                        paragraphs.push(line);
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"br" => current.push(' '),
            Event::Text(t) if in_run_text => current.push_str(&text_of(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    let tail = collapse_whitespace(&current);
    if !tail.is_empty() {
        paragraphs.push(tail);
    }
    Ok(paragraphs.join("\n"))
}

fn extract_sync(bytes: Vec<u8>) -> ExtractResult<Vec<String>> {
    let mut archive = Archive::open(FORMAT, bytes)?;

    let mut slides: Vec<(u32, String)> = archive
        .entry_names()
        .into_iter()
        .filter_map(|name| slide_number(&name).map(|n| (n, name)))
        .collect();
    if slides.is_empty() {
        return Err(ExtractError::unsupported_structure(
            FORMAT,
            "no slides found under ppt/slides/",
        ));
    }
    slides.sort_by_key(|(n, _)| *n);

    slides
        .into_iter()
        .map(|(_, name)| slide_text(&archive.read(&name)?))
        .collect()
}

/// PowerPoint presentation extractor.
#[derive(Debug, Clone, Default)]
pub struct PptxExtractor;

impl PptxExtractor {
    /// Create new PPTX extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for PptxExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let bytes = read_source(path).await?;
        let slides = tokio::task::spawn_blocking(move || extract_sync(bytes)).await??;
        debug!(path = %path.display(), slides = slides.len(), "Extracted PPTX slides");

        let text = slides
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(
            ExtractedContent::new(text, Modality::Pptx, ContentSource::path(path))
                .with_structure(DocumentStructure {
                    page_count: Some(slides.len()),
                    sections: Vec::new(),
                }),
        )
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".pptx"]
    }

    fn name(&self) -> &str {
        "pptx"
    }
}
