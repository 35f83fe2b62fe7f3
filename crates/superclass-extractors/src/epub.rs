//! EPUB content extraction.
//!
//! Follows `META-INF/container.xml` to the OPF package document, then reads
//! the spine's XHTML documents in reading order. Spine entries whose
//! documents are missing from the container are skipped.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::archive::Archive;
use crate::error::{ExtractError, ExtractResult};
use crate::html::html_to_text;
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::xml::{attribute, parse_error, text_of};
use crate::{collapse_whitespace, read_source, Extractor};

const FORMAT: &str = "EPUB";
const CONTAINER: &str = "META-INF/container.xml";

#[derive(Debug, Default)]
struct Package {
    title: Option<String>,
    manifest: HashMap<String, String>,
    spine: Vec<String>,
}

#[derive(Debug, Default)]
struct Book {
    title: Option<String>,
    chapters: Vec<String>,
}

fn rootfile_path(container: &str) -> ExtractResult<String> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event().map_err(|e| parse_error(FORMAT, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path") {
                    return Ok(path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(ExtractError::unsupported_structure(
        FORMAT,
        "container.xml has no rootfile",
    ))
}

fn parse_package(opf: &str) -> ExtractResult<Package> {
    let mut reader = Reader::from_str(opf);
    let mut package = Package::default();
    let mut in_title = false;
    let mut title = String::new();

    loop {
        match reader.read_event().map_err(|e| parse_error(FORMAT, e))? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"item" => {
                    if let (Some(id), Some(href)) = (attribute(&e, b"id"), attribute(&e, b"href")) {
                        package.manifest.insert(id, href);
                    }
                }
                b"itemref" => {
                    if let Some(idref) = attribute(&e, b"idref") {
                        package.spine.push(idref);
                    }
                }
                b"title" if package.title.is_none() => in_title = true,
                _ => {}
            },
            Event::End(e) if in_title && e.local_name().as_ref() == b"title" => {
                in_title = false;
                let t = collapse_whitespace(&title);
                if !t.is_empty() {
                    package.title = Some(t);
                }
            }
            Event::Text(t) if in_title => title.push_str(&text_of(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(package)
}

/// Resolve `href` against the directory of the package document.
fn resolve_href(opf_path: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let mut parts: Vec<&str> = match opf_path.rfind('/') {
        Some(idx) => opf_path[..idx].split('/').collect(),
        None => Vec::new(),
    };
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn extract_sync(bytes: Vec<u8>) -> ExtractResult<Book> {
    let mut archive = Archive::open(FORMAT, bytes)?;
    let opf_path = rootfile_path(&archive.read(CONTAINER)?)?;
    let package = parse_package(&archive.read(&opf_path)?)?;

    let mut chapters = Vec::with_capacity(package.spine.len());
    for idref in &package.spine {
        let Some(href) = package.manifest.get(idref) else {
            warn!(idref = %idref, "Spine item missing from manifest");
            continue;
        };
        let entry = resolve_href(&opf_path, href);
        match archive.read_optional(&entry)? {
            Some(xhtml) => {
                let text = html_to_text(&xhtml);
                if !text.is_empty() {
                    chapters.push(text);
                }
            }
            None => warn!(entry = %entry, "Spine document missing from container"),
        }
    }

    Ok(Book {
        title: package.title,
        chapters,
    })
}

/// EPUB e-book extractor.
#[derive(Debug, Clone, Default)]
pub struct EpubExtractor;

impl EpubExtractor {
    /// Create new EPUB extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for EpubExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let bytes = read_source(path).await?;
        let book = tokio::task::spawn_blocking(move || extract_sync(bytes)).await??;
        debug!(path = %path.display(), chapters = book.chapters.len(), "Extracted EPUB text");

        let mut result = ExtractedContent::new(
            book.chapters.join("\n\n"),
            Modality::Epub,
            ContentSource::path(path),
        )
        .with_structure(DocumentStructure {
            page_count: Some(book.chapters.len()),
            sections: Vec::new(),
        });
        if let Some(title) = book.title {
            result = result.with_metadata("title", title);
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".epub"]
    }

    fn name(&self) -> &str {
        "epub"
    }
}
