//! Markdown content extraction.
//!
//! Removes code, image and HTML markup, keeps link and emphasis text, and
//! collapses the result into a single run of prose.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtractResult;
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::{collapse_whitespace, read_source_text, Extractor};

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t]*#*[ \t]*$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*_]{3,}[ \t]*$").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_]{1,3}([^*_]+)[*_]{1,3}").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Reduce Markdown source to plain prose.
pub(crate) fn markdown_to_text(source: &str) -> String {
    let text = FENCED_CODE.replace_all(source, "");
    let text = INLINE_CODE.replace_all(&text, "");
    // Images first, otherwise the link pattern leaves a stray "!".
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = HEADER.replace_all(&text, "$1");
    let text = RULE.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, "");
    collapse_whitespace(&text)
}

fn headings(source: &str) -> Vec<String> {
    let without_code = FENCED_CODE.replace_all(source, "");
    HEADER
        .captures_iter(&without_code)
        .map(|caps| collapse_whitespace(&EMPHASIS.replace_all(&caps[1], "$1")))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Markdown document extractor.
#[derive(Debug, Clone, Default)]
pub struct MarkdownExtractor;

impl MarkdownExtractor {
    /// Create new Markdown extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let source = read_source_text(path).await?;
        let sections = headings(&source);
        let text = markdown_to_text(&source);

        Ok(
            ExtractedContent::new(text, Modality::Markdown, ContentSource::path(path))
                .with_structure(DocumentStructure {
                    sections,
                    ..Default::default()
                }),
        )
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".md", ".markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }
}
