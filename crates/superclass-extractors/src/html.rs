//! HTML content extraction.
//!
//! Drops script, style and comment blocks, strips the remaining tags and
//! decodes character references. Block-level closing tags become line
//! breaks so paragraphs stay apart in the output.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ExtractResult;
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::{collapse_whitespace, read_source_text, Extractor};

static NON_CONTENT: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap(),
        Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap(),
        Regex::new(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>").unwrap(),
        Regex::new(r"(?s)<!--.*?-->").unwrap(),
    ]
});

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").unwrap());

static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/h[1-6]|/li|/tr|/table|/section|/article|/blockquote|/pre|/title)\s*>")
        .unwrap()
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// Decode named and numeric character references.
pub(crate) fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "hellip" => Some('\u{2026}'),
                    "copy" => Some('\u{a9}'),
                    "reg" => Some('\u{ae}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strip markup from an HTML fragment, keeping line breaks at block boundaries.
pub(crate) fn html_to_text(html: &str) -> String {
    let mut cleaned = html.to_string();
    for pattern in NON_CONTENT.iter() {
        cleaned = pattern.replace_all(&cleaned, " ").into_owned();
    }
    let cleaned = BLOCK_BREAK.replace_all(&cleaned, "\n");
    let cleaned = TAG.replace_all(&cleaned, " ");
    let decoded = decode_entities(&cleaned);

    decoded
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn inline_text(fragment: &str) -> String {
    collapse_whitespace(&decode_entities(&TAG.replace_all(fragment, " ")))
}

/// HTML page extractor.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create new HTML extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let html = read_source_text(path).await?;

        let title = TITLE
            .captures(&html)
            .map(|caps| inline_text(&caps[1]))
            .filter(|t| !t.is_empty());

        let sections: Vec<String> = HEADING
            .captures_iter(&html)
            .map(|caps| inline_text(&caps[2]))
            .filter(|h| !h.is_empty())
            .collect();

        let text = html_to_text(&html);

        let mut result = ExtractedContent::new(text, Modality::Html, ContentSource::path(path))
            .with_structure(DocumentStructure {
                sections,
                ..Default::default()
            });
        if let Some(title) = title {
            result = result.with_metadata("title", title);
        }

        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".html", ".htm"]
    }

    fn name(&self) -> &str {
        "html"
    }
}
