//! SVG content extraction.
//!
//! Emits the drawing's top-level `<title>` and `<desc>` as labelled lines,
//! followed by one line per `<text>` element (including nested `<tspan>` and
//! `<textPath>` runs) in document order. Style and script blocks are ignored.

use std::path::Path;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::ExtractResult;
use crate::types::{ContentSource, ExtractedContent, Modality};
use crate::xml::{parse_error, text_of};
use crate::{collapse_whitespace, read_source_text, Extractor};

#[derive(Debug, Default, PartialEq)]
struct SvgText {
    title: Option<String>,
    description: Option<String>,
    lines: Vec<String>,
}

impl SvgText {
    fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str("Title: ");
            out.push_str(title);
            out.push_str("\n\n");
        }
        if let Some(desc) = &self.description {
            out.push_str("Description: ");
            out.push_str(desc);
            out.push_str("\n\n");
        }
        out.push_str(&self.lines.join("\n"));
        out.trim_end().to_string()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Capture {
    Title,
    Description,
    Text,
}

fn parse_svg(source: &str) -> ExtractResult<SvgText> {
    let mut reader = Reader::from_str(source);
    let mut result = SvgText::default();

    let mut depth = 0usize;
    let mut skip_depth: Option<usize> = None;
    // Element depth that opened the current capture, and its buffer.
    let mut capture: Option<(Capture, usize)> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event().map_err(|e| parse_error("SVG", e))? {
            Event::Start(e) => {
                depth += 1;
                if skip_depth.is_some() {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"style" | b"script" => skip_depth = Some(depth),
                    b"title" if depth == 2 && capture.is_none() => {
                        capture = Some((Capture::Title, depth));
                    }
                    b"desc" if depth == 2 && capture.is_none() => {
                        capture = Some((Capture::Description, depth));
                    }
                    b"text" if capture.is_none() => capture = Some((Capture::Text, depth)),
                    b"tspan" | b"textPath" if capture.is_some() => buffer.push(' '),
                    _ => {}
                }
            }
            Event::End(_) => {
                if skip_depth == Some(depth) {
                    skip_depth = None;
                } else if let Some((kind, at)) = capture {
                    if at == depth {
                        let text = collapse_whitespace(&buffer);
                        buffer.clear();
                        capture = None;
                        if !text.is_empty() {
                            match kind {
                                Capture::Title => result.title = Some(text),
                                Capture::Description => result.description = Some(text),
                                Capture::Text => result.lines.push(text),
                            }
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if skip_depth.is_none() && capture.is_some() {
                    buffer.push_str(&text_of(&t));
                }
            }
            Event::CData(c) => {
                if skip_depth.is_none() && capture.is_some() {
                    buffer.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(result)
}

/// SVG drawing extractor.
#[derive(Debug, Clone, Default)]
pub struct SvgExtractor;

impl SvgExtractor {
    /// Create new SVG extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for SvgExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let source = read_source_text(path).await?;
        let parsed = parse_svg(&source)?;
        debug!(
            path = %path.display(),
            text_elements = parsed.lines.len(),
            has_title = parsed.title.is_some(),
            "Parsed SVG"
        );

        let mut result =
            ExtractedContent::new(parsed.render(), Modality::Svg, ContentSource::path(path));
        if let Some(title) = parsed.title {
            result = result.with_metadata("title", title);
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".svg"]
    }

    fn name(&self) -> &str {
        "svg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWING: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
  <title>Network   diagram</title>
  <desc>Shows the data flow</desc>
  <style>.label { font: 12px sans-serif; }</style>
  <g id="layer1">
    <title>nested titles are not the drawing title</title>
    <text x="10" y="20">Load <tspan font-weight="bold">balancer</tspan></text>
    <g><text x="10" y="40"><![CDATA[Database & cache]]></text></g>
  </g>
  <text x="10" y="60"><textPath href="#p">Along a path</textPath></text>
</svg>"##;

    #[test]
    fn test_parse_svg() {
        let parsed = parse_svg(DRAWING).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Network diagram"));
        assert_eq!(parsed.description.as_deref(), Some("Shows the data flow"));
        assert_eq!(
            parsed.lines,
            vec!["Load balancer", "Database & cache", "Along a path"]
        );
    }

    #[test]
    fn test_render_labels() {
        let parsed = parse_svg(DRAWING).unwrap();
        assert_eq!(
            parsed.render(),
            "Title: Network diagram\n\nDescription: Shows the data flow\n\n\
             Load balancer\nDatabase & cache\nAlong a path"
        );
    }

    #[test]
    fn test_parse_svg_without_text() {
        let parsed = parse_svg(r#"<svg><rect width="1" height="1"/></svg>"#).unwrap();
        assert_eq!(parsed, SvgText::default());
        assert_eq!(parsed.render(), "");
    }

    #[test]
    fn test_parse_svg_malformed() {
        let result = parse_svg("<svg><text>unclosed</svg>");
        assert!(matches!(
            result,
            Err(crate::ExtractError::Malformed { format: "SVG", .. })
        ));
    }

    #[tokio::test]
    async fn test_svg_extract_file() {
        let file = tempfile::Builder::new().suffix(".svg").tempfile().unwrap();
        std::fs::write(file.path(), DRAWING).unwrap();

        let content = SvgExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(content.modality, Modality::Svg);
        assert!(content.text.starts_with("Title: Network diagram"));
        assert_eq!(content.metadata["title"], "Network diagram");
    }
}
