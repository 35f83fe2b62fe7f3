//! RTF content extraction.
//!
//! A small control-word scanner: groups are tracked so that destination
//! groups (font tables, stylesheets, pictures, `{\*...}` extensions) are
//! skipped, while `\par`, `\line` and `\tab` are kept as whitespace and
//! `\'hh` / `\uN` escapes are decoded.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, ExtractedContent, Modality};
use crate::{collapse_whitespace, read_source, Extractor};

const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "headerl",
    "headerr",
    "footer",
    "footerl",
    "footerr",
    "object",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "fldinst",
];

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    unicode_skip: usize,
}

struct RtfScanner<'a> {
    input: &'a [u8],
    pos: usize,
    out: String,
    state: GroupState,
    stack: Vec<GroupState>,
    pending_skip: usize,
}

impl<'a> RtfScanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            out: String::with_capacity(input.len() / 2),
            state: GroupState {
                skip: false,
                unicode_skip: 1,
            },
            stack: Vec::new(),
            pending_skip: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn emit(&mut self, ch: char) {
        if self.pending_skip > 0 {
            self.pending_skip -= 1;
            return;
        }
        if !self.state.skip {
            self.out.push(ch);
        }
    }

    fn run(mut self) -> String {
        while let Some(byte) = self.peek() {
            self.pos += 1;
            match byte {
                b'{' => {
                    self.stack.push(self.state);
                    self.pending_skip = 0;
                }
                b'}' => {
                    if let Some(previous) = self.stack.pop() {
                        self.state = previous;
                    }
                    self.pending_skip = 0;
                }
                b'\\' => self.control(),
                b'\r' | b'\n' => {}
                other => self.emit(char::from(other)),
            }
        }
        self.out
    }

    fn control(&mut self) {
        let Some(next) = self.peek() else {
            return;
        };

        if !next.is_ascii_alphabetic() {
            self.pos += 1;
            match next {
                b'\\' | b'{' | b'}' => self.emit(char::from(next)),
                b'\'' => {
                    let hex = self.input.get(self.pos..self.pos + 2).and_then(|h| {
                        std::str::from_utf8(h)
                            .ok()
                            .and_then(|s| u8::from_str_radix(s, 16).ok())
                    });
                    if let Some(value) = hex {
                        self.pos += 2;
                        self.emit(char::from(value));
                    }
                }
                b'~' => self.emit(' '),
                b'_' => self.emit('-'),
                b'*' => self.state.skip = true,
                b'\r' | b'\n' => self.emit('\n'),
                _ => {}
            }
            return;
        }

        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        let param_start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let param: Option<i32> = std::str::from_utf8(&self.input[param_start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok());

        // A single space delimits the control word and is not part of the text.
        if self.peek() == Some(b' ') {
            self.pos += 1;
        }

        self.apply(&word, param);
    }

    fn apply(&mut self, word: &str, param: Option<i32>) {
        match word {
            "par" | "line" | "sect" | "page" | "row" => self.emit('\n'),
            "tab" | "cell" => self.emit('\t'),
            "emdash" => self.emit('\u{2014}'),
            "endash" => self.emit('\u{2013}'),
            "bullet" => self.emit('\u{2022}'),
            "lquote" => self.emit('\u{2018}'),
            "rquote" => self.emit('\u{2019}'),
            "ldblquote" => self.emit('\u{201c}'),
            "rdblquote" => self.emit('\u{201d}'),
            "uc" => {
                if let Some(n) = param {
                    self.state.unicode_skip = n.max(0) as usize;
                }
            }
            "u" => {
                if let Some(n) = param {
                    let code = if n < 0 { n + 65536 } else { n };
                    if let Some(ch) = u32::try_from(code).ok().and_then(char::from_u32) {
                        self.emit(ch);
                    }
                    self.pending_skip = self.state.unicode_skip;
                }
            }
            w if SKIPPED_DESTINATIONS.contains(&w) => self.state.skip = true,
            _ => {}
        }
    }
}

/// Convert RTF source to plain text.
pub(crate) fn rtf_to_text(source: &[u8]) -> ExtractResult<String> {
    let trimmed = source
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| &source[start..])
        .unwrap_or_default();
    if !trimmed.starts_with(b"{\\rtf") {
        return Err(ExtractError::malformed("RTF", "missing {\\rtf header"));
    }

    let raw = RtfScanner::new(trimmed).run();
    Ok(raw
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Rich Text Format extractor.
#[derive(Debug, Clone, Default)]
pub struct RtfExtractor;

impl RtfExtractor {
    /// Create new RTF extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for RtfExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let source = read_source(path).await?;
        let size = source.len();
        let text = rtf_to_text(&source)?;
        debug!(path = %path.display(), size, chars = text.len(), "Extracted RTF text");

        Ok(ExtractedContent::new(text, Modality::Rtf, ContentSource::path(path))
            .with_metadata("original_size", size))
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".rtf"]
    }

    fn name(&self) -> &str {
        "rtf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtf_basic_paragraphs() {
        let source = br"{\rtf1\ansi\deff0{\fonttbl{\f0 Times New Roman;}}{\colortbl;\red0\green0\blue0;}
\f0\fs24 Hello \b World\b0 .\par
Second line\tab tabbed\par}";

        let text = rtf_to_text(source).unwrap();
        assert_eq!(text, "Hello World.\nSecond line tabbed");
    }

    #[test]
    fn test_rtf_escapes() {
        let source = br"{\rtf1 Caf\'e9 \{braces\} back\\slash \u8364? euro}";
        let text = rtf_to_text(source).unwrap();
        assert_eq!(text, "Caf\u{e9} {braces} back\\slash \u{20ac} euro");
    }

    #[test]
    fn test_rtf_skips_ignorable_destinations() {
        let source = br"{\rtf1{\*\generator Riched20;}{\info{\title Secret}}Visible text\par}";
        let text = rtf_to_text(source).unwrap();
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn test_rtf_rejects_non_rtf() {
        let result = rtf_to_text(b"plain text, not rtf");
        assert!(matches!(
            result,
            Err(ExtractError::Malformed { format: "RTF", .. })
        ));
    }

    #[tokio::test]
    async fn test_rtf_extract_file() {
        let file = tempfile::Builder::new().suffix(".rtf").tempfile().unwrap();
        std::fs::write(file.path(), br"{\rtf1\ansi Meeting notes\par Action items}").unwrap();

        let content = RtfExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(content.text, "Meeting notes\nAction items");
        assert_eq!(content.modality, Modality::Rtf);
    }
}
