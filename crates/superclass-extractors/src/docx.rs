//! DOCX content extraction using docx-rs.

use std::path::Path;

use async_trait::async_trait;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableChild, TableRowChild};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::{read_source, Extractor};

/// Word document extractor.
///
/// Paragraphs become lines, tables become `|`-separated rows, and
/// heading or title styled paragraphs are collected as sections.
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    /// Whether to preserve table structure in output.
    preserve_tables: bool,
    /// Whether to extract headings as sections.
    extract_headings: bool,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxExtractor {
    /// Create new DOCX extractor with default settings.
    pub fn new() -> Self {
        Self {
            preserve_tables: true,
            extract_headings: true,
        }
    }

    /// Configure whether to preserve table structure.
    pub fn with_tables(mut self, preserve: bool) -> Self {
        self.preserve_tables = preserve;
        self
    }

    /// Configure whether to extract headings as sections.
    pub fn with_headings(mut self, extract: bool) -> Self {
        self.extract_headings = extract;
        self
    }

    /// Extract text synchronously (called within spawn_blocking).
    fn extract_sync(
        content: Vec<u8>,
        preserve_tables: bool,
        extract_headings: bool,
    ) -> Result<(String, Vec<String>), ExtractError> {
        let docx = docx_rs::read_docx(&content)
            .map_err(|e| ExtractError::malformed("DOCX", e.to_string()))?;

        let mut text_parts: Vec<String> = Vec::new();
        let mut headings: Vec<String> = Vec::new();

        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let para_text = Self::extract_paragraph_text(&p);

                    // Check if this is a heading (by style)
                    if extract_headings {
                        if let Some(style) = &p.property.style {
                            let style_id = style.val.to_lowercase();
                            let is_heading = style_id.starts_with("heading")
                                || style_id.contains("title");
                            if is_heading && !para_text.trim().is_empty() {
                                headings.push(para_text.trim().to_string());
                            }
                        }
                    }

                    if !para_text.trim().is_empty() {
                        text_parts.push(para_text);
                    }
                }
                DocumentChild::Table(t) => {
                    if preserve_tables {
                        let table_text = Self::extract_table_text(&t);
                        if !table_text.trim().is_empty() {
                            text_parts.push(table_text);
                        }
                    } else {
                        for row in &t.rows {
                            let TableChild::TableRow(r) = row;
                            for cell in &r.cells {
                                let TableRowChild::TableCell(c) = cell;
                                for child in &c.children {
                                    if let docx_rs::TableCellContent::Paragraph(p) = child {
                                        let cell_text = Self::extract_paragraph_text(p);
                                        if !cell_text.trim().is_empty() {
                                            text_parts.push(cell_text);
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok((text_parts.join("\n"), headings))
    }

    /// Extract text from a paragraph.
    fn extract_paragraph_text(p: &docx_rs::Paragraph) -> String {
        let mut text = String::new();

        for child in &p.children {
            match child {
                ParagraphChild::Run(r) => {
                    for run_child in &r.children {
                        match run_child {
                            RunChild::Text(t) => {
                                text.push_str(&t.text);
                            }
                            RunChild::Tab(_) => {
                                text.push('\t');
                            }
                            RunChild::Break(_) => {
                                text.push('\n');
                            }
                            _ => {}
                        }
                    }
                }
                ParagraphChild::Hyperlink(h) => {
                    for child in &h.children {
                        if let ParagraphChild::Run(r) = child {
                            for run_child in &r.children {
                                if let RunChild::Text(t) = run_child {
                                    text.push_str(&t.text);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        text
    }

    /// Extract text from a table with structure.
    fn extract_table_text(t: &docx_rs::Table) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for row in &t.rows {
            let TableChild::TableRow(r) = row;
            let mut cells: Vec<String> = Vec::new();
            for cell in &r.cells {
                let TableRowChild::TableCell(c) = cell;
                let mut cell_text = String::new();
                for child in &c.children {
                    if let docx_rs::TableCellContent::Paragraph(p) = child {
                        let para = Self::extract_paragraph_text(p);
                        if !cell_text.is_empty() && !para.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(&para);
                    }
                }
                cells.push(cell_text.trim().to_string());
            }
            rows.push(cells);
        }

        rows.iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|row| row.join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Extractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let content = read_source(path).await?;
        let size = content.len();
        let preserve_tables = self.preserve_tables;
        let extract_headings = self.extract_headings;

        let (text, headings) = tokio::task::spawn_blocking(move || {
            Self::extract_sync(content, preserve_tables, extract_headings)
        })
        .await??;
        debug!(
            path = %path.display(),
            size,
            headings = headings.len(),
            "Extracted DOCX text"
        );

        // DOCX has no inherent page structure.
        let structure = DocumentStructure {
            page_count: None,
            sections: headings,
        };

        Ok(ExtractedContent::new(text, Modality::Docx, ContentSource::path(path))
            .with_structure(structure)
            .with_metadata("original_size", size))
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".docx"]
    }

    fn name(&self) -> &str {
        "docx-rs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

    fn write_docx(docx: Docx) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        docx.build().pack(out).unwrap();
        file
    }

    fn sample() -> Docx {
        Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Vendor Agreement"))
                    .style("Heading1"),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Payment is due in 30 days.")))
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Term"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("12 months"))),
            ])]))
    }

    #[test]
    fn test_docx_extractor_creation() {
        let extractor = DocxExtractor::new();
        assert_eq!(extractor.name(), "docx-rs");
        assert!(extractor.supports("DOCX"));
        assert!(!extractor.supports(".pdf"));
    }

    #[test]
    fn test_docx_extractor_configuration() {
        let extractor = DocxExtractor::new().with_tables(false).with_headings(true);

        assert!(!extractor.preserve_tables);
        assert!(extractor.extract_headings);
    }

    #[tokio::test]
    async fn test_docx_extract_document() {
        let file = write_docx(sample());

        let content = DocxExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(content.modality, Modality::Docx);
        assert!(content.text.contains("Vendor Agreement"));
        assert!(content.text.contains("Payment is due in 30 days."));
        assert!(content.text.contains("Term | 12 months"));
        assert_eq!(content.structure.unwrap().sections, vec!["Vendor Agreement"]);
    }

    #[tokio::test]
    async fn test_docx_flat_tables() {
        let file = write_docx(sample());

        let content = DocxExtractor::new()
            .with_tables(false)
            .extract(file.path())
            .await
            .unwrap();
        assert!(content.text.contains("Term\n12 months"));
    }

    #[tokio::test]
    async fn test_docx_invalid_content() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        std::fs::write(file.path(), b"not a zip").unwrap();

        let result = DocxExtractor::new().extract(file.path()).await;
        assert!(matches!(result, Err(ExtractError::Malformed { format: "DOCX", .. })));
    }
}
