//! Spreadsheet extraction via calamine.
//!
//! Each worksheet is rendered as a `Sheet: <name>` header followed by one
//! tab-separated line per row that has at least one non-empty cell.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::{read_source, Extractor};

const FORMAT: &str = "XLSX";

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn extract_sync(bytes: Vec<u8>) -> ExtractResult<Vec<(String, String)>> {
    let mut workbook: Xlsx<Cursor<Vec<u8>>> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| ExtractError::malformed(FORMAT, e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::malformed(FORMAT, format!("sheet '{}': {}", name, e)))?;

        let rows: Vec<String> = range
            .rows()
            .filter_map(|row| {
                let cells: Vec<String> = row
                    .iter()
                    .map(cell_text)
                    .filter(|c| !c.is_empty())
                    .collect();
                (!cells.is_empty()).then(|| cells.join("\t"))
            })
            .collect();

        sheets.push((name, rows.join("\n")));
    }
    Ok(sheets)
}

/// Excel workbook extractor (`.xlsx`, `.xlsm`).
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    /// Create new spreadsheet extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for SpreadsheetExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let bytes = read_source(path).await?;
        let sheets = tokio::task::spawn_blocking(move || extract_sync(bytes)).await??;
        debug!(path = %path.display(), sheets = sheets.len(), "Extracted workbook");

        let pages: Vec<String> = sheets
            .iter()
            .map(|(name, body)| {
                if body.is_empty() {
                    format!("Sheet: {}", name)
                } else {
                    format!("Sheet: {}\n{}", name, body)
                }
            })
            .collect();

        Ok(
            ExtractedContent::new(pages.join("\n\n"), Modality::Spreadsheet, ContentSource::path(path))
                .with_structure(DocumentStructure {
                    page_count: Some(sheets.len()),
                    sections: sheets.into_iter().map(|(name, _)| name).collect(),
                }),
        )
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".xlsx", ".xlsm"]
    }

    fn name(&self) -> &str {
        "calamine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::zip_file;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Budget" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Item</t></is></c><c r="B1" t="inlineStr"><is><t>Cost</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Servers</t></is></c><c r="B2"><v>1200</v></c></row>
</sheetData>
</worksheet>"#;

    #[tokio::test]
    async fn test_spreadsheet_extract() {
        let file = zip_file(
            ".xlsx",
            &[
                ("[Content_Types].xml", CONTENT_TYPES),
                ("_rels/.rels", ROOT_RELS),
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/worksheets/sheet1.xml", SHEET),
            ],
        );

        let content = SpreadsheetExtractor::new()
            .extract(file.path())
            .await
            .unwrap();
        assert_eq!(content.modality, Modality::Spreadsheet);
        assert_eq!(content.text, "Sheet: Budget\nItem\tCost\nServers\t1200");
        assert_eq!(content.structure.unwrap().sections, vec!["Budget"]);
    }

    #[tokio::test]
    async fn test_spreadsheet_rejects_non_workbook() {
        let file = zip_file(".xlsx", &[("readme.txt", "hello")]);
        let result = SpreadsheetExtractor::new().extract(file.path()).await;
        assert!(matches!(
            result,
            Err(ExtractError::Malformed { format: "XLSX", .. })
        ));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  padded ".into())), "padded");
        assert_eq!(cell_text(&Data::Int(7)), "7");
    }
}
