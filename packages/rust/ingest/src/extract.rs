//! Raw-bytes → text extraction, keyed by file extension.

use std::io::{Cursor, Read};

use calamine::Reader as _;
use quick_xml::events::Event;
use tracing::debug;

use trainforge_shared::{Result, TrainforgeError};

/// Extensions [`extract_text`] understands.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".markdown", ".csv", ".pdf", ".docx", ".doc", ".xlsx", ".xls",
];

const CELL_SEPARATOR: &str = " | ";

const DOCX_BODY: &str = "word/document.xml";

/// Lower-cased extension of `filename` including the dot, or `""`.
pub fn file_type_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Extract plain text from an uploaded document.
///
/// `.doc` goes through the Word XML reader, so only files that are really
/// OOXML under the old extension succeed.
pub fn extract_text(raw: &[u8], file_type: &str) -> Result<String> {
    let text = match file_type {
        ".txt" | ".md" | ".markdown" => String::from_utf8_lossy(raw).into_owned(),
        ".csv" => csv_to_text(raw)?,
        ".pdf" => pdf_extract::extract_text_from_mem(raw)
            .map_err(|e| TrainforgeError::parse(format!("PDF text extraction failed: {e}")))?,
        ".docx" | ".doc" => docx_to_text(raw)?,
        ".xlsx" | ".xls" => workbook_to_text(raw)?,
        other => return Err(TrainforgeError::unsupported_format(other)),
    };

    debug!(file_type, bytes = raw.len(), chars = text.len(), "text extracted");
    Ok(text)
}

/// Render CSV rows as ` | `-separated lines. Rows may have ragged widths.
fn csv_to_text(raw: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw);

    let mut lines = Vec::new();
    for record in reader.byte_records() {
        let record =
            record.map_err(|e| TrainforgeError::parse(format!("CSV parsing failed: {e}")))?;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            lines.push(cells.join(CELL_SEPARATOR));
        }
    }
    Ok(lines.join("\n"))
}

/// Paragraph text of a Word document, one paragraph per line. Table rows
/// become ` | `-separated lines.
fn docx_to_text(raw: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(raw))
        .map_err(|e| TrainforgeError::parse(format!("not a Word document: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| TrainforgeError::parse(format!("missing {DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| TrainforgeError::parse(format!("unreadable {DOCX_BODY}: {e}")))?;

    word_xml_to_text(&xml)
}

/// Walk `w:p`/`w:t` runs of a `document.xml` body.
fn word_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(xml);

    let mut lines: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut cell: Vec<String> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| TrainforgeError::parse(format!("malformed Word XML: {e}")))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tbl" => table_depth += 1,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| TrainforgeError::parse(format!("malformed Word XML: {e}")))?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let text = paragraph.trim().to_string();
                    paragraph.clear();
                    if text.is_empty() {
                        continue;
                    }
                    if table_depth > 0 {
                        cell.push(text);
                    } else {
                        lines.push(text);
                    }
                }
                b"w:tc" => row.push(std::mem::take(&mut cell).join(" ")),
                b"w:tr" => {
                    let cells = std::mem::take(&mut row);
                    if cells.iter().any(|c| !c.is_empty()) {
                        lines.push(cells.join(CELL_SEPARATOR));
                    }
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

/// Every worksheet as a `Sheet: <name>` line followed by its non-empty rows.
fn workbook_to_text(raw: &[u8]) -> Result<String> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(raw.to_vec()))
        .map_err(|e| TrainforgeError::parse(format!("spreadsheet could not be opened: {e}")))?;

    let mut sections = Vec::new();
    for (name, range) in workbook.worksheets() {
        let mut lines = vec![format!("Sheet: {name}")];
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string().trim().to_string()).collect();
            if cells.iter().any(|c| !c.is_empty()) {
                lines.push(cells.join(CELL_SEPARATOR));
            }
        }
        sections.push(lines.join("\n"));
    }
    Ok(sections.join("\n\n"))
}
