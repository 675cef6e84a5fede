//! Format writers
//!
//! Each writer turns abstract content (rows, paragraphs, text or bytes) into
//! a concrete file, synchronously:
//! - [`spreadsheet`]: rows → `.xlsx` workbook with one default sheet
//! - [`csv`]: rows → CRLF-terminated UTF-8 CSV
//! - [`pdf`]: paragraphs → PDF with fixed spacing between paragraphs
//! - [`text`]: verbatim text (with XML declaration handling) and raw bytes
//!
//! [`write_content`] dispatches loosely typed JSON content, as received for
//! archive members, to the right writer.

pub mod csv;
pub mod pdf;
pub mod spreadsheet;
pub mod text;

use crate::error::{Error, Result};
use base64::Engine as _;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One spreadsheet/CSV row as received from the caller
pub type Row = Vec<Value>;

/// Formats whose content is written verbatim and must be present
const TEXT_FORMATS: &[&str] = &[
    "py", "cs", "txt", "md", "json", "xml", "yml", "yaml", "sh", "bat", "ps1",
];

/// Output format of a generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
    /// PDF document
    Pdf,
    /// Zip archive supplied as base64
    Zip,
    /// 7z archive supplied as base64
    SevenZ,
    /// Source code or plain text that requires content
    Text(String),
    /// Anything else, written verbatim
    Other(String),
}

impl Format {
    /// Map a format tag or extension (without the dot) to a format
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().trim_start_matches('.').to_lowercase();
        match tag.as_str() {
            "xlsx" => Format::Xlsx,
            "csv" => Format::Csv,
            "pdf" => Format::Pdf,
            "zip" => Format::Zip,
            "7z" => Format::SevenZ,
            t if TEXT_FORMATS.contains(&t) => Format::Text(tag),
            "" => Format::Text("txt".to_string()),
            _ => Format::Other(tag),
        }
    }

    /// File extension (without the dot)
    pub fn extension(&self) -> &str {
        match self {
            Format::Xlsx => "xlsx",
            Format::Csv => "csv",
            Format::Pdf => "pdf",
            Format::Zip => "zip",
            Format::SevenZ => "7z",
            Format::Text(ext) | Format::Other(ext) => ext,
        }
    }

    /// Whether writing this format fails without content
    pub fn requires_content(&self) -> bool {
        matches!(self, Format::Text(_))
    }
}

/// Render a JSON value as the text of a single cell or paragraph
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret loosely typed content as rows; scalars become one-cell rows.
pub fn value_rows(content: Option<&Value>) -> Vec<Row> {
    match content {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => cells.clone(),
                scalar => vec![scalar.clone()],
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(scalar) => vec![vec![scalar.clone()]],
    }
}

/// Process-wide writer settings
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// TrueType font embedded in PDFs instead of built-in Helvetica
    pub pdf_font: Option<PathBuf>,
}

/// Write loosely typed `content` to `path` according to `format`.
pub fn write_content(
    path: &Path,
    format: &Format,
    content: Option<&Value>,
    options: &WriteOptions,
) -> Result<()> {
    if matches!(format, Format::Zip | Format::SevenZ) {
        if let Some(Value::String(encoded)) = content.filter(|c| c.as_str() != Some("")) {
            match base64::engine::general_purpose::STANDARD.decode(encoded) {
                Ok(raw) => return text::write_bytes(path, &raw),
                Err(e) => {
                    tracing::warn!(
                        file = %path.display(),
                        error = %e,
                        "Archive payload is not valid base64; writing it as text"
                    );
                }
            }
        }
    }

    match format {
        Format::Text(_) => {
            let content = content
                .filter(|c| !c.is_null())
                .ok_or_else(|| Error::InvalidInput(format!("Missing 'content' for {}", path.display())))?;
            text::write_text(path, &content_text(content)?)
        }
        Format::Pdf => {
            let paragraphs: Vec<String> = match content {
                Some(Value::Array(items)) => items.iter().map(value_text).collect(),
                Some(other) => vec![value_text(other)],
                None => vec![String::new()],
            };
            pdf::write_pdf(path, &paragraphs, options.pdf_font.as_deref())
        }
        Format::Xlsx => {
            let rows = match content {
                Some(Value::Array(_)) => value_rows(content),
                _ => Vec::new(),
            };
            spreadsheet::write_xlsx(path, &rows)
        }
        Format::Csv => csv::write_csv(path, &value_rows(content)),
        Format::Zip | Format::SevenZ | Format::Other(_) => match content {
            None | Some(Value::Null) => text::write_text(path, ""),
            Some(value) => text::write_text(path, &content_text(value)?),
        },
    }
}

fn content_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}
