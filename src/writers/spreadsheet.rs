//! Spreadsheet (`.xlsx`) writer

use super::Row;
use crate::error::{Error, Result};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::Value;
use std::path::Path;

/// Write `rows` into the first sheet of a new workbook, one row per input
/// row starting at the top-left cell.
///
/// Strings, numbers and booleans keep their type; `null` leaves the cell
/// empty; nested arrays/objects are stored as their JSON text.
pub fn write_xlsx(path: &Path, rows: &[Row]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (r, row) in rows.iter().enumerate() {
        let r = u32::try_from(r)
            .map_err(|_| Error::InvalidInput("Too many rows for a worksheet".to_string()))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c)
                .map_err(|_| Error::InvalidInput("Too many columns for a worksheet".to_string()))?;
            match cell {
                Value::Null => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(r, c, *b).map_err(xlsx_error)?;
                }
                Value::Number(n) => match n.as_f64() {
                    Some(f) => {
                        worksheet.write_number(r, c, f).map_err(xlsx_error)?;
                    }
                    None => {
                        worksheet.write_string(r, c, n.to_string()).map_err(xlsx_error)?;
                    }
                },
                Value::String(s) => {
                    worksheet.write_string(r, c, s.as_str()).map_err(xlsx_error)?;
                }
                other => {
                    worksheet.write_string(r, c, other.to_string()).map_err(xlsx_error)?;
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_error)?;
    Ok(())
}

fn xlsx_error(e: XlsxError) -> Error {
    Error::Spreadsheet(e.to_string())
}
