//! CSV writer

use super::{value_text, Row};
use crate::error::Result;
use std::path::Path;

/// Write `rows` as UTF-8 CSV with CRLF record terminators.
///
/// Rows may have different lengths.
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .terminator(::csv::Terminator::CRLF)
        .from_path(path)?;

    for row in rows {
        writer.write_record(row.iter().map(value_text))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_preserved_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            vec![json!("a"), json!("b")],
            vec![json!("1"), json!("2")],
        ];
        write_csv(&path, &rows).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\r\n1,2\r\n");
    }

    #[test]
    fn test_quoting_and_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            vec![json!("name"), json!("note"), json!("n")],
            vec![json!("x, y"), json!("say \"hi\"")],
            vec![json!(3.5), json!(true), json!(null)],
        ];
        write_csv(&path, &rows).unwrap();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .unwrap();
        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], vec!["x, y", "say \"hi\""]);
        assert_eq!(records[2], vec!["3.5", "true", ""]);
    }

    #[test]
    fn test_empty_rows_produce_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &[]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }
}
