//! CSV reading and writing for the train/predict inputs.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use predictor_structs::{CellValue, DataRow, INDEX_COLUMN, RowIndex, TabularData};

/// One parsed line: header name to coerced cell value.
pub type CsvRecord = BTreeMap<String, CellValue>;

/// Header and records of a CSV document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
    pub header: Vec<String>,
    pub rows: Vec<CsvRecord>,
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Parses CSV text.
///
/// The first non-blank line is the header. Cells are trimmed and coerced to
/// numbers when they parse as one. Cells beyond the header are dropped and
/// missing trailing cells are left out of the record. Blank lines are
/// skipped.
///
/// # Errors
///
/// Returns an error if the text is not readable as CSV.
pub fn parse_csv(text: &str) -> Result<ParsedCsv, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.trim().as_bytes());

    let mut records = reader.records().filter(|record| {
        record.as_ref().map_or(true, |record| !is_blank(record))
    });

    let Some(header) = records.next().transpose()? else {
        return Ok(ParsedCsv::default());
    };
    let header: Vec<String> = header.iter().map(str::to_owned).collect();

    let rows: Vec<CsvRecord> = records
        .map(|record| {
            let record = record?;
            Ok(header
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.clone(), CellValue::coerce(cell)))
                .collect::<CsvRecord>())
        })
        .collect::<Result<_, csv::Error>>()?;

    Ok(ParsedCsv { header, rows })
}

impl ParsedCsv {
    /// Converts the records into the row-set sent to the API.
    ///
    /// A record's own `index` column becomes its index; records without one
    /// get their zero-based position.
    #[must_use]
    pub fn to_row_set(&self) -> TabularData {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let mut columns = record.clone();
                let index = columns
                    .remove(INDEX_COLUMN)
                    .map_or_else(|| RowIndex::from(position), |value| RowIndex::from(&value));
                DataRow { index, columns }
            })
            .collect();

        TabularData { rows }
    }

    /// Writes the header and records back out as CSV text.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for record in &self.rows {
            writer.write_record(
                self.header
                    .iter()
                    .map(|name| record.get(name).map(ToString::to_string).unwrap_or_default()),
            )?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let parsed = parse_csv("a,b\n1,2\n3,4").unwrap();
        assert_eq!(parsed.header, vec!["a", "b"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["a"], CellValue::Number(1.0));
        assert_eq!(parsed.rows[1]["b"], CellValue::Number(4.0));

        let row_set = serde_json::to_value(parsed.to_row_set()).unwrap();
        assert_eq!(
            row_set,
            json!({"rows": [
                {"a": 1.0, "b": 2.0, "index": 0},
                {"a": 3.0, "b": 4.0, "index": 1}
            ]})
        );
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let parsed =
            parse_csv("\r\n  x , label \r\n\r\n 1.5 , red \r\n   \r\n2,blue\r\n").unwrap();
        assert_eq!(parsed.header, vec!["x", "label"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["x"], CellValue::Number(1.5));
        assert_eq!(parsed.rows[0]["label"], CellValue::Text("red".to_owned()));
        assert_eq!(parsed.rows[1]["label"], CellValue::Text("blue".to_owned()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_csv("").unwrap(), ParsedCsv::default());
        assert_eq!(parse_csv(" \n\n ").unwrap(), ParsedCsv::default());
        assert!(parse_csv("a,b").unwrap().rows.is_empty());
    }

    #[test]
    fn test_short_and_long_lines() {
        let parsed = parse_csv("a,b,c\n1\n1,2,3,4").unwrap();
        assert_eq!(parsed.rows[0].len(), 1);
        assert!(!parsed.rows[0].contains_key("b"));
        assert_eq!(parsed.rows[1].len(), 3);
    }

    #[test]
    fn test_quoted_cell_keeps_comma() {
        let parsed = parse_csv("city,x\n\"Oslo, Norway\",1").unwrap();
        assert_eq!(parsed.rows[0].len(), 2);
        assert_eq!(
            parsed.rows[0]["city"],
            CellValue::Text("Oslo, Norway".to_owned())
        );
        assert_eq!(parsed.rows[0]["x"], CellValue::Number(1.0));
    }

    #[test]
    fn test_empty_cells_are_zero() {
        let parsed = parse_csv("x,y\n,3").unwrap();
        assert_eq!(parsed.rows[0]["x"], CellValue::Number(0.0));
    }

    #[test]
    fn test_explicit_index_preserved() {
        let parsed = parse_csv("index,x\n10,1\nrow-b,2\n,3").unwrap();
        let rows = parsed.to_row_set().rows;
        assert_eq!(rows[0].index, RowIndex::Int(10));
        assert_eq!(rows[1].index, RowIndex::Text("row-b".to_owned()));
        assert_eq!(rows[2].index, RowIndex::Int(0));
        assert!(rows.iter().all(|row| !row.columns.contains_key(INDEX_COLUMN)));
    }

    #[test]
    fn test_missing_index_uses_position() {
        let rows = parse_csv("x\n5\n6\n7").unwrap().to_row_set().rows;
        let indices: Vec<RowIndex> = rows.into_iter().map(|row| row.index).collect();
        assert_eq!(indices, vec![RowIndex::Int(0), RowIndex::Int(1), RowIndex::Int(2)]);
    }

    #[test]
    fn test_reparse_preserves_rows_and_columns() {
        let original = parse_csv("x, y ,city\n1,2.5,Oslo\n-3,4,\"Bergen, NO\"\n").unwrap();
        let reparsed = parse_csv(&original.to_csv().unwrap()).unwrap();
        assert_eq!(reparsed.header, original.header);
        assert_eq!(reparsed.rows.len(), original.rows.len());
        assert_eq!(reparsed, original);
    }
}
