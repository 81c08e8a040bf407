//! CSV loading and validation
//!
//! A valid input has a header row, `n-1` numeric attribute columns and a
//! symbolic decision column in last position.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};

use crate::data::table::DecisionTable;
use crate::util::format_bytes;
use crate::{DiscretizeError, Result};

/// Load a decision table from a CSV file.
///
/// # Errors
/// - `NotFound` if the file does not exist
/// - `EmptyFile` if it has zero bytes
/// - `NoData` if it has no header or no data rows
/// - `InvalidData` if the column layout is not `n-1` numeric attributes
///   followed by a symbolic decision, or an attribute value is missing
pub fn load_data<P: AsRef<Path>>(path: P) -> Result<DecisionTable> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DiscretizeError::NotFound(path.to_path_buf()));
    }

    let size = fs::metadata(path)?.len();
    if size == 0 {
        return Err(DiscretizeError::EmptyFile(path.to_path_buf()));
    }
    debug!("Reading {} ({})", path.display(), format_bytes(size));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DiscretizeError::NoData(path.to_path_buf()));
    }

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;
    if records.is_empty() {
        return Err(DiscretizeError::NoData(path.to_path_buf()));
    }

    let numeric: Vec<bool> = (0..headers.len())
        .map(|column| is_numeric_column(&records, column))
        .collect();
    let numeric_names: Vec<&str> = headers
        .iter()
        .zip(&numeric)
        .filter(|(_, numeric)| **numeric)
        .map(|(name, _)| name.as_str())
        .collect();
    info!(
        "Numeric columns identified for discretization: {:?}",
        numeric_names
    );

    if headers.len() < 2 {
        return Err(DiscretizeError::InvalidData(
            "the dataset must contain at least one attribute and one decision column".to_string(),
        ));
    }

    let attribute_count = headers.len() - 1;
    let layout_ok = numeric_names.len() == attribute_count
        && numeric[..attribute_count].iter().all(|n| *n)
        && !numeric[attribute_count];
    if !layout_ok {
        return Err(DiscretizeError::InvalidData(
            "expected n-1 numerical columns and a decision one (nth)".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut decisions = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(attribute_count);
        for (column, name) in headers.iter().enumerate().take(attribute_count) {
            let value = record.get(column).and_then(parse_number).ok_or_else(|| {
                DiscretizeError::InvalidData(format!(
                    "missing value in row {}, column '{}'",
                    index + 1,
                    name
                ))
            })?;
            row.push(value);
        }

        let decision = record.get(attribute_count).unwrap_or_default();
        if decision.is_empty() {
            return Err(DiscretizeError::InvalidData(format!(
                "missing decision in row {}",
                index + 1
            )));
        }

        rows.push(row);
        decisions.push(decision.to_string());
    }

    let mut headers = headers;
    let decision = headers.pop().unwrap_or_default();
    let table = DecisionTable::new(headers, decision, rows, decisions)?;

    info!(
        "Loaded {} objects with {} attributes from {}",
        table.num_objects(),
        table.num_attributes(),
        path.display()
    );
    Ok(table)
}

/// Split a table's columns into condition attributes and the decision.
pub fn prepare_for_discretization(table: &DecisionTable) -> (Vec<String>, String) {
    (
        table.attribute_names().to_vec(),
        table.decision_name().to_string(),
    )
}

/// Parse a finite number; empty cells and NaN/inf count as non-numeric.
fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A column is numeric when it has at least one value and every non-empty
/// cell parses as a finite number.
fn is_numeric_column(records: &[StringRecord], column: usize) -> bool {
    let mut seen_value = false;
    for record in records {
        let cell = record.get(column).unwrap_or_default();
        if cell.is_empty() {
            continue;
        }
        if parse_number(cell).is_none() {
            return false;
        }
        seen_value = true;
    }
    seen_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "valid.csv",
            "attr1,attr2,decision\n1.0,0.5,A\n2,1.5,B\n3.0, 2.5 ,A\n",
        );

        let table = load_data(&path).unwrap();
        assert_eq!(table.header(), vec!["attr1", "attr2", "decision"]);
        assert_eq!(table.num_objects(), 3);
        assert_eq!(table.value(1, 0), 2.0);
        assert_eq!(table.value(2, 1), 2.5);
        assert_eq!(table.decisions(), ["A", "B", "A"]);

        let (attributes, decision) = prepare_for_discretization(&table);
        assert_eq!(attributes, vec!["attr1", "attr2"]);
        assert_eq!(decision, "decision");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_data(dir.path().join("nope.csv"));
        assert!(matches!(result, Err(DiscretizeError::NotFound(_))));
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "");
        assert!(matches!(load_data(&path), Err(DiscretizeError::EmptyFile(_))));
    }

    #[test]
    fn test_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "header.csv", "a,b,class\n");
        assert!(matches!(load_data(&path), Err(DiscretizeError::NoData(_))));
    }

    #[test]
    fn test_symbolic_attribute_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "sym.csv", "a,b,class\n1,red,x\n2,blue,y\n");
        assert!(matches!(load_data(&path), Err(DiscretizeError::InvalidData(_))));
    }

    #[test]
    fn test_numeric_decision_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "num.csv", "a,b,class\n1,2,0\n2,3,1\n");
        assert!(matches!(load_data(&path), Err(DiscretizeError::InvalidData(_))));
    }

    #[test]
    fn test_missing_attribute_value() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "gap.csv", "a,b,class\n1,2,x\n,3,y\n");
        match load_data(&path) {
            Err(DiscretizeError::InvalidData(msg)) => assert!(msg.contains("row 2")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "ragged.csv", "a,b,class\n1,2,x\n3,y\n");
        assert!(matches!(load_data(&path), Err(DiscretizeError::Csv(_))));
    }
}
