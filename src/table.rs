//! Turns a raw grid of spreadsheet cells into a rectangular table.
//!
//! Spreadsheet ranges come back ragged: leading blank rows, blank header
//! cells, rows shorter or longer than the header. Normalization detects the
//! header row, deduplicates column names, pads/truncates every data row to
//! the header width and coerces numeric-looking columns to `f64`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw cell grid as returned by a spreadsheet values fetch. Rows may have
/// unequal length.
pub type CellGrid = Vec<Vec<String>>;

/// A single table value: a parsed number or the original trimmed string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view used when rolling up totals. Blank or unparseable text
    /// counts as zero, never as missing.
    pub fn amount(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_number(s).unwrap_or(0.0),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Rectangular table: every row holds exactly `columns.len()` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Rows rendered as JSON objects keyed by column name, the shape fed
    /// back to the model as a tool result.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = serde_json::Map::new();
                for (column, value) in self.columns.iter().zip(row) {
                    let json = match value {
                        CellValue::Number(n) => serde_json::json!(n),
                        CellValue::Text(s) => serde_json::json!(s),
                    };
                    record.insert(column.clone(), json);
                }
                record
            })
            .collect()
    }
}

/// Parses a numeric cell: surrounding whitespace stripped, thousands
/// separator commas removed. Blank cells do not parse.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Normalizes a raw cell grid into a rectangular table.
///
/// The header row is the first row containing any non-blank cell; rows
/// before it are discarded and a grid with no such row yields an empty
/// table rather than an error. Blank header cells are dropped and repeated
/// labels are suffixed `_2`, `_3`, … in order of appearance. Data rows are
/// truncated or padded with empty strings to the header width, and each
/// column is coerced to numbers only when every one of its cells parses.
pub fn normalize(grid: &CellGrid) -> NormalizedTable {
    let header_idx = match grid.iter().position(|row| !is_blank_row(row)) {
        Some(idx) => idx,
        None => return NormalizedTable::default(),
    };

    let mut columns = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for cell in &grid[header_idx] {
        let label = cell.trim();
        if label.is_empty() {
            continue;
        }
        let count = occurrences.entry(label.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            columns.push(label.to_string());
        } else {
            columns.push(format!("{}_{}", label, count));
        }
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for row in &grid[header_idx + 1..] {
        if row.is_empty() || is_blank_row(row) {
            continue;
        }
        let mut cells: Vec<String> = row
            .iter()
            .take(columns.len())
            .map(|cell| cell.trim().to_string())
            .collect();
        cells.resize(columns.len(), String::new());
        raw_rows.push(cells);
    }

    let mut rows: Vec<Vec<CellValue>> = raw_rows
        .iter()
        .map(|row| row.iter().map(|cell| CellValue::Text(cell.clone())).collect())
        .collect();

    // All-or-nothing coercion: a column becomes numeric only if every cell
    // in it parses, otherwise the whole column stays textual.
    for col in 0..columns.len() {
        let parsed: Option<Vec<f64>> = raw_rows.iter().map(|row| parse_number(&row[col])).collect();
        if let Some(numbers) = parsed {
            for (row, number) in rows.iter_mut().zip(numbers) {
                row[col] = CellValue::Number(number);
            }
        }
    }

    NormalizedTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> CellGrid {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty_grid_yields_empty_table() {
        assert!(normalize(&Vec::new()).is_empty());
        assert!(normalize(&grid(&[&["", "  ", ""], &[""]])).is_empty());
    }

    #[test]
    fn test_header_detection_skips_blank_rows() {
        let input = grid(&[
            &["", ""],
            &[],
            &["", "", ""],
            &["", "", "Label", "Dec/24", "Jan/25"],
            &["", "", "Revenue", "100", "200"],
        ]);
        let table = normalize(&input);
        assert_eq!(table.columns, vec!["Label", "Dec/24", "Jan/25"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_duplicate_column_names_are_suffixed() {
        let input = grid(&[&["A", "B", "A"]]);
        let table = normalize(&input);
        assert_eq!(table.columns, vec!["A", "B", "A_2"]);
    }

    #[test]
    fn test_triplicate_column_names() {
        let input = grid(&[&["X", "X", "X"]]);
        let table = normalize(&input);
        assert_eq!(table.columns, vec!["X", "X_2", "X_3"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let input = grid(&[&["A", "B", "C", "D"], &["only", "two"]]);
        let table = normalize(&input);
        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.rows[0][2], CellValue::Text(String::new()));
        assert_eq!(table.rows[0][3], CellValue::Text(String::new()));
        assert_eq!(table.rows[0][3].amount(), 0.0);
    }

    #[test]
    fn test_long_rows_are_truncated() {
        let input = grid(&[&["A", "B"], &["1", "2", "3", "4"]]);
        let table = normalize(&input);
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn test_blank_data_rows_are_skipped() {
        let input = grid(&[&["A", "B"], &["", " "], &[], &["x", "y"]]);
        let table = normalize(&input);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_all_or_nothing_numeric_coercion() {
        let input = grid(&[
            &["Label", "Amount"],
            &["100", "100"],
            &["200", "1,234.50"],
            &["n/a", "-20"],
        ]);
        let table = normalize(&input);
        // First column contains "n/a", so it stays textual.
        assert_eq!(table.rows[0][0], CellValue::Text("100".to_string()));
        assert_eq!(table.rows[2][0], CellValue::Text("n/a".to_string()));
        // Second column parses everywhere, commas stripped.
        assert_eq!(table.rows[0][1], CellValue::Number(100.0));
        assert_eq!(table.rows[1][1], CellValue::Number(1234.5));
        assert_eq!(table.rows[2][1], CellValue::Number(-20.0));
    }

    #[test]
    fn test_blank_cell_blocks_column_coercion() {
        let input = grid(&[&["Label", "V"], &["a", "1"], &["b", ""]]);
        let table = normalize(&input);
        assert_eq!(table.rows[0][1], CellValue::Text("1".to_string()));
        // Still zero when summed.
        assert_eq!(table.rows[1][1].amount(), 0.0);
        assert_eq!(table.rows[0][1].amount(), 1.0);
    }

    #[test]
    fn test_normalization_is_idempotent_on_input() {
        let input = grid(&[&["A", "B"], &["1", "x"], &["2", "y"]]);
        let first = normalize(&input);
        let second = normalize(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_records_shape() {
        let input = grid(&[&["Label", "V"], &["Sales", "10"]]);
        let table = normalize(&input);
        let records = table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Label"], serde_json::json!("Sales"));
        assert_eq!(records[0]["V"], serde_json::json!(10.0));
    }
}
