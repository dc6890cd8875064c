// Row Batch (cycle-scoped query result)

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// One typed column value as reported by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    UInt(u64),
    /// Single-precision column, kept narrow so it renders without widening noise
    Float32(f32),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Integer view used by the max-id offset strategy
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            CellValue::UInt(v) => i64::try_from(*v).ok(),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Bytes are rendered as lossy UTF-8 here; the materializer applies the
/// configured charset instead.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::UInt(v) => write!(f, "{}", v),
            CellValue::Float32(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// Ordered rows of one poll cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RowBatch {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Largest integer value of a column (nulls and non-integers skipped)
    pub fn max_int(&self, index: usize) -> Option<i64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).and_then(CellValue::as_i64))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> RowBatch {
        RowBatch::with_rows(
            vec!["ID".to_string(), "name".to_string()],
            vec![
                vec![CellValue::Int(4), CellValue::Text("a".to_string())],
                vec![CellValue::Null, CellValue::Text("b".to_string())],
                vec![CellValue::Int(9), CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let b = batch();
        assert_eq!(b.column_index("id"), Some(0));
        assert_eq!(b.column_index("NAME"), Some(1));
        assert_eq!(b.column_index("missing"), None);
    }

    #[test]
    fn test_max_int_skips_nulls() {
        let b = batch();
        assert_eq!(b.max_int(0), Some(9));
        assert_eq!(b.max_int(1), None);
        assert_eq!(RowBatch::new(vec!["id".to_string()]).max_int(0), None);
    }

    #[test]
    fn test_display_cells() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Float32(1.1).to_string(), "1.1");
        assert_eq!(CellValue::UInt(7).to_string(), "7");
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2024-03-01 12:30:05");
        assert_eq!(CellValue::Date(dt.date()).to_string(), "2024-03-01");
    }
}
