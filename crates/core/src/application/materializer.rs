// Row Materializer - typed rows to delimited text records

use crate::domain::{CellValue, ResultCharset, RowBatch};

/// Separator between cells of one record
pub const FIELD_DELIMITER: char = ',';

/// Flattens a batch into one text record per row
///
/// Cells are joined with [`FIELD_DELIMITER`] and nulls render as empty
/// segments. Delimiters inside a cell are NOT escaped, so a cell containing
/// a comma cannot be split back out of its record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowMaterializer {
    charset: ResultCharset,
}

impl RowMaterializer {
    pub fn new(charset: ResultCharset) -> Self {
        Self { charset }
    }

    pub fn charset(&self) -> ResultCharset {
        self.charset
    }

    pub fn materialize(&self, batch: &RowBatch) -> Vec<String> {
        batch.rows().iter().map(|row| self.render_row(row)).collect()
    }

    fn render_row(&self, row: &[CellValue]) -> String {
        let mut record = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                record.push(FIELD_DELIMITER);
            }
            match cell {
                CellValue::Null => {}
                CellValue::Bytes(bytes) => record.push_str(&self.charset.decode(bytes)),
                other => record.push_str(&other.to_string()),
            }
        }
        record
    }
}
