// SQLite row decoding into typed cells

use crate::error::map_sqlx_error;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tablepoll_core::domain::CellValue;
use tablepoll_core::error::Result;

pub(crate) fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub(crate) fn decode_row(row: &SqliteRow) -> Result<Vec<CellValue>> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

/// Decode by the value's storage class, not the declared column type
fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue> {
    let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let cell = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => CellValue::Int(
            row.try_get_unchecked::<i64, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        "REAL" | "NUMERIC" => CellValue::Float(
            row.try_get_unchecked::<f64, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        "BLOB" => CellValue::Bytes(
            row.try_get_unchecked::<Vec<u8>, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        _ => CellValue::Text(
            row.try_get_unchecked::<String, _>(index)
                .map_err(map_sqlx_error)?,
        ),
    };
    Ok(cell)
}
