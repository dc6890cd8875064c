// MySQL row decoding into typed cells

use crate::error::map_sqlx_error;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tablepoll_core::domain::CellValue;
use tablepoll_core::error::Result;

/// How a MySQL column type is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    Signed,
    Unsigned,
    Float32,
    Float64,
    Date,
    Time,
    DateTime,
    Binary,
    Text,
}

/// Map a sqlx MySQL type name to a decoding kind
///
/// DECIMAL, ENUM, SET and JSON arrive as strings and stay text.
pub(crate) fn cell_kind(type_name: &str) -> CellKind {
    let name = type_name.to_ascii_uppercase();
    match name.as_str() {
        n if n.ends_with(" UNSIGNED") => CellKind::Unsigned,
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            CellKind::Signed
        }
        "FLOAT" => CellKind::Float32,
        "DOUBLE" => CellKind::Float64,
        "DATE" => CellKind::Date,
        "TIME" => CellKind::Time,
        "DATETIME" | "TIMESTAMP" => CellKind::DateTime,
        "BINARY" | "VARBINARY" | "BIT" | "GEOMETRY" => CellKind::Binary,
        n if n.ends_with("BLOB") => CellKind::Binary,
        _ => CellKind::Text,
    }
}

pub(crate) fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub(crate) fn decode_row(row: &MySqlRow) -> Result<Vec<CellValue>> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

fn decode_cell(row: &MySqlRow, index: usize) -> Result<CellValue> {
    let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }
    let kind = cell_kind(raw.type_info().name());

    let cell = match kind {
        CellKind::Signed => CellValue::Int(get::<i64>(row, index)?),
        CellKind::Unsigned => CellValue::UInt(get::<u64>(row, index)?),
        CellKind::Float32 => CellValue::Float32(get::<f32>(row, index)?),
        CellKind::Float64 => CellValue::Float(get::<f64>(row, index)?),
        CellKind::Date => match row.try_get_unchecked::<NaiveDate, _>(index) {
            Ok(date) => CellValue::Date(date),
            Err(_) => CellValue::Text(raw_temporal_text(&get::<Vec<u8>>(row, index)?, false)),
        },
        CellKind::DateTime => match row.try_get_unchecked::<NaiveDateTime, _>(index) {
            Ok(dt) => CellValue::DateTime(dt),
            Err(_) => CellValue::Text(raw_temporal_text(&get::<Vec<u8>>(row, index)?, true)),
        },
        // Negative or over-24h durations are valid TIME values
        CellKind::Time => match row.try_get_unchecked::<NaiveTime, _>(index) {
            Ok(time) => CellValue::Time(time),
            Err(_) => CellValue::Text(get::<MySqlTime>(row, index)?.to_string()),
        },
        CellKind::Binary => CellValue::Bytes(get::<Vec<u8>>(row, index)?),
        CellKind::Text => CellValue::Text(get::<String>(row, index)?),
    };
    Ok(cell)
}

/// Render a DATE/DATETIME chrono cannot represent (zero dates, day 0)
///
/// Binary values are `[len, year_lo, year_hi, month, day, h, m, s, micros(4)]`
/// with trailing parts omitted when zero; `len == 0` is the all-zero date.
/// Anything else is taken as text-protocol bytes.
pub(crate) fn raw_temporal_text(buf: &[u8], with_time: bool) -> String {
    let binary = buf
        .split_first()
        .filter(|(len, body)| **len as usize == body.len() && matches!(body.len(), 0 | 4 | 7 | 11));
    let Some((_, body)) = binary else {
        return String::from_utf8_lossy(buf).into_owned();
    };

    let byte = |i: usize| body.get(i).copied().unwrap_or(0);
    let year = u16::from_le_bytes([byte(0), byte(1)]);
    let mut out = format!("{:04}-{:02}-{:02}", year, byte(2), byte(3));
    if with_time {
        out.push_str(&format!(" {:02}:{:02}:{:02}", byte(4), byte(5), byte(6)));
        let micros = u32::from_le_bytes([byte(7), byte(8), byte(9), byte(10)]);
        if micros != 0 {
            out.push_str(&format!(".{:06}", micros));
        }
    }
    out
}

fn get<'r, T>(row: &'r MySqlRow, index: usize) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::MySql>,
{
    row.try_get_unchecked::<T, _>(index).map_err(map_sqlx_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_kinds() {
        assert_eq!(cell_kind("BIGINT"), CellKind::Signed);
        assert_eq!(cell_kind("INT"), CellKind::Signed);
        assert_eq!(cell_kind("BOOLEAN"), CellKind::Signed);
        assert_eq!(cell_kind("BIGINT UNSIGNED"), CellKind::Unsigned);
        assert_eq!(cell_kind("tinyint unsigned"), CellKind::Unsigned);
    }

    #[test]
    fn test_temporal_kinds() {
        assert_eq!(cell_kind("DATE"), CellKind::Date);
        assert_eq!(cell_kind("TIME"), CellKind::Time);
        assert_eq!(cell_kind("DATETIME"), CellKind::DateTime);
        assert_eq!(cell_kind("TIMESTAMP"), CellKind::DateTime);
    }

    #[test]
    fn test_binary_and_text_kinds() {
        assert_eq!(cell_kind("VARBINARY"), CellKind::Binary);
        assert_eq!(cell_kind("MEDIUMBLOB"), CellKind::Binary);
        assert_eq!(cell_kind("VARCHAR"), CellKind::Text);
        assert_eq!(cell_kind("TEXT"), CellKind::Text);
        assert_eq!(cell_kind("DECIMAL"), CellKind::Text);
        assert_eq!(cell_kind("JSON"), CellKind::Text);
        assert_eq!(cell_kind("ENUM"), CellKind::Text);
    }

    #[test]
    fn test_float_kinds() {
        assert_eq!(cell_kind("FLOAT"), CellKind::Float32);
        assert_eq!(cell_kind("DOUBLE"), CellKind::Float64);
    }

    #[test]
    fn test_zero_dates_render_as_text() {
        assert_eq!(raw_temporal_text(&[0], false), "0000-00-00");
        assert_eq!(raw_temporal_text(&[0], true), "0000-00-00 00:00:00");
    }

    #[test]
    fn test_invalid_calendar_date_keeps_components() {
        // 2024-02-00, rejected by chrono
        let date = [4, 0xE8, 0x07, 2, 0];
        assert_eq!(raw_temporal_text(&date, false), "2024-02-00");

        let datetime = [11, 0xE8, 0x07, 2, 0, 13, 5, 9, 0x40, 0xE2, 0x01, 0x00];
        assert_eq!(raw_temporal_text(&datetime, true), "2024-02-00 13:05:09.123456");
    }

    #[test]
    fn test_text_protocol_bytes_pass_through() {
        assert_eq!(raw_temporal_text(b"0000-00-00 00:00:00", true), "0000-00-00 00:00:00");
    }
}
