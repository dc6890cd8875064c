// sqlx error mapping

use tablepoll_core::error::AppError;

/// Short label for the SQLite primary result codes a poller runs into
///
/// https://www.sqlite.org/rescode.html
fn sqlite_code_label(code: &str) -> Option<&'static str> {
    let primary = code.parse::<u32>().ok()? & 0xff;
    match primary {
        1 => Some("SQL error"),
        5 => Some("database locked"),
        8 => Some("database is read-only"),
        11 => Some("database file is corrupt"),
        13 => Some("database full"),
        14 => Some("unable to open database file"),
        19 => Some("constraint violation"),
        26 => Some("file is not a database"),
        _ => None,
    }
}

/// Convert sqlx::Error to AppError::Database
///
/// Every variant maps to the same transient category: callers replace the
/// connection and retry on the next cycle regardless of the cause.
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => {
                let label = sqlite_code_label(code.as_ref()).unwrap_or("database error");
                AppError::Database(format!("{} [{}]: {}", label, code, db_err.message()))
            }
            None => AppError::Database(db_err.message().to_string()),
        },
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("column not found: {}", col)),
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::Database(format!("cannot decode column {}: {}", index, source))
        }
        _ => AppError::Database(err.to_string()),
    }
}
