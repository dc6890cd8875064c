// sqlx error mapping (MySQL)

use tablepoll_core::error::AppError;

/// Convert sqlx::Error to AppError, keeping the MySQL error code
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            // MySQL server error codes: ER_ACCESS_DENIED_ERROR, ER_NO_SUCH_TABLE, ...
            Some(code) => AppError::Database(format!(
                "MySQL error [{}]: {}",
                code.as_ref(),
                db_err.message()
            )),
            None => AppError::Database(format!("MySQL error: {}", db_err.message())),
        },
        sqlx::Error::Io(io) => AppError::Database(format!("MySQL connection lost: {}", io)),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_connection_lost() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = map_sqlx_error(sqlx::Error::Io(io));
        assert!(err.to_string().contains("connection lost"));
        assert!(!err.is_fatal());
    }
}
