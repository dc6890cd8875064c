// Tablepoll Infrastructure - MySQL Adapter
// Implements: SourceConnector (mysql source tables)

mod error;
mod row;
mod source;

pub use error::map_sqlx_error;
pub use source::MySqlSourceConnector;
