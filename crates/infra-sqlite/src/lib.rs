// Tablepoll Infrastructure - SQLite Adapter
// Implements: CheckpointStore (metadata db), SourceConnector (sqlite source tables)

mod checkpoint_store;
mod connection;
mod error;
mod migration;
mod row;
mod source;

pub use checkpoint_store::SqliteCheckpointStore;
pub use connection::create_pool;
pub use error::map_sqlx_error;
pub use migration::run_migrations;
pub use source::SqliteSourceConnector;
