//! Shared fixtures: temp SQLite source tables and a checkpoint database

#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tablepoll_core::application::ExtractionJob;
use tablepoll_core::domain::{ConnectionSettings, JobConfig};
use tablepoll_core::port::record_sink::mocks::CollectingSink;
use tablepoll_infra_sqlite::{
    create_pool, run_migrations, SqliteCheckpointStore, SqliteSourceConnector,
};

/// Unique temp path for this test process
pub fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "tablepoll_it_{}_{}.db",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

/// Writable handle on a source database holding an `orders` table
pub struct SourceDb {
    pub path: PathBuf,
    pub pool: SqlitePool,
}

impl SourceDb {
    pub async fn create(name: &str) -> Self {
        let path = temp_db(&format!("{}_source", name));
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY, item TEXT, qty INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        Self { path, pool }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.url(), "reader", "")
    }

    pub async fn insert(&self, id: i64, item: &str, qty: Option<i64>) {
        sqlx::query("INSERT INTO orders (id, item, qty) VALUES (?, ?, ?)")
            .bind(id)
            .bind(item)
            .bind(qty)
            .execute(&self.pool)
            .await
            .unwrap();
    }
}

/// Checkpoint store backed by a file so it survives job restarts
pub async fn checkpoint_store(name: &str) -> SqliteCheckpointStore {
    let path = temp_db(&format!("{}_meta", name));
    checkpoint_store_at(&path).await
}

pub async fn checkpoint_store_at(path: &PathBuf) -> SqliteCheckpointStore {
    let pool = create_pool(&path.display().to_string()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    SqliteCheckpointStore::new(pool)
}

pub fn job(
    config: JobConfig,
    store: &SqliteCheckpointStore,
    sink: &CollectingSink,
) -> ExtractionJob {
    let connector = SqliteSourceConnector::new(&config.connection).unwrap();
    ExtractionJob::new(
        config,
        Arc::new(connector),
        Arc::new(store.clone()),
        Arc::new(sink.clone()),
    )
}
