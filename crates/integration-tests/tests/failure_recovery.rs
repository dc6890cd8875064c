//! Connection replacement, sink failures and fatal configuration

mod common;

use common::{checkpoint_store, job, temp_db, SourceDb};
use tablepoll_core::application::PollOutcome;
use tablepoll_core::domain::{ConnectionSettings, JobConfig, JobState};
use tablepoll_core::error::AppError;
use tablepoll_core::port::record_sink::mocks::CollectingSink;
use tablepoll_core::port::CheckpointStore;

#[tokio::test]
async fn test_bad_query_skips_cycle_and_reconnects() {
    let source = SourceDb::create("bad_query").await;
    let store = checkpoint_store("bad_query").await;
    let sink = CollectingSink::new();

    let mut job = job(
        JobConfig::new("shipments")
            .with_connection(source.connection())
            .with_custom_query("SELECT id, carrier FROM shipments WHERE id > 0"),
        &store,
        &sink,
    );
    job.open().await.unwrap();

    assert_eq!(
        job.poll_once().await.unwrap(),
        PollOutcome::Skipped { offset: 0 }
    );
    assert_eq!(job.reconnects(), 1);
    assert_eq!(store.load("shipments").await.unwrap(), Some(0));

    sqlx::query("CREATE TABLE shipments (id INTEGER PRIMARY KEY, carrier TEXT)")
        .execute(&source.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO shipments (id, carrier) VALUES (1, 'ups')")
        .execute(&source.pool)
        .await
        .unwrap();

    assert_eq!(
        job.poll_once().await.unwrap(),
        PollOutcome::Emitted { rows: 1, offset: 1 }
    );
    assert_eq!(sink.records(), vec!["1,ups"]);
}

#[tokio::test]
async fn test_missing_source_file_recovers_once_present() {
    let path = temp_db("late_source");
    let url = format!("sqlite://{}", path.display());
    let store = checkpoint_store("late_source").await;
    let sink = CollectingSink::new();

    let mut job = job(
        JobConfig::new("orders").with_connection(ConnectionSettings::new(url, "reader", "")),
        &store,
        &sink,
    );
    job.open().await.unwrap();

    // read-only connector never creates the file
    assert!(matches!(
        job.poll_once().await.unwrap(),
        PollOutcome::Skipped { .. }
    ));
    assert!(!path.exists());

    let source = SourceDb::create("late_source").await;
    source.insert(1, "late", None).await;
    source.pool.close().await;
    std::fs::copy(&source.path, &path).unwrap();

    assert_eq!(
        job.poll_once().await.unwrap(),
        PollOutcome::Emitted { rows: 1, offset: 1 }
    );
}

#[tokio::test]
async fn test_sink_failure_keeps_checkpoint() {
    let source = SourceDb::create("sink_failure").await;
    source.insert(1, "a", None).await;
    let store = checkpoint_store("sink_failure").await;
    let sink = CollectingSink::new();

    let mut job = job(
        JobConfig::new("orders").with_connection(source.connection()),
        &store,
        &sink,
    );
    job.open().await.unwrap();

    sink.set_fail(true);
    assert!(matches!(job.poll_once().await, Err(AppError::Sink(_))));
    assert_eq!(store.load("orders").await.unwrap(), Some(0));

    sink.set_fail(false);
    assert_eq!(
        job.poll_once().await.unwrap(),
        PollOutcome::Emitted { rows: 1, offset: 1 }
    );
    assert_eq!(sink.records(), vec!["1,a,"]);
}

#[tokio::test]
async fn test_invalid_configuration_is_fatal() {
    let source = SourceDb::create("fatal").await;
    let store = checkpoint_store("fatal").await;
    let sink = CollectingSink::new();

    let mut no_marker = job(
        JobConfig::new("orders")
            .with_connection(source.connection())
            .with_custom_query("SELECT * FROM orders"),
        &store,
        &sink,
    );
    let err = no_marker.open().await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(no_marker.state(), JobState::Uninitialized);

    let mut no_password = job(
        JobConfig::new("orders").with_connection(ConnectionSettings {
            password: None,
            ..source.connection()
        }),
        &store,
        &sink,
    );
    assert!(no_password.open().await.unwrap_err().is_fatal());
    assert_eq!(store.load("orders").await.unwrap(), None);
}

#[tokio::test]
async fn test_jobs_on_different_tables_are_independent() {
    let source = SourceDb::create("independent").await;
    sqlx::query("CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT)")
        .execute(&source.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO customers (id, name) VALUES (1, 'ada'), (2, 'bob')")
        .execute(&source.pool)
        .await
        .unwrap();
    source.insert(1, "a", Some(1)).await;
    let store = checkpoint_store("independent").await;
    let orders_sink = CollectingSink::new();
    let customers_sink = CollectingSink::new();

    let mut orders = job(
        JobConfig::new("orders").with_connection(source.connection()),
        &store,
        &orders_sink,
    );
    let mut customers = job(
        JobConfig::new("customers").with_connection(source.connection()),
        &store,
        &customers_sink,
    );
    orders.open().await.unwrap();
    customers.open().await.unwrap();

    let (a, b) = tokio::join!(orders.poll_once(), customers.poll_once());
    assert_eq!(a.unwrap().offset(), 1);
    assert_eq!(b.unwrap().offset(), 2);
    assert_eq!(orders_sink.records(), vec!["1,a,1"]);
    assert_eq!(customers_sink.records(), vec!["1,ada", "2,bob"]);
    assert_eq!(store.load("orders").await.unwrap(), Some(1));
    assert_eq!(store.load("customers").await.unwrap(), Some(2));
}
