// Checkpoint Store Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Durable per-table offset storage
///
/// Exactly one record per table. Implementations must upsert on `advance`
/// so the last writer wins when two instances share a table.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persisted offset for `table`, or None on first run
    async fn load(&self, table: &str) -> Result<Option<i64>>;

    /// Add `delta` to the persisted offset (absent counts as 0)
    ///
    /// Returns the new persisted offset.
    async fn advance(&self, table: &str, delta: u64) -> Result<i64>;

    /// Insert `offset` only if no checkpoint exists yet
    ///
    /// Returns true when a row was inserted.
    async fn seed(&self, table: &str, offset: i64) -> Result<bool>;

    /// Current offset for the next query: persisted value, else `start_from`
    async fn effective_start(&self, start_from: i64, table: &str) -> Result<i64> {
        Ok(self.load(table).await?.unwrap_or(start_from))
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::Checkpoint;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory checkpoint store
    #[derive(Clone, Default)]
    pub struct InMemoryCheckpointStore {
        offsets: Arc<Mutex<HashMap<String, i64>>>,
        fail_advance: Arc<Mutex<bool>>,
        advance_calls: Arc<Mutex<usize>>,
    }

    impl InMemoryCheckpointStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_offset(table: &str, offset: i64) -> Self {
            let store = Self::default();
            store.offsets.lock().unwrap().insert(table.to_string(), offset);
            store
        }

        /// Make every following `advance` fail
        pub fn set_fail_advance(&self, fail: bool) {
            *self.fail_advance.lock().unwrap() = fail;
        }

        pub fn advance_calls(&self) -> usize {
            *self.advance_calls.lock().unwrap()
        }

        pub fn len(&self) -> usize {
            self.offsets.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl CheckpointStore for InMemoryCheckpointStore {
        async fn load(&self, table: &str) -> Result<Option<i64>> {
            Ok(self.offsets.lock().unwrap().get(table).copied())
        }

        async fn advance(&self, table: &str, delta: u64) -> Result<i64> {
            *self.advance_calls.lock().unwrap() += 1;
            if *self.fail_advance.lock().unwrap() {
                return Err(AppError::Database("mock advance failure".to_string()));
            }
            let mut offsets = self.offsets.lock().unwrap();
            let current = offsets.get(table).copied().unwrap_or(0);
            let next = Checkpoint::new(table, current).advanced_by(delta)?;
            offsets.insert(table.to_string(), next.offset);
            Ok(next.offset)
        }

        async fn seed(&self, table: &str, offset: i64) -> Result<bool> {
            let mut offsets = self.offsets.lock().unwrap();
            if offsets.contains_key(table) {
                return Ok(false);
            }
            offsets.insert(table.to_string(), offset);
            Ok(true)
        }
    }
}
