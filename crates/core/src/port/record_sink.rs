// Record Sink Port - where materialized rows are handed to the host

use crate::error::Result;
use async_trait::async_trait;

/// Host-side receiver of emitted records
///
/// Delivery guarantees beyond this boundary belong to the host.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Emit one cycle's records for `table`, in order
    async fn emit(&self, table: &str, records: Vec<String>) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Sink that keeps every emitted record in memory
    #[derive(Clone, Default)]
    pub struct CollectingSink {
        records: Arc<Mutex<Vec<String>>>,
        batches: Arc<Mutex<usize>>,
        fail: Arc<Mutex<bool>>,
    }

    impl CollectingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        pub fn records(&self) -> Vec<String> {
            self.records.lock().unwrap().clone()
        }

        /// Number of successful `emit` calls
        pub fn batches(&self) -> usize {
            *self.batches.lock().unwrap()
        }
    }

    #[async_trait]
    impl RecordSink for CollectingSink {
        async fn emit(&self, _table: &str, records: Vec<String>) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(AppError::Sink("mock sink failure".to_string()));
            }
            self.records.lock().unwrap().extend(records);
            *self.batches.lock().unwrap() += 1;
            Ok(())
        }
    }
}
