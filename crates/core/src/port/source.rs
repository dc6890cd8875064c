// Source Database Port
// One connector per job; it hands out a single exclusively-owned connection

use crate::domain::{QueryText, RowBatch};
use crate::error::Result;
use async_trait::async_trait;

/// Creates connections to the source database from stored credentials
///
/// Implementations:
/// - SqliteSourceConnector (infra-sqlite)
/// - MySqlSourceConnector (infra-mysql)
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Open a fresh connection
    async fn connect(&self) -> Result<Box<dyn SourceConnection>>;

    /// Human-readable target for logs (never includes the password)
    fn describe(&self) -> String;
}

/// Open connection to the source database
#[async_trait]
pub trait SourceConnection: Send {
    /// Run `query` with its offset bound and read at most `max_rows` rows
    ///
    /// Rows keep the cursor order. Cells keep their driver type and nulls.
    ///
    /// # Errors
    /// - AppError::Database on any driver failure (the caller reconnects)
    async fn fetch(&mut self, query: &QueryText, max_rows: usize) -> Result<RowBatch>;

    /// Release the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted result of one `fetch`
    #[derive(Debug, Clone)]
    pub enum MockFetch {
        Rows(RowBatch),
        Fail(String),
    }

    #[derive(Default)]
    struct MockState {
        script: VecDeque<MockFetch>,
        queries: Vec<String>,
        connects: usize,
        closes: usize,
        fail_connect: bool,
        // Connection generation that served each fetch
        served_by: Vec<usize>,
    }

    /// Mock connector: fetches pop a shared script, empty script = empty batch
    #[derive(Clone, Default)]
    pub struct MockSourceConnector {
        state: Arc<Mutex<MockState>>,
    }

    impl MockSourceConnector {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_rows(&self, batch: RowBatch) {
            self.state.lock().unwrap().script.push_back(MockFetch::Rows(batch));
        }

        pub fn push_failure(&self, message: impl Into<String>) {
            self.state
                .lock()
                .unwrap()
                .script
                .push_back(MockFetch::Fail(message.into()));
        }

        pub fn set_fail_connect(&self, fail: bool) {
            self.state.lock().unwrap().fail_connect = fail;
        }

        pub fn connect_count(&self) -> usize {
            self.state.lock().unwrap().connects
        }

        pub fn close_count(&self) -> usize {
            self.state.lock().unwrap().closes
        }

        /// Literal SQL of every fetch, in call order
        pub fn queries(&self) -> Vec<String> {
            self.state.lock().unwrap().queries.clone()
        }

        /// Connection number (1-based) that served each fetch
        pub fn served_by(&self) -> Vec<usize> {
            self.state.lock().unwrap().served_by.clone()
        }
    }

    #[async_trait]
    impl SourceConnector for MockSourceConnector {
        async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
            let mut state = self.state.lock().unwrap();
            if state.fail_connect {
                return Err(AppError::Database("mock connect failure".to_string()));
            }
            state.connects += 1;
            Ok(Box::new(MockSourceConnection {
                state: Arc::clone(&self.state),
                generation: state.connects,
            }))
        }

        fn describe(&self) -> String {
            "mock://source".to_string()
        }
    }

    pub struct MockSourceConnection {
        state: Arc<Mutex<MockState>>,
        generation: usize,
    }

    #[async_trait]
    impl SourceConnection for MockSourceConnection {
        async fn fetch(&mut self, query: &QueryText, max_rows: usize) -> Result<RowBatch> {
            let mut state = self.state.lock().unwrap();
            state.queries.push(query.sql());
            state.served_by.push(self.generation);
            match state.script.pop_front() {
                Some(MockFetch::Rows(batch)) => {
                    let rows = batch.rows().iter().take(max_rows).cloned().collect();
                    Ok(RowBatch::with_rows(batch.columns().to_vec(), rows))
                }
                Some(MockFetch::Fail(message)) => Err(AppError::Database(message)),
                None => Ok(RowBatch::default()),
            }
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.state.lock().unwrap().closes += 1;
            Ok(())
        }
    }
}
