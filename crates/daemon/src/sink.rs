// Stdout record sink

use async_trait::async_trait;
use tablepoll_core::error::{AppError, Result};
use tablepoll_core::port::RecordSink;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

/// Writes one record per line, flushing after every batch
pub struct LineSink<W> {
    out: Mutex<W>,
}

impl LineSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> RecordSink for LineSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn emit(&self, table: &str, records: Vec<String>) -> Result<()> {
        let mut buf = String::new();
        for record in &records {
            buf.push_str(record);
            buf.push('\n');
        }

        let mut out = self.out.lock().await;
        out.write_all(buf.as_bytes())
            .await
            .map_err(|e| AppError::Sink(format!("write failed: {}", e)))?;
        out.flush()
            .await
            .map_err(|e| AppError::Sink(format!("flush failed: {}", e)))?;

        debug!(table = %table, records = records.len(), "Records written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_are_lines() {
        let sink = LineSink::new(Vec::<u8>::new());
        sink.emit("orders", vec!["1,a".into(), "2,".into()])
            .await
            .unwrap();
        sink.emit("orders", vec!["3,c".into()]).await.unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "1,a\n2,\n3,c\n");
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let sink = LineSink::new(Vec::<u8>::new());
        sink.emit("orders", Vec::new()).await.unwrap();
        assert!(sink.into_inner().is_empty());
    }
}
