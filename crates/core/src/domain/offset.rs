// Offset Strategy - how a successful poll moves the checkpoint

use super::error::{DomainError, Result};
use super::row::RowBatch;
use std::fmt;

/// Default id column for the max-id strategy
pub const DEFAULT_ID_COLUMN: &str = "id";

/// How far a batch advances the checkpoint
///
/// `RowCount` treats the number of rows returned as the offset delta. It is
/// only correct when ids form a gapless sequence right after the previous
/// offset; a gap or a deleted row makes the next poll skip or re-read rows.
/// `MaxId` advances to the largest id observed in the batch instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OffsetStrategy {
    #[default]
    RowCount,
    MaxId { column: String },
}

impl OffsetStrategy {
    pub fn max_id(column: impl Into<String>) -> Self {
        Self::MaxId {
            column: column.into(),
        }
    }

    /// Parse the `offset_strategy` setting (`row_count` | `max_id`)
    pub fn from_setting(kind: &str, id_column: Option<&str>) -> Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "" | "row_count" | "rowcount" => Ok(OffsetStrategy::RowCount),
            "max_id" | "maxid" => Ok(OffsetStrategy::max_id(
                id_column.unwrap_or(DEFAULT_ID_COLUMN),
            )),
            other => Err(DomainError::ValidationError(format!(
                "unknown offset strategy: {}",
                other
            ))),
        }
    }

    /// Delta to pass to the checkpoint store for this batch
    ///
    /// Never negative: a max-id batch whose ids all sit at or below the
    /// current offset yields 0.
    pub fn delta(&self, batch: &RowBatch, current_offset: i64) -> Result<u64> {
        match self {
            OffsetStrategy::RowCount => Ok(batch.len() as u64),
            OffsetStrategy::MaxId { column } => {
                if batch.is_empty() {
                    return Ok(0);
                }
                let index = batch
                    .column_index(column)
                    .ok_or_else(|| DomainError::UnknownColumn(column.clone()))?;
                let delta = match batch.max_int(index) {
                    Some(max) if max > current_offset => {
                        (max as i128 - current_offset as i128) as u64
                    }
                    _ => 0,
                };
                Ok(delta)
            }
        }
    }
}

impl fmt::Display for OffsetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetStrategy::RowCount => write!(f, "row_count"),
            OffsetStrategy::MaxId { column } => write!(f, "max_id({})", column),
        }
    }
}
