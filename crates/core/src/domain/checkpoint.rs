// Checkpoint Domain Model

use super::error::{DomainError, Result};

/// Source table name (also the checkpoint key)
pub type TableName = String;

/// Last-seen offset for one source table
///
/// One checkpoint exists per table. The offset never decreases: the only way
/// to move it is [`Checkpoint::advanced_by`] with an unsigned delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub table: TableName,
    pub offset: i64,
}

impl Checkpoint {
    pub fn new(table: impl Into<TableName>, offset: i64) -> Self {
        Self {
            table: table.into(),
            offset,
        }
    }

    /// Checkpoint for a table that was never persisted (base 0)
    pub fn empty(table: impl Into<TableName>) -> Self {
        Self::new(table, 0)
    }

    /// Returns the checkpoint moved forward by `delta`
    pub fn advanced_by(&self, delta: u64) -> Result<Checkpoint> {
        let overflow = || DomainError::OffsetOverflow {
            table: self.table.clone(),
            offset: self.offset,
            delta,
        };
        let delta_i64 = i64::try_from(delta).map_err(|_| overflow())?;
        let offset = self.offset.checked_add(delta_i64).ok_or_else(overflow)?;
        Ok(Checkpoint::new(self.table.clone(), offset))
    }
}
