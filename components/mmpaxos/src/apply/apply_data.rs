use slog::Logger;

use crate::apply::ApplyError;
use crate::column::Column;
use crate::paxos::ColumnId;

/// ApplyData is a read-only view of all columns for deciding what to apply
/// next:
/// - the lsn of the next instance to apply on every column,
/// - the commit watermark of every column,
/// - what the next instance to apply on every column depends on.
pub struct ApplyData<'a> {
    columns: &'a [Column],
    pub logger: &'a Logger,
}

impl<'a> ApplyData<'a> {
    pub fn new(columns: &'a [Column], logger: &'a Logger) -> Self {
        ApplyData { columns, logger }
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    fn col(&self, column: ColumnId) -> &Column {
        &self.columns[column as usize]
    }

    /// is_committed returns true if the next instance to apply on `column`
    /// is committed.
    pub fn is_committed(&self, column: ColumnId) -> bool {
        let col = self.col(column);
        col.commit_watermark > col.apply_watermark
    }

    /// depends_on returns true if the next instance to apply on `column` saw
    /// an instance on `dep` that is not applied yet.
    pub fn depends_on(&self, column: ColumnId, dep: ColumnId) -> bool {
        let seen = match self.col(column).pending_head() {
            Some(inst) => inst.dep(dep),
            None => 0,
        };
        seen > self.col(dep).apply_watermark
    }

    /// get_deps returns the columns the next instance on `column` depends
    /// on. It fails if any of them is not committed.
    pub fn get_deps(&self, column: ColumnId) -> Result<Vec<ColumnId>, ApplyError> {
        let mut deps = Vec::with_capacity(self.n_columns());

        for dep in 0..self.n_columns() as ColumnId {
            if dep == column {
                continue;
            }

            if self.depends_on(column, dep) {
                if !self.is_committed(dep) {
                    return Err(ApplyError::Uncommitted(dep));
                }
                deps.push(dep);
            }
        }

        trace!(self.logger, "deps of column {}: {:?}", column, deps);
        Ok(deps)
    }
}
