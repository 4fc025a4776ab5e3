use serde::{Deserialize, Serialize};
use slog::Logger;

use crate::apply::scc_column_to_apply;
use crate::apply::vc_column_to_apply;
use crate::apply::ApplyData;
use crate::apply::ApplyError;
use crate::column::Column;
use crate::paxos::ColumnId;
use crate::state_machine::StateMachine;

/// Applier is the strategy to choose the next column to apply.
///
/// Both are deterministic, but they may order two co-dependent instances
/// differently. Every replica in a cluster must use the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Applier {
    #[serde(rename = "scc")]
    Scc,
    #[serde(rename = "vc")]
    VectorClock,
}

impl Default for Applier {
    fn default() -> Self {
        Applier::VectorClock
    }
}

impl Applier {
    /// column_to_apply returns the column whose next instance is safe to
    /// apply, searching from `column`. It may be a column `column` depends on.
    pub fn column_to_apply(&self, d: &ApplyData, column: ColumnId) -> Result<ColumnId, ApplyError> {
        match self {
            Applier::Scc => scc_column_to_apply(d, column),
            Applier::VectorClock => vc_column_to_apply(d, column),
        }
    }

    /// apply_all applies committed instances until no column makes progress
    /// and returns the number applied.
    pub fn apply_all(&self, columns: &mut [Column], sm: &mut StateMachine, logger: &Logger) -> usize {
        let mut total = 0;
        loop {
            let n = self.apply_any_column(columns, sm, logger);
            if n == 0 {
                return total;
            }
            total += n;
        }
    }

    fn apply_any_column(&self, columns: &mut [Column], sm: &mut StateMachine, logger: &Logger) -> usize {
        let mut n = 0;
        for column in 0..columns.len() as ColumnId {
            match self.apply_next(columns, sm, column, logger) {
                Ok(k) => n += k,
                Err(e) => {
                    trace!(logger, "can not apply from column {}: {}", column, e);
                }
            }
        }
        n
    }

    /// apply_next applies one instance, chosen by searching from `column`.
    pub fn apply_next(
        &self,
        columns: &mut [Column],
        sm: &mut StateMachine,
        column: ColumnId,
        logger: &Logger,
    ) -> Result<usize, ApplyError> {
        let chosen = {
            let d = ApplyData::new(columns, logger);
            self.column_to_apply(&d, column)?
        };

        let col = &mut columns[chosen as usize];
        let inst = match col.pending_head() {
            Some(inst) => inst.clone(),
            None => return Err(ApplyError::Uncommitted(chosen)),
        };

        if inst.lsn() != col.apply_watermark {
            crate::bug!(
                logger,
                "non continuous apply: apply watermark: {}-{}, inst: {}",
                chosen,
                col.apply_watermark,
                inst
            );
        }

        debug!(logger, "apply: {}", inst);

        sm.apply_instance(&inst);
        col.apply_watermark += 1;

        Ok(1)
    }
}
