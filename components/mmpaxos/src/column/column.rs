use std::cmp::max;

use crate::column::ColumnError;
use crate::paxos::ballot_less;
use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Instance;
use crate::paxos::Lsn;
use crate::paxos::ReplicaId;

/// Column is one log partition, owned by the replica with the same id.
///
/// `commit_watermark` is the lowest lsn not yet committed and every lower
/// slot is committed. `apply_watermark` is the lowest lsn not yet applied to
/// the state machine and never exceeds `commit_watermark`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub column: ColumnId,

    /// The ballot this replica currently proposes with on this column.
    pub active_ballot: Option<BallotNum>,

    /// The highest ballot granted on this column.
    pub highest_seen: BallotNum,

    pub log: Vec<Option<Instance>>,

    pub commit_watermark: Lsn,
    pub apply_watermark: Lsn,
}

impl Column {
    pub fn new(column: ColumnId) -> Self {
        Column {
            column,
            active_ballot: None,
            highest_seen: BallotNum::new(0, column),
            log: Vec::new(),
            commit_watermark: 0,
            apply_watermark: 0,
        }
    }

    pub fn len(&self) -> i64 {
        self.log.len() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn get_instance(&self, lsn: Lsn) -> Option<&Instance> {
        if lsn < 0 {
            return None;
        }
        self.log.get(lsn as usize)?.as_ref()
    }

    pub fn has_instance(&self, lsn: Lsn) -> bool {
        self.get_instance(lsn).is_some()
    }

    /// push appends an instance at the end of the log and returns its lsn.
    /// The caller fills in the instance id with the returned lsn.
    pub fn push(&mut self, inst: Instance) -> Lsn {
        self.log.push(Some(inst));
        self.len() - 1
    }

    /// set_instance stores `inst` at its lsn, growing the log with holes if
    /// needed.
    ///
    /// A committed slot only accepts the same value again. The commit flag
    /// stays set and the accept ballot does not go backward.
    pub fn set_instance(&mut self, mut inst: Instance) -> Result<(), ColumnError> {
        let lsn = inst.lsn();
        if lsn < 0 {
            return Err(ColumnError::InvalidLsn(lsn));
        }

        let idx = lsn as usize;
        if self.log.len() <= idx {
            self.log.resize(idx + 1, None);
        }

        if let Some(prev) = &self.log[idx] {
            if prev.committed {
                if !prev.same_value(&inst) {
                    return Err(ColumnError::OverwriteCommitted(
                        prev.to_string(),
                        inst.to_string(),
                    ));
                }
                inst.committed = true;
                if ballot_less(inst.vbal(), prev.vbal()) {
                    inst.accept_ballot = prev.accept_ballot;
                }
            }
        }

        self.log[idx] = Some(inst);
        Ok(())
    }

    /// prepare_ballot returns the active ballot, electing a new one above
    /// every ballot seen if there is none.
    pub fn prepare_ballot(&mut self, replica_id: ReplicaId) -> BallotNum {
        if let Some(b) = self.active_ballot {
            return b;
        }

        self.highest_seen.n += 1;
        self.highest_seen.replica_id = replica_id;
        self.active_ballot = Some(self.highest_seen);
        self.highest_seen
    }

    /// invalidate_ballot drops the active ballot so that the next round elects
    /// a fresh one above `seen`.
    pub fn invalidate_ballot(&mut self, seen: Option<BallotNum>) {
        self.active_ballot = None;
        if let Some(seen) = seen {
            self.highest_seen = max(self.highest_seen, seen);
        }
    }

    /// grant records `bal` as the highest seen ballot if it is not lower.
    pub fn grant(&mut self, bal: BallotNum) -> bool {
        if bal < self.highest_seen {
            return false;
        }
        self.highest_seen = bal;
        true
    }

    /// advance_commit_watermark moves the watermark over the contiguous
    /// committed prefix and returns how many slots it passed.
    pub fn advance_commit_watermark(&mut self) -> i64 {
        let start = self.commit_watermark;
        while let Some(inst) = self.get_instance(self.commit_watermark) {
            if !inst.committed {
                break;
            }
            self.commit_watermark += 1;
        }
        self.commit_watermark - start
    }

    /// pending_head returns the next instance to apply, if it is committed.
    pub fn pending_head(&self) -> Option<&Instance> {
        if self.commit_watermark > self.apply_watermark {
            self.get_instance(self.apply_watermark)
        } else {
            None
        }
    }
}
