use std::collections::BTreeMap;

use crate::paxos::ColumnId;
use crate::paxos::Instance;
use crate::paxos::Lsn;

/// StateMachine is the key-value map built by applying instances in the
/// order the applier chooses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateMachine {
    state: BTreeMap<String, i64>,

    /// Every applied instance as `(column, lsn)`, in apply order.
    apply_seq: Vec<(ColumnId, Lsn)>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// apply_instance overwrites the key of a set command. A no-op only
    /// shows up in the apply sequence.
    pub fn apply_instance(&mut self, inst: &Instance) {
        if let Some(cmd) = &inst.cmd {
            if !cmd.noop {
                self.state.insert(cmd.key.clone(), cmd.value);
            }
        }
        self.apply_seq.push((inst.column(), inst.lsn()));
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.state.get(key).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.state.clone()
    }

    pub fn apply_seq(&self) -> &[(ColumnId, Lsn)] {
        &self.apply_seq
    }
}
