use std::cmp::max;

use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Command;
use crate::paxos::Instance;
use crate::paxos::InstanceId;
use crate::paxos::Lsn;
use crate::paxos::ReplicaId;

const NOOP_KEY: &str = "NOOP";

impl Command {
    pub fn set(key: &str, value: i64) -> Self {
        Command {
            key: key.into(),
            value,
            noop: false,
        }
    }

    pub fn noop() -> Self {
        Command {
            key: NOOP_KEY.into(),
            value: 0,
            noop: true,
        }
    }
}

impl From<(&str, i64)> for Command {
    fn from(t: (&str, i64)) -> Command {
        Command::set(t.0, t.1)
    }
}

impl From<(ColumnId, Lsn, ReplicaId)> for InstanceId {
    fn from(t: (ColumnId, Lsn, ReplicaId)) -> InstanceId {
        InstanceId {
            column: t.0,
            lsn: t.1,
            proposer_id: t.2,
        }
    }
}

impl Instance {
    /// of builds a fast-accepted, uncommitted instance.
    pub fn of(id: InstanceId, cmd: Command, deps: Vec<i64>) -> Self {
        Instance {
            instance_id: Some(id),
            cmd: Some(cmd),
            accept_ballot: None,
            committed: false,
            deps,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.instance_id.unwrap_or_default()
    }

    pub fn column(&self) -> ColumnId {
        self.id().column
    }

    pub fn lsn(&self) -> Lsn {
        self.id().lsn
    }

    pub fn vbal(&self) -> Option<&BallotNum> {
        self.accept_ballot.as_ref()
    }

    pub fn is_noop(&self) -> bool {
        self.cmd.as_ref().map(|c| c.noop).unwrap_or(true)
    }

    /// dep returns the recorded log length of column `col`. A missing entry
    /// means nothing was seen on it.
    pub fn dep(&self, col: ColumnId) -> i64 {
        self.deps.get(col as usize).copied().unwrap_or(0)
    }

    /// merge_deps raises every entry to the per-column maximum of the two.
    pub fn merge_deps(&mut self, other: &[i64]) {
        if self.deps.len() < other.len() {
            self.deps.resize(other.len(), 0);
        }
        for (i, d) in other.iter().enumerate() {
            self.deps[i] = max(self.deps[i], *d);
        }
    }

    /// same_value returns true if two instances are the same proposal with the
    /// same dependencies, i.e. committing one over the other changes nothing.
    pub fn same_value(&self, other: &Instance) -> bool {
        self.instance_id == other.instance_id && self.cmd == other.cmd && self.deps == other.deps
    }
}
