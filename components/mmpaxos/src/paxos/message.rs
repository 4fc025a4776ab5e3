use std::collections::BTreeMap;

use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Instance;
use crate::paxos::OpCode;
use crate::paxos::Reply;
use crate::paxos::Request;

impl Request {
    /// accept builds a combined prepare/accept request for one instance.
    pub fn accept(bal: BallotNum, column: ColumnId, inst: Instance) -> Self {
        Request::of(OpCode::AcceptOrPrepare, Some(bal), column, inst)
    }

    /// commit builds a commit request. The ballot is informational only.
    pub fn commit(column: ColumnId, inst: Instance) -> Self {
        let bal = inst.accept_ballot;
        Request::of(OpCode::Commit, bal, column, inst)
    }

    fn of(op: OpCode, bal: Option<BallotNum>, column: ColumnId, inst: Instance) -> Self {
        let mut instances = BTreeMap::new();
        instances.insert(inst.lsn(), inst);

        Request {
            op: op as i32,
            ballot: bal,
            column,
            instances,
        }
    }
}

impl Reply {
    pub fn new(highest_seen: BallotNum) -> Self {
        Reply {
            highest_seen: Some(highest_seen),
            instances: BTreeMap::new(),
        }
    }
}
