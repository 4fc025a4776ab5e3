use crate::paxos::ballot_ge;
use crate::paxos::ballot_less;
use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Instance;
use crate::paxos::Lsn;
use crate::paxos::OpCode;
use crate::paxos::Reply;
use crate::paxos::Request;
use crate::replica::Replica;
use crate::replica::ReplicaState;
use crate::transport::PaxosService;

/// PrepareOutcome is the result of preparing an instance on a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PrepareOutcome {
    /// The slot was empty and now holds the remote instance, fast-accepted,
    /// with deps merged with the local log lengths.
    Fresh(Instance),

    /// The slot already holds this instance.
    AlreadyPrepared(Instance),
}

impl PaxosService for Replica {
    fn handle_paxos(&self, req: Request) -> Reply {
        debug!(self.logger, "recv: {}", req);

        let reply = {
            let mut st = self.lock_state();
            self.handle_request(&mut st, req)
        };

        debug!(self.logger, "reply: {}", reply);
        reply
    }
}

impl Replica {
    /// handle_request runs the merged prepare/accept path, or the commit path,
    /// on every instance of a request, in lsn order.
    ///
    /// An accept request with a ballot lower than the highest seen gets a
    /// reply with no instance. A commit is never rejected.
    pub fn handle_request(&self, st: &mut ReplicaState, req: Request) -> Reply {
        let column = req.column;
        let op = req.op();

        let col = match st.column_mut(column) {
            Some(c) => c,
            None => {
                warn!(self.logger, "no such column: {}", column);
                return Reply::default();
            }
        };

        let mut reply = Reply::new(col.highest_seen);

        let bal = match (op, req.ballot) {
            (OpCode::Commit, b) => b.unwrap_or_default(),
            (OpCode::AcceptOrPrepare, Some(b)) => {
                if !col.grant(b) {
                    debug!(self.logger, "reject: {} < {}", b, col.highest_seen);
                    return reply;
                }
                b
            }
            (OpCode::AcceptOrPrepare, None) => {
                warn!(self.logger, "accept without ballot on column {}", column);
                return reply;
            }
        };

        for (lsn, inst) in req.instances.into_iter() {
            if !is_valid_instance(column, lsn, &inst) {
                warn!(self.logger, "bad instance at {}-{}: {}", column, lsn, inst);
                continue;
            }

            let latest = self.handle_ops(st, op, bal, inst);
            reply.instances.insert(lsn, latest);
        }

        reply
    }

    fn handle_ops(&self, st: &mut ReplicaState, op: OpCode, bal: BallotNum, remote: Instance) -> Instance {
        if op == OpCode::Commit {
            return self.hdl_commit_instance(st, remote);
        }

        match self.hdl_prepare_instance(st, &remote) {
            PrepareOutcome::Fresh(local) => {
                let latest = if ballot_less(local.vbal(), remote.vbal()) {
                    remote
                } else {
                    local
                };
                self.hdl_accept_instance(st, bal, latest)
            }
            PrepareOutcome::AlreadyPrepared(mut local) => {
                if ballot_ge(remote.vbal(), local.vbal()) {
                    debug!(self.logger, "remote: {} >= local: {}", remote, local);

                    // the requester and this replica are a majority now.
                    let latest = self.hdl_accept_instance(st, bal, remote);
                    return self.hdl_commit_instance(st, latest);
                }

                if local.vbal().is_none() && remote.vbal().is_none() {
                    local.merge_deps(&remote.deps);
                    debug!(self.logger, "merged deps: {}", local);
                }

                self.hdl_accept_instance(st, bal, local)
            }
        }
    }

    /// hdl_prepare_instance returns the local instance at the slot of `inst`.
    /// If there is none it stores a fast-accepted copy of `inst`.
    pub fn hdl_prepare_instance(&self, st: &mut ReplicaState, inst: &Instance) -> PrepareOutcome {
        let (column, lsn) = (inst.column(), inst.lsn());

        if let Some(curr) = st.column(column).and_then(|c| c.get_instance(lsn)) {
            return PrepareOutcome::AlreadyPrepared(curr.clone());
        }

        let mut inst = inst.clone();
        inst.accept_ballot = None;
        inst.merge_deps(&st.log_lens());

        let stored = self.set_instance(st, inst);
        PrepareOutcome::Fresh(stored)
    }

    /// hdl_accept_instance accepts `inst` under `bal`.
    pub fn hdl_accept_instance(&self, st: &mut ReplicaState, bal: BallotNum, mut inst: Instance) -> Instance {
        inst.accept_ballot = Some(bal);
        self.set_instance(st, inst)
    }

    /// hdl_commit_instance marks `inst` committed, moves the commit watermark
    /// and applies everything that became applicable.
    pub fn hdl_commit_instance(&self, st: &mut ReplicaState, mut inst: Instance) -> Instance {
        inst.committed = true;
        let column = inst.column();

        let committed = self.set_instance(st, inst);

        if let Some(col) = st.column_mut(column) {
            let n = col.advance_commit_watermark();
            if n > 0 {
                debug!(self.logger, "column {} commit watermark: {}", column, col.commit_watermark);
            }
        }

        let n = self.apply_all(st);
        if n > 0 {
            debug!(self.logger, "applied {} after commit {}", n, committed);
        }

        committed
    }

    /// apply_all drains the applier until no column makes progress.
    pub fn apply_all(&self, st: &mut ReplicaState) -> usize {
        let ReplicaState {
            columns,
            state_machine,
        } = st;
        self.applier.apply_all(columns, state_machine, &self.logger)
    }

    /// set_instance stores `inst` and returns the stored copy. Overwriting a
    /// committed instance with another value is a bug.
    pub fn set_instance(&self, st: &mut ReplicaState, inst: Instance) -> Instance {
        let (column, lsn) = (inst.column(), inst.lsn());

        let col = match st.column_mut(column) {
            Some(c) => c,
            None => crate::bug!(self.logger, "no column for {}", inst),
        };

        if let Err(e) = col.set_instance(inst) {
            crate::bug!(self.logger, "set instance on column {}: {}", column, e);
        }

        match col.get_instance(lsn) {
            Some(stored) => stored.clone(),
            None => crate::bug!(self.logger, "instance {}-{} lost after set", column, lsn),
        }
    }
}

fn is_valid_instance(column: ColumnId, lsn: Lsn, inst: &Instance) -> bool {
    inst.instance_id.is_some() && inst.column() == column && inst.lsn() == lsn && lsn >= 0
}
