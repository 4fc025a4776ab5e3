use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::paxos::ballot_less;
use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Command;
use crate::paxos::Instance;
use crate::paxos::InstanceId;
use crate::paxos::Lsn;
use crate::paxos::ReplicaId;
use crate::paxos::Request;
use crate::replica::Replica;
use crate::replica::ReplicaError;
use crate::replica::ReplicaState;
use crate::transport::TransportError;

impl Replica {
    /// set proposes `cmd` on the column of this replica and returns once it
    /// is committed. If another value takes the slot, it retries on a new one.
    pub async fn set(&self, cmd: Command) -> Result<Command, ReplicaError> {
        debug!(self.logger, "set: {}", cmd);

        loop {
            self.check_shutdown()?;

            let inst = {
                let mut st = self.lock_state();
                self.alloc_new_inst(&mut st, cmd.clone())
            };

            if self.propose(&inst).await? {
                return Ok(cmd);
            }

            debug!(self.logger, "slot taken by another value, retry: {}", inst);
        }
    }

    /// get reads the local state machine. The value may lag behind other
    /// replicas.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.lock_state().state_machine.get(key)
    }

    /// alloc_new_inst appends a fast-accepted instance of `cmd` to the column
    /// of this replica. Its deps are the log lengths including itself.
    pub fn alloc_new_inst(&self, st: &mut ReplicaState, cmd: Command) -> Instance {
        let column = self.replica_id;

        let mut deps = st.log_lens();
        deps[column as usize] += 1;

        let col = match st.column_mut(column) {
            Some(c) => c,
            None => crate::bug!(self.logger, "replica {} has no column", column),
        };

        let lsn = col.len();
        let inst = Instance::of(InstanceId::from((column, lsn, self.replica_id)), cmd, deps);
        col.push(inst.clone());

        debug!(self.logger, "allocated: {}", inst);
        inst
    }

    /// propose commits the slot of `inst` and returns whether `inst` is the
    /// value committed there.
    pub async fn propose(&self, inst: &Instance) -> Result<bool, ReplicaError> {
        let committed = self
            .run_paxos_loop(inst.column(), inst.lsn(), &self.others)
            .await?;

        debug!(self.logger, "committed: {}, proposed: {}", committed, inst);
        Ok(committed.instance_id == inst.instance_id)
    }

    /// local_prepare returns the active ballot of a column, electing one if
    /// needed, and the local instance at `lsn`.
    pub fn local_prepare(&self, column: ColumnId, lsn: Lsn) -> (BallotNum, Instance) {
        let mut st = self.lock_state();

        let col = match st.column_mut(column) {
            Some(c) => c,
            None => crate::bug!(self.logger, "no such column: {}", column),
        };

        let bal = col.prepare_ballot(self.replica_id);

        match col.get_instance(lsn) {
            Some(inst) => (bal, inst.clone()),
            None => crate::bug!(self.logger, "no local instance to propose at {}-{}", column, lsn),
        }
    }

    pub fn invalidate_ballot(&self, column: ColumnId, seen: Option<BallotNum>) {
        let mut st = self.lock_state();
        if let Some(col) = st.column_mut(column) {
            col.invalidate_ballot(seen);
        }
    }

    /// run_paxos_loop runs rounds on slot `column-lsn` until one commits. The
    /// i-th round is sent to `dsts[i % dsts.len()]`.
    pub async fn run_paxos_loop(
        &self,
        column: ColumnId,
        lsn: Lsn,
        dsts: &[ReplicaId],
    ) -> Result<Instance, ReplicaError> {
        if dsts.is_empty() {
            crate::bug!(self.logger, "no peer to run paxos on {}-{}", column, lsn);
        }

        let mut i = 0;
        loop {
            self.check_shutdown()?;

            let (bal, inst) = self.local_prepare(column, lsn);
            let to = dsts[i % dsts.len()];

            match self.run_paxos(bal, column, to, inst).await {
                Ok(committed) => return Ok(committed),
                Err(e) => {
                    debug!(self.logger, "round {} on {}-{} to {} failed: {}", i, column, lsn, to, e);
                }
            }

            i += 1;
            self.retry_jitter().await;
        }
    }

    /// run_paxos runs one prepare/accept round with one peer. The peer and
    /// this replica form a majority, so a granted round commits.
    ///
    /// Every failure drops the active ballot of the column.
    pub async fn run_paxos(
        &self,
        bal: BallotNum,
        column: ColumnId,
        to: ReplicaId,
        inst: Instance,
    ) -> Result<Instance, ReplicaError> {
        debug!(self.logger, "run paxos with {}: bal: {}, {}", to, bal, inst);

        let lsn = inst.lsn();
        let req = Request::accept(bal, column, inst);

        let reply = match timeout(self.conf.rpc_timeout(), self.transport.send(to, req)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                self.invalidate_ballot(column, None);
                return Err(e.into());
            }
            Err(_) => {
                self.invalidate_ballot(column, None);
                return Err(TransportError::Timeout.into());
            }
        };

        if let Some(seen) = reply.highest_seen {
            if bal < seen {
                self.invalidate_ballot(column, Some(seen));
                return Err(ReplicaError::HigherBallot(seen));
            }
        }

        let remote = match reply.instances.get(&lsn) {
            Some(r) => r.clone(),
            None => {
                self.invalidate_ballot(column, None);
                return Err(ReplicaError::MissingInstance(column, lsn));
            }
        };

        let committed = {
            let mut st = self.lock_state();
            self.accept_reply(&mut st, bal, column, lsn, remote)?
        };

        self.send_commit(column, committed.clone());
        Ok(committed)
    }

    /// accept_reply installs the instance a peer accepted under `bal` and
    /// commits it locally.
    fn accept_reply(
        &self,
        st: &mut ReplicaState,
        bal: BallotNum,
        column: ColumnId,
        lsn: Lsn,
        remote: Instance,
    ) -> Result<Instance, ReplicaError> {
        let col = match st.column_mut(column) {
            Some(c) => c,
            None => crate::bug!(self.logger, "no such column: {}", column),
        };

        let local = match col.get_instance(lsn) {
            Some(l) => l.clone(),
            None => crate::bug!(self.logger, "local instance {}-{} lost", column, lsn),
        };

        // decided by another round meanwhile.
        if local.committed {
            return Ok(local);
        }

        if bal < col.highest_seen {
            let seen = col.highest_seen;
            col.invalidate_ballot(None);
            return Err(ReplicaError::HigherBallot(seen));
        }

        // the peer replies with vbal == bal, which is above any local vbal.
        if !ballot_less(local.vbal(), remote.vbal()) {
            crate::bug!(self.logger, "local: {} >= remote: {}", local, remote);
        }

        let accepted = self.set_instance(st, remote);
        Ok(self.hdl_commit_instance(st, accepted))
    }

    /// send_commit broadcasts a commit to every other replica in background
    /// tasks. A peer that misses it learns the value by recovery.
    fn send_commit(&self, column: ColumnId, inst: Instance) {
        let req = Request::commit(column, inst);

        for to in self.others.iter().copied() {
            let transport = self.transport.clone();
            let req = req.clone();
            let logger = self.logger.clone();
            let retries = self.conf.commit_retries;
            let interval = self.conf.commit_retry_interval();
            let rpc_timeout = self.conf.rpc_timeout();

            tokio::spawn(async move {
                for _ in 0..retries {
                    match timeout(rpc_timeout, transport.send(to, req.clone())).await {
                        Ok(Ok(_)) => {
                            debug!(logger, "commit sent to {}: {}", to, req);
                            return;
                        }
                        Ok(Err(e)) => {
                            debug!(logger, "commit to {} error: {}", to, e);
                        }
                        Err(_) => {
                            debug!(logger, "commit to {} timeout", to);
                        }
                    }
                    sleep(interval).await;
                }
                info!(logger, "give up commit to {}: {}", to, req);
            });
        }
    }

    async fn retry_jitter(&self) {
        let ms = rand::thread_rng().gen_range(0..=self.conf.retry_jitter_ms);
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }
}
