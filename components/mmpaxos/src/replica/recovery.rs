use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::paxos::ColumnId;
use crate::paxos::Command;
use crate::paxos::Instance;
use crate::paxos::InstanceId;
use crate::paxos::Lsn;
use crate::paxos::ReplicaId;
use crate::replica::Replica;
use crate::replica::ReplicaError;
use crate::replica::ReplicaState;

impl Replica {
    /// recovery_loop watches the commit watermark of a column owned by another
    /// replica. If it lags the log and did not move since the last poll, the
    /// owner may have crashed in the middle of a round: finish that round or
    /// commit a no-op.
    pub async fn recovery_loop(self: Arc<Self>, column: ColumnId) {
        let logger = self.logger.new(o!("column" => column));
        debug!(logger, "recovery loop started");

        let mut next = 0;
        loop {
            let prev = next;

            let ms = {
                let interval = self.conf.recovery_interval_ms;
                interval + rand::thread_rng().gen_range(0..=interval)
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!(logger, "recovery loop stopped");
                    return;
                }
                _ = sleep(Duration::from_millis(ms)) => {}
            }

            let (n, len) = self.lock_state().commit_state(column);
            next = n;

            if next == len || next > prev {
                continue;
            }

            debug!(logger, "stalled: next: {}, prev: {}, len: {}", next, prev, len);

            match self.recover(column, next).await {
                Ok(inst) => debug!(logger, "recovered: {}", inst),
                Err(e) => info!(logger, "recover {}-{}: {}", column, next, e),
            }
        }
    }

    /// recover commits slot `column-lsn` of another replica's column, with a
    /// no-op if this replica has nothing there. It runs rounds against the
    /// replica that is neither this one nor the owner.
    pub async fn recover(&self, column: ColumnId, lsn: Lsn) -> Result<Instance, ReplicaError> {
        if column == self.replica_id {
            crate::bug!(self.logger, "recover on own column {}", column);
        }

        {
            let mut st = self.lock_state();
            let absent = !st.column(column).map(|c| c.has_instance(lsn)).unwrap_or(false);
            if absent {
                let noop = self.new_noop(&st, column, lsn);
                debug!(self.logger, "recover with noop: {}", noop);
                self.set_instance(&mut st, noop);
            }
        }

        let dsts: Vec<ReplicaId> = self
            .cluster
            .iter()
            .copied()
            .filter(|rid| *rid != self.replica_id && *rid != column)
            .collect();

        self.run_paxos_loop(column, lsn, &dsts).await
    }

    /// new_noop builds a fast-accepted no-op for slot `column-lsn`.
    pub fn new_noop(&self, st: &ReplicaState, column: ColumnId, lsn: Lsn) -> Instance {
        Instance::of(
            InstanceId::from((column, lsn, self.replica_id)),
            Command::noop(),
            st.log_lens(),
        )
    }
}
