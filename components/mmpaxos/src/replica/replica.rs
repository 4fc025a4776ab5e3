use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use slog::Logger;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::apply::Applier;
use crate::conf::ClusterInfo;
use crate::conf::ReplicaConf;
use crate::paxos::ReplicaId;
use crate::replica::ReplicaError;
use crate::replica::ReplicaState;
use crate::transport::Transport;

const APPLY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Replica is one member of a cluster. Replica id `r` owns column `r`.
///
/// All columns and the state machine live in one `ReplicaState` behind a
/// single lock. The lock is never held across network I/O.
pub struct Replica {
    pub replica_id: ReplicaId,
    pub cluster: Vec<ReplicaId>,

    /// Every replica in `cluster` except this one.
    pub others: Vec<ReplicaId>,

    pub applier: Applier,
    pub conf: ReplicaConf,

    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) shutdown: CancellationToken,
    state: Mutex<ReplicaState>,

    pub logger: Logger,
}

impl Replica {
    pub fn new(
        replica_id: ReplicaId,
        cluster: Vec<ReplicaId>,
        applier: Applier,
        conf: ReplicaConf,
        transport: Arc<dyn Transport>,
        logger: &Logger,
    ) -> Self {
        let others = cluster
            .iter()
            .copied()
            .filter(|rid| *rid != replica_id)
            .collect();

        Replica {
            replica_id,
            state: Mutex::new(ReplicaState::new(cluster.len())),
            cluster,
            others,
            applier,
            conf,
            transport,
            shutdown: CancellationToken::new(),
            logger: logger.new(o!("replica" => replica_id)),
        }
    }

    /// from_cluster builds replica `replica_id` with the applier and timing
    /// configured for the cluster.
    pub fn from_cluster(
        ci: &ClusterInfo,
        replica_id: ReplicaId,
        transport: Arc<dyn Transport>,
        logger: &Logger,
    ) -> Result<Replica, ReplicaError> {
        if !ci.replicas.contains_key(&replica_id) {
            return Err(ReplicaError::NotInCluster(replica_id));
        }

        Ok(Replica::new(
            replica_id,
            ci.replica_ids(),
            ci.applier,
            ci.replica.clone(),
            transport,
            logger,
        ))
    }

    /// lock_state returns the guard of all mutable state. A poisoned lock
    /// means another task crashed on a broken invariant, so this one does too.
    pub fn lock_state(&self) -> MutexGuard<'_, ReplicaState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(_) => crate::bug!(self.logger, "replica state lock poisoned"),
        }
    }

    /// start spawns a recovery loop for every column this replica does not
    /// own.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        info!(self.logger, "start recovery loops on columns: {:?}", self.others);

        self.others
            .iter()
            .map(|column| tokio::spawn(self.clone().recovery_loop(*column)))
            .collect()
    }

    /// stop signals every loop of this replica to quit. A write in progress
    /// returns `ReplicaError::Shutdown` at its next retry.
    pub fn stop(&self) {
        info!(self.logger, "stop");
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub(crate) fn check_shutdown(&self) -> Result<(), ReplicaError> {
        if self.is_stopped() {
            return Err(ReplicaError::Shutdown);
        }
        Ok(())
    }

    /// wait_for_apply_all returns once every known instance on every column
    /// is applied.
    pub async fn wait_for_apply_all(&self) {
        loop {
            let done = self.lock_state().is_all_applied();
            if done {
                return;
            }
            tokio::time::sleep(APPLY_POLL_INTERVAL).await;
        }
    }
}
