use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;

use async_trait::async_trait;

use crate::paxos::Reply;
use crate::paxos::ReplicaId;
use crate::paxos::Request;
use crate::transport::PaxosService;
use crate::transport::Transport;
use crate::transport::TransportError;

/// LocalTransport delivers requests to replicas in the same process.
#[derive(Default)]
pub struct LocalTransport {
    peers: RwLock<BTreeMap<ReplicaId, Weak<dyn PaxosService>>>,
    down: RwLock<BTreeSet<ReplicaId>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, rid: ReplicaId, svc: &Arc<dyn PaxosService>) {
        let mut peers = match self.peers.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        peers.insert(rid, Arc::downgrade(svc));
    }

    /// set_down makes every request to `rid` fail, as if it crashed.
    pub fn set_down(&self, rid: ReplicaId, down: bool) {
        let mut d = match self.down.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if down {
            d.insert(rid);
        } else {
            d.remove(&rid);
        }
    }

    fn peer(&self, rid: ReplicaId) -> Result<Arc<dyn PaxosService>, TransportError> {
        let down = match self.down.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if down.contains(&rid) {
            return Err(TransportError::Unreachable(rid));
        }

        let peers = match self.peers.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        peers
            .get(&rid)
            .and_then(|w| w.upgrade())
            .ok_or(TransportError::NoSuchReplica(rid))
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, to: ReplicaId, req: Request) -> Result<Reply, TransportError> {
        // let other tasks interleave as they would with a real network.
        tokio::task::yield_now().await;

        let svc = self.peer(to)?;
        Ok(svc.handle_paxos(req))
    }
}
