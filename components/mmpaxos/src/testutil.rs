//! An in-process cluster of three replicas over `LocalTransport`, for tests.

use std::sync::Arc;
use std::time::Duration;

use slog::Logger;
use tokio::task::JoinHandle;

use crate::apply::Applier;
use crate::conf::ReplicaConf;
use crate::paxos::ReplicaId;
use crate::replica::Replica;
use crate::transport::FaultyTransport;
use crate::transport::LocalTransport;
use crate::transport::PaxosService;
use crate::transport::Transport;

pub const CLUSTER: [ReplicaId; 3] = [0, 1, 2];

pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

pub fn test_conf() -> ReplicaConf {
    ReplicaConf {
        rpc_timeout_ms: 1000,
        ..ReplicaConf::default()
    }
}

/// new_replica builds a replica whose peers are all unreachable.
pub fn new_replica(rid: ReplicaId, applier: Applier) -> Replica {
    Replica::new(
        rid,
        CLUSTER.to_vec(),
        applier,
        test_conf(),
        Arc::new(LocalTransport::new()),
        &discard_logger(),
    )
}

pub struct TestCluster {
    pub replicas: Vec<Arc<Replica>>,
    pub local: Arc<LocalTransport>,
    pub faulty: Arc<FaultyTransport>,
    handles: Vec<JoinHandle<()>>,
}

impl TestCluster {
    pub fn new(applier: Applier) -> Self {
        Self::with_faults(applier, 0.0, 0.0)
    }

    /// with_faults builds a cluster in which every request fails before being
    /// sent with `send_error_rate` and loses its reply with `recv_error_rate`.
    pub fn with_faults(applier: Applier, send_error_rate: f64, recv_error_rate: f64) -> Self {
        let logger = discard_logger();

        let local = Arc::new(LocalTransport::new());
        let inner: Arc<dyn Transport> = local.clone();
        let faulty = Arc::new(FaultyTransport::new(inner, send_error_rate, recv_error_rate));

        let mut replicas = Vec::with_capacity(CLUSTER.len());
        for rid in CLUSTER.iter().copied() {
            let transport: Arc<dyn Transport> = faulty.clone();
            let r = Arc::new(Replica::new(
                rid,
                CLUSTER.to_vec(),
                applier,
                test_conf(),
                transport,
                &logger,
            ));

            let svc: Arc<dyn PaxosService> = r.clone();
            local.register(rid, &svc);
            replicas.push(r);
        }

        TestCluster {
            replicas,
            local,
            faulty,
            handles: Vec::new(),
        }
    }

    /// start runs the recovery loops of every replica.
    pub fn start(&mut self) {
        for r in self.replicas.iter() {
            self.handles.extend(r.start());
        }
    }

    pub async fn stop(&mut self) {
        for r in self.replicas.iter() {
            r.stop();
        }
        for h in self.handles.drain(..) {
            let _ = h.await;
        }
    }

    /// is_converged returns true if all replicas know the same number of
    /// instances on every column and have applied all of them.
    pub fn is_converged(&self) -> bool {
        let mut lens = None;

        for r in self.replicas.iter() {
            let st = r.lock_state();
            if !st.is_all_applied() {
                return false;
            }

            let l = st.log_lens();
            match &lens {
                None => lens = Some(l),
                Some(prev) => {
                    if *prev != l {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub async fn wait_for_converge(&self) {
        while !self.is_converged() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
