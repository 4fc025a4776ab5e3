use std::mem::replace;
use std::sync::Arc;

use futures::Future;
use slog::Logger;
use tokio::sync::oneshot::Sender;
use tokio::task::JoinHandle;

use mmpaxos::conf::ClusterInfo;
use mmpaxos::conf::Node;
use mmpaxos::paxos::ReplicaId;
use mmpaxos::replica::Replica;
use mmpaxos::replica::ReplicaError;
use mmpaxos::transport::serve_with_shutdown;
use mmpaxos::transport::PaxosService;
use mmpaxos::transport::TcpTransport;

use crate::PkvError;
use crate::RedisApi;
use crate::ServerError;

/// Server runs one replica: a redis api for clients, a replication server for
/// peers and the recovery loops of the columns it does not own.
pub struct Server {
    pub replica: Arc<Replica>,
    pub node: Node,
    logger: Logger,
    stop_txs: Vec<(&'static str, Sender<()>)>,
    join_handle: Option<JoinHandle<()>>,
}

impl Server {
    /// new builds replica `replica_id` of `cluster`. Peers are reached over
    /// tcp at their replication addresses.
    pub fn new(cluster: &ClusterInfo, replica_id: ReplicaId, logger: &Logger) -> Result<Server, PkvError> {
        let node = cluster
            .get_replica_node(replica_id)
            .ok_or(ReplicaError::NotInCluster(replica_id))?
            .clone();

        let transport = Arc::new(TcpTransport::new(cluster.replication_addrs()));
        let replica = Replica::from_cluster(cluster, replica_id, transport, logger)?;

        Ok(Server {
            replica: Arc::new(replica),
            node,
            logger: logger.new(o!("replica" => replica_id)),
            stop_txs: Vec::new(),
            join_handle: None,
        })
    }

    /// start spawns the servers onto the current tokio runtime.
    pub fn start(&mut self) {
        let (tx1, rx1) = tokio::sync::oneshot::channel::<()>();
        let (tx2, rx2) = tokio::sync::oneshot::channel::<()>();

        let fut = Server::_start_servers(
            self.replica.clone(),
            self.node.clone(),
            self.logger.clone(),
            rx1,
            rx2,
        );
        let j = tokio::spawn(fut);

        self.join_handle = Some(j);

        self.stop_txs.push(("api", tx1));
        self.stop_txs.push(("replication", tx2));
    }

    async fn _start_servers<F: Future + Send + 'static>(
        replica: Arc<Replica>,
        node: Node,
        logger: Logger,
        sig_api: F,
        sig_repl: F,
    ) {
        let api_addr = node.api_addr;
        let repl_addr = node.replication;

        let recovery_loops = replica.start();

        let redisapi = RedisApi::new(replica.clone(), &logger);
        let lg = logger.clone();
        let j1 = tokio::spawn(async move {
            let rst = redisapi.serve_with_shutdown(api_addr, sig_api).await;
            info!(lg, "redis api exited: {:?}", rst);
        });

        let svc: Arc<dyn PaxosService> = replica.clone();
        let lg = logger.clone();
        let j2 = tokio::spawn(async move {
            let rst = serve_with_shutdown(repl_addr, svc, sig_repl, lg.clone()).await;
            info!(lg, "replication server exited: {:?}", rst);
        });

        for (name, j) in vec![("api", j1), ("replication", j2)].into_iter() {
            if let Err(e) = j.await {
                error!(logger, "{} server task failed: {}", name, e);
            }
        }

        replica.stop();
        for h in recovery_loops.into_iter() {
            let _ = h.await;
        }
    }

    /// stop stops proposing, then signals both servers to stop accepting.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        self.replica.stop();

        while let Some((name, tx)) = self.stop_txs.pop() {
            tx.send(()).or(Err(ServerError::RxClosed))?;
            info!(self.logger, "{} stop signal sent", name);
        }
        Ok(())
    }

    /// join waits for the servers started by `start` to exit.
    pub async fn join(&mut self) -> Result<(), ServerError> {
        let j = replace(&mut self.join_handle, None);
        j.ok_or(ServerError::NotStarted)?.await?;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
