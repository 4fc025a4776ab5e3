use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfError;
use crate::apply::Applier;
use crate::paxos::ReplicaId;

/// A proposer and one peer form a majority only in a 3-replica cluster.
pub const CLUSTER_SIZE: usize = 3;

/// NodeId is the name of a server process in the cluster yaml.
pub type NodeId = String;

/// Node is where a replica serves: a client api address and a replication
/// address.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct Node {
    #[serde(default)]
    pub node_id: NodeId,
    pub api_addr: SocketAddr,
    pub replication: SocketAddr,
}

/// ReplicaConf holds the timing of the replication loops.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct ReplicaConf {
    /// Deadline of one agreement RPC.
    pub rpc_timeout_ms: u64,

    /// Attempts to deliver a commit to a peer before giving up.
    pub commit_retries: usize,
    pub commit_retry_interval_ms: u64,

    /// A recovery loop polls every `recovery_interval_ms` plus a random
    /// extra of up to the same amount.
    pub recovery_interval_ms: u64,

    /// Upper bound of the random sleep after a failed round.
    pub retry_jitter_ms: u64,
}

impl Default for ReplicaConf {
    fn default() -> Self {
        ReplicaConf {
            rpc_timeout_ms: 3000,
            commit_retries: 3,
            commit_retry_interval_ms: 10,
            recovery_interval_ms: 10,
            retry_jitter_ms: 2,
        }
    }
}

impl ReplicaConf {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn commit_retry_interval(&self) -> Duration {
        Duration::from_millis(self.commit_retry_interval_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClusterInfo {
    /// The key is NodeId and should be unique globally.
    pub nodes: BTreeMap<NodeId, Node>,

    /// Replica ids are also column ids and must be `0..n`.
    pub replicas: BTreeMap<ReplicaId, NodeId>,

    #[serde(default)]
    pub applier: Applier,

    #[serde(default)]
    pub replica: ReplicaConf,
}

// let user to use c.get() just like c.nodes.get()
impl Deref for ClusterInfo {
    type Target = BTreeMap<NodeId, Node>;
    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

impl DerefMut for ClusterInfo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.nodes
    }
}

impl FromStr for ClusterInfo {
    type Err = ConfError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        let mut cluster: ClusterInfo = serde_yaml::from_str(yaml)?;

        for (nid, node) in cluster.nodes.iter_mut() {
            ClusterInfo::norm_node(nid, node);
        }

        cluster.check_replicas()?;
        Ok(cluster)
    }
}

impl ClusterInfo {
    /// from_file read cluster conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterInfo, ConfError> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// get_replica_node returns the Node where the specified replica is.
    pub fn get_replica_node(&self, rid: ReplicaId) -> Option<&Node> {
        let nid = self.replicas.get(&rid)?;
        self.nodes.get(nid)
    }

    pub fn replica_ids(&self) -> Vec<ReplicaId> {
        self.replicas.keys().copied().collect()
    }

    /// replication_addrs maps every replica to the address it accepts
    /// agreement requests on.
    pub fn replication_addrs(&self) -> BTreeMap<ReplicaId, SocketAddr> {
        self.replicas
            .keys()
            .filter_map(|rid| Some((*rid, self.get_replica_node(*rid)?.replication)))
            .collect()
    }

    pub fn norm_node(nid: &str, node: &mut Node) {
        node.node_id = String::from(nid);
    }

    /// check_replicas checks that every replica is on a known node and the
    /// replica ids are exactly `0..3`.
    pub fn check_replicas(&self) -> Result<(), ConfError> {
        for (rid, nid) in self.replicas.iter() {
            if !self.nodes.contains_key(nid) {
                return Err(ConfError::OrphanReplica(*rid, nid.clone()));
            }
        }

        for (i, rid) in self.replicas.keys().enumerate() {
            if *rid != i as ReplicaId {
                return Err(ConfError::BadReplicaId(*rid));
            }
        }

        if self.replicas.len() != CLUSTER_SIZE {
            return Err(ConfError::ClusterSize(self.replicas.len()));
        }

        Ok(())
    }
}
