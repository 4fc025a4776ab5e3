use crate::conf::NodeId;
use crate::paxos::ReplicaId;

quick_error! {
    #[derive(Debug)]
    pub enum ConfError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
        }

        OrphanReplica(rid: ReplicaId, nid: NodeId) {
            display("replica {} is on an undefined node {}", rid, nid)
        }

        BadReplicaId(rid: ReplicaId) {
            display("replica ids must be 0, 1, 2..., got {}", rid)
        }

        ClusterSize(n: usize) {
            display("a cluster must have exactly 3 replicas, got {}", n)
        }
    }
}

impl PartialEq<ConfError> for ConfError {
    fn eq(&self, other: &ConfError) -> bool {
        match (self, other) {
            (Self::IOError(a), Self::IOError(b)) => a.kind() == b.kind(),
            (Self::BadYaml(_), Self::BadYaml(_)) => true,
            (Self::OrphanReplica(a, b), Self::OrphanReplica(x, y)) => a == x && b == y,
            (Self::BadReplicaId(a), Self::BadReplicaId(b)) => a == b,
            (Self::ClusterSize(a), Self::ClusterSize(b)) => a == b,
            _ => false,
        }
    }
}
