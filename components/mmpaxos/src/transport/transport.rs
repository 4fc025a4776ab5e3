use async_trait::async_trait;

use crate::paxos::Reply;
use crate::paxos::ReplicaId;
use crate::paxos::Request;
use crate::transport::TransportError;

/// Transport sends one agreement request to a replica and waits for the
/// reply. It does not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, to: ReplicaId, req: Request) -> Result<Reply, TransportError>;
}

/// PaxosService is the receiving end of a Transport.
pub trait PaxosService: Send + Sync {
    fn handle_paxos(&self, req: Request) -> Reply;
}
