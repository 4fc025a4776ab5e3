use crate::paxos::BallotNum;
use crate::paxos::ColumnId;
use crate::paxos::Lsn;
use crate::paxos::ReplicaId;
use crate::transport::TransportError;

quick_error! {
    /// ReplicaError is a failed round. Except `Shutdown` and `NotInCluster`
    /// the proposer retries on all of them.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ReplicaError {
        HigherBallot(seen: BallotNum) {
            display("seen a higher ballot: {}", seen)
        }

        Transport(e: TransportError) {
            from(e: TransportError) -> (e)
            display("transport: {}", e)
        }

        MissingInstance(column: ColumnId, lsn: Lsn) {
            display("no instance {}-{} in reply", column, lsn)
        }

        NotInCluster(rid: ReplicaId) {
            display("replica {} is not in cluster", rid)
        }

        Shutdown {
            display("replica is shutting down")
        }
    }
}
