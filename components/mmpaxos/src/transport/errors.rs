use crate::paxos::ReplicaId;

quick_error! {
    #[derive(Debug, Eq, PartialEq)]
    pub enum TransportError {
        Io(msg: String) {
            from(e: std::io::Error) -> (e.to_string())
            display("io error: {}", msg)
        }

        Decode(msg: String) {
            from(e: prost::DecodeError) -> (e.to_string())
            display("bad message: {}", msg)
        }

        Closed {
            display("connection closed before reply")
        }

        NoSuchReplica(rid: ReplicaId) {
            display("replica {} not found", rid)
        }

        Unreachable(rid: ReplicaId) {
            display("replica {} is unreachable", rid)
        }

        Injected(stage: &'static str) {
            display("injected {} error", stage)
        }

        Timeout {
            display("rpc timeout")
        }
    }
}
