use mmpaxos::conf::ConfError;
use mmpaxos::replica::ReplicaError;

quick_error! {
    /// ServerError defines errors of starting or stopping a server.
    #[derive(Debug, PartialEq)]
    pub enum ServerError {
        RxClosed {
            display("stop signal receiver closed")
        }

        NotStarted {
            display("server is not started")
        }

        Join(msg: String) {
            from(e: tokio::task::JoinError) -> (e.to_string())
            display("server task failed: {}", msg)
        }
    }
}

quick_error! {
    /// PkvError is what the binary may fail with.
    #[derive(Debug)]
    pub enum PkvError {
        Conf(e: ConfError) {
            from()
            display("cluster conf: {}", e)
        }

        Replica(e: ReplicaError) {
            from()
            display("replica: {}", e)
        }

        Server(e: ServerError) {
            from()
            display("server: {}", e)
        }

        Io(e: std::io::Error) {
            from()
            display("io: {}", e)
        }

        BadArg(msg: String) {
            display("bad argument: {}", msg)
        }
    }
}
