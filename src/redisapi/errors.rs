use mmpaxos::replica::ReplicaError;

quick_error! {
    /// RedisApiError is sent back to the client as an error reply.
    #[derive(Debug, PartialEq)]
    pub enum RedisApiError {
        InvalidCommand {
            display("invalid command")
        }

        UnknownCommand(name: String) {
            display("unknown command '{}'", name)
        }

        WrongArity(name: String) {
            display("wrong number of arguments for '{}' command", name)
        }

        NotInteger {
            display("value is not an integer or out of range")
        }

        InvalidKey {
            display("key is not valid utf-8")
        }

        ExecCommandError(msg: String) {
            from(err: ReplicaError) -> (err.to_string())
            display("{}", msg)
        }
    }
}
