use crate::paxos::Lsn;

quick_error! {
    /// ColumnError is never expected in a correct run. Callers escalate it to
    /// a crash instead of retrying.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ColumnError {
        InvalidLsn(lsn: Lsn) {
            display("invalid lsn: {}", lsn)
        }

        OverwriteCommitted(committed: String, new: String) {
            display("overwrite committed instance {} with {}", committed, new)
        }
    }
}
