use crate::paxos::ColumnId;

quick_error! {
    #[derive(Debug, Eq, PartialEq)]
    pub enum ApplyError {
        /// The next instance to apply on `column` is not committed yet.
        Uncommitted(column: ColumnId) {
            display("next instance on column {} is not committed", column)
        }
    }
}
