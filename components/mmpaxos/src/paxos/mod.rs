//! Wire and in-memory types shared by every part of the engine.
//!
//! The message structs derive `prost::Message` directly so they can be framed
//! onto a socket without a code generation step.

use std::collections::BTreeMap;

#[macro_use]
pub mod macros;

mod ballot;
mod display;
mod instance;
mod message;

pub use ballot::*;
pub use display::*;
pub use instance::*;
pub use message::*;





/// ReplicaId identifies a cluster member. It is also the id of the column the
/// replica owns.
pub type ReplicaId = i64;

/// ColumnId identifies a log partition.
pub type ColumnId = i64;

/// Lsn is the position of an instance in its column.
pub type Lsn = i64;

/// BallotNum orders competing proposals on one column: by `n` first, then by
/// `replica_id`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Message)]
pub struct BallotNum {
    #[prost(int64, tag = "1")]
    pub n: i64,
    #[prost(int64, tag = "2")]
    pub replica_id: i64,
}

/// InstanceId is the identity of a proposed value: where it sits and who
/// proposed it. Two values at the same slot from different proposers have
/// different ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
pub struct InstanceId {
    #[prost(int64, tag = "1")]
    pub column: i64,
    #[prost(int64, tag = "2")]
    pub lsn: i64,
    #[prost(int64, tag = "3")]
    pub proposer_id: i64,
}

#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct Command {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(int64, tag = "2")]
    pub value: i64,
    /// A no-op fills a slot during recovery and never touches the map.
    #[prost(bool, tag = "3")]
    pub noop: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Instance {
    #[prost(message, optional, tag = "1")]
    pub instance_id: Option<InstanceId>,
    #[prost(message, optional, tag = "2")]
    pub cmd: Option<Command>,
    /// The ballot this value was last accepted with. `None` means it is only
    /// fast-accepted.
    #[prost(message, optional, tag = "3")]
    pub accept_ballot: Option<BallotNum>,
    #[prost(bool, tag = "4")]
    pub committed: bool,
    /// Log length of every column seen when this instance was proposed.
    #[prost(int64, repeated, tag = "5")]
    pub deps: Vec<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OpCode {
    AcceptOrPrepare = 0,
    Commit = 1,
}

/// Request is the single agreement RPC. It carries one or more instances of
/// one column, keyed by lsn.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Request {
    #[prost(enumeration = "OpCode", tag = "1")]
    pub op: i32,
    #[prost(message, optional, tag = "2")]
    pub ballot: Option<BallotNum>,
    #[prost(int64, tag = "3")]
    pub column: i64,
    #[prost(btree_map = "int64, message", tag = "4")]
    pub instances: BTreeMap<i64, Instance>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Reply {
    /// The highest ballot the replier has seen on the requested column.
    #[prost(message, optional, tag = "1")]
    pub highest_seen: Option<BallotNum>,
    #[prost(btree_map = "int64, message", tag = "2")]
    pub instances: BTreeMap<i64, Instance>,
}
