//! mmpaxos is a multi-leader replicated key-value engine.
//!
//! Every replica owns one column of the log and commits its writes there
//! with one round trip to one peer. Instances record the log length of every
//! column when they were proposed, and an applier turns these dependencies
//! into one order shared by all replicas.

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog;

#[macro_use]
pub mod paxos;

pub mod apply;
pub mod column;
pub mod conf;
pub mod replica;
pub mod state_machine;
pub mod testutil;
pub mod transport;
