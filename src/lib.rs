//! pkv serves the redis protocol on top of a three-replica mmpaxos cluster.

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog;

mod errors;
pub use errors::*;

pub mod redisapi;
pub use redisapi::*;

pub mod server;
pub use server::*;

pub mod setup;
