//! RESP for the client api: a codec for `tokio_util::codec::Framed` and the
//! replies it encodes.

#[macro_use]
extern crate quick_error;

mod codec;
mod response;

pub use codec::*;
pub use response::*;

pub use redis_protocol::resp2::types::BytesFrame;
