mod errors;
mod redisapi;

pub use self::redisapi::*;
pub use errors::*;
