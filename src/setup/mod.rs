mod log_format;
mod setup;

pub use self::setup::*;
pub use log_format::*;
