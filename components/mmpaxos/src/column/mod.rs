mod column;
mod errors;

pub use self::column::*;
pub use errors::*;
