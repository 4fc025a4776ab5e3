//! Decides the order in which committed instances of all columns take effect.

mod apply;
mod apply_data;
mod errors;
mod scc;
mod tarjan;
mod vc;

pub use self::apply::*;
pub use apply_data::*;
pub use errors::*;
pub use scc::*;
pub use tarjan::*;
pub use vc::*;
