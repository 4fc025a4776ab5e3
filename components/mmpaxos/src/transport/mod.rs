//! Delivers agreement requests between replicas.

mod errors;
mod faulty;
mod local;
mod tcp;
mod transport;

pub use errors::*;
pub use faulty::*;
pub use local::*;
pub use tcp::*;
pub use transport::*;


#[cfg(test)]
mod test_local;
