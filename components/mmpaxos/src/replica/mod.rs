//! A replica owns one column, serves agreement requests on every column and
//! proposes client writes on its own.

mod errors;
mod handler;
mod proposer;
mod recovery;
mod replica;
mod state;

pub use errors::*;
pub use handler::*;
pub use self::replica::*;
pub use state::*;

#[cfg(test)]
mod test_handler;

#[cfg(test)]
mod test_proposer;


#[cfg(test)]
mod test_state;
