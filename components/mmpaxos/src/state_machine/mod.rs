mod state_machine;

pub use self::state_machine::*;
