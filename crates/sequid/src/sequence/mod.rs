mod factory;
mod generator;
mod interface;
mod key;
mod mutex;
mod state;

pub use factory::*;
pub use generator::*;
pub use interface::*;
pub use key::*;
pub use state::*;
