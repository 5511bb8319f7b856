pub use backend::*;
pub use chain::*;
pub use interaction::*;

mod backend;
mod chain;
mod interaction;
