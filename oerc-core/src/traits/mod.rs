pub use backend::*;
pub use chain::*;
pub use interaction::*;
pub use session::*;

mod backend;
mod chain;
mod interaction;
mod session;
