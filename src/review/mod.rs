//! Human review: decision requests and the adapters that answer them.

mod request;
mod terminal;

pub use request::*;
pub use terminal::*;
