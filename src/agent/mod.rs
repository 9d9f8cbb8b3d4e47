//! The decision and learning engine.

mod aggregate;
mod policy;
mod processor;
mod result;
mod stage;

pub use aggregate::*;
pub use policy::*;
pub use processor::Orchestrator;
pub use result::*;
pub use stage::*;
