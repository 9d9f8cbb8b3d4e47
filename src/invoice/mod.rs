//! Invoice data model shared by the agent, memory store and review flow.

mod path;
mod types;
mod value;

pub use path::FieldPath;
pub use types::*;
pub use value::{FieldValue, Fields};
