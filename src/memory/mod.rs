//! Learned memory of human-approved corrections.

mod error;
mod schema;
mod store;

pub use error::MemoryError;
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use store::{default_memory_path, MemoryStore};
