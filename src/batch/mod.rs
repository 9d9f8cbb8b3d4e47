//! Batch driver: load invoices, process them in order, collect reviews, save outputs.

mod error;
mod input;
mod report;
mod runner;

pub use error::BatchError;
pub use input::*;
pub use report::{write_json_atomic, write_outputs};
pub use runner::*;
