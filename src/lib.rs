//! Invoice Agent - Human-in-the-loop invoice correction with learned vendor memory.

pub mod agent;
pub mod ai;
pub mod audit;
pub mod batch;
pub mod config;
pub mod display;
pub mod invoice;
pub mod memory;
pub mod review;
