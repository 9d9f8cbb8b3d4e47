//! Per-invoice audit trail.

mod trail;
mod types;

pub use trail::AuditTrail;
pub use types::{AuditEvent, AuditStep};
