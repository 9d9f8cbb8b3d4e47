//! Audit event types.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Processing step an audit event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStep {
    /// Learned memory was loaded.
    Recall,
    /// A suggestion was written into the normalized invoice.
    Apply,
    /// The review decision was made.
    Decide,
}

impl AuditStep {
    /// Returns the string representation used in logs and output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recall => "recall",
            Self::Apply => "apply",
            Self::Decide => "decide",
        }
    }
}

impl fmt::Display for AuditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single immutable audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    step: AuditStep,
    #[serde(serialize_with = "serialize_iso8601")]
    timestamp: DateTime<Utc>,
    details: String,
}

impl AuditEvent {
    pub(crate) fn new(step: AuditStep, timestamp: DateTime<Utc>, details: String) -> Self {
        Self {
            step,
            timestamp,
            details,
        }
    }

    #[must_use]
    pub fn step(&self) -> AuditStep {
        self.step
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
fn serialize_iso8601<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
