//! Append-only audit trail for one processing run.

use chrono::{DateTime, Utc};

use super::types::{AuditEvent, AuditStep};

/// Ordered, append-only log of processing steps for a single invoice.
///
/// Timestamps never go backwards within a trail, even if the wall clock does.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the current time.
    pub fn record(&mut self, step: AuditStep, details: impl Into<String>) {
        self.record_at(step, Utc::now(), details);
    }

    /// Append an event with an explicit timestamp, clamped to the last one.
    pub fn record_at(&mut self, step: AuditStep, at: DateTime<Utc>, details: impl Into<String>) {
        let timestamp = self
            .events
            .last()
            .map_or(at, |last| at.max(last.timestamp()));
        let details = details.into();
        tracing::trace!(step = %step, %details, "Audit event");
        self.events.push(AuditEvent::new(step, timestamp, details));
    }

    /// Events in the order they were recorded.
    #[must_use]
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Number of events for a given step.
    #[must_use]
    pub fn count(&self, step: AuditStep) -> usize {
        self.events.iter().filter(|e| e.step() == step).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consume the trail, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<AuditEvent> {
        self.events
    }
}
