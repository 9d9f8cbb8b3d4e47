//! Folding AI suggestions into a score and a normalized invoice.

use crate::audit::{AuditStep, AuditTrail};
use crate::invoice::{Invoice, Suggestion};

/// Fold suggestion confidences into `base` by sequential running average.
///
/// Each step averages the current running value with the next confidence,
/// so the order of `confidences` changes the result.
#[must_use]
pub fn fold_confidence(base: f64, confidences: impl IntoIterator<Item = f64>) -> f64 {
    confidences
        .into_iter()
        .fold(base, |score, confidence| (score + confidence) / 2.0)
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Copy of the input invoice with confident suggestions written in.
    pub normalized: Invoice,
    /// One description per suggestion, in input order.
    pub corrections: Vec<String>,
    pub score: f64,
    /// Suggestions actually written.
    pub applied: usize,
    pub total: usize,
}

/// Builds corrections and the aggregate score from raw suggestions.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    auto_apply: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { auto_apply: 0.80 }
    }
}

impl Aggregator {
    #[must_use]
    pub fn new(auto_apply: f64) -> Self {
        Self { auto_apply }
    }

    /// Aggregate `suggestions` against `invoice`.
    ///
    /// Suggestions at or above the auto-apply threshold are written into a
    /// copy of the fields. Only writes that land are counted as applied and
    /// recorded in `trail`; a nested path with a missing parent is skipped.
    pub fn aggregate(
        &self,
        invoice: &Invoice,
        suggestions: &[Suggestion],
        trail: &mut AuditTrail,
    ) -> Aggregation {
        let mut normalized = invoice.clone();
        let mut applied = 0;

        for suggestion in suggestions {
            if suggestion.confidence < self.auto_apply {
                continue;
            }
            let path = suggestion.path();
            if path.apply(&mut normalized.fields, suggestion.value.clone()) {
                applied += 1;
                trail.record(
                    AuditStep::Apply,
                    format!(
                        "Auto-applied {} = {} (conf {:.2})",
                        suggestion.field, suggestion.value, suggestion.confidence
                    ),
                );
            } else {
                tracing::debug!(
                    invoice_id = %invoice.invoice_id,
                    field = %suggestion.field,
                    "Skipped suggestion with unwritable path"
                );
            }
        }

        Aggregation {
            normalized,
            corrections: suggestions.iter().map(Suggestion::describe).collect(),
            score: fold_confidence(invoice.confidence, suggestions.iter().map(|s| s.confidence)),
            applied,
            total: suggestions.len(),
        }
    }
}
