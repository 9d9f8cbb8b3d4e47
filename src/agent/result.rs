//! Output of processing one invoice.

use serde::{Deserialize, Serialize};

use crate::audit::AuditEvent;
use crate::invoice::{Invoice, Suggestion};

/// Result of one invoice-processing run.
///
/// Serializes to the camelCase shape of the result log. Counters and the raw
/// suggestions are kept in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub normalized_invoice: Invoice,
    /// Human-readable description per suggestion, in suggestion order.
    pub proposed_corrections: Vec<String>,
    pub requires_human_review: bool,
    /// Accumulated reasoning, segments joined with ` | `.
    pub reasoning: String,
    /// Aggregate score rounded to two decimals.
    pub confidence_score: f64,
    #[serde(default)]
    pub memory_updates: Vec<String>,
    #[serde(default)]
    pub audit_trail: Vec<AuditEvent>,

    /// Suggestions as returned by the suggester, confidences sanitized.
    #[serde(skip)]
    pub suggestions: Vec<Suggestion>,
    /// Suggestions actually written into the normalized invoice.
    #[serde(skip)]
    pub applied: usize,
    /// Whether the suggester answered.
    #[serde(skip)]
    pub ai_available: bool,
}

impl ProcessingResult {
    #[must_use]
    pub fn invoice_id(&self) -> &str {
        &self.normalized_invoice.invoice_id
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.normalized_invoice.vendor
    }

    #[must_use]
    pub fn suggestion_count(&self) -> usize {
        self.suggestions.len()
    }
}

/// Round to two decimals for reporting.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::Fields;

    #[test]
    fn test_round_score() {
        assert!((round_score(0.656_25) - 0.66).abs() < f64::EPSILON);
        assert!((round_score(0.8) - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialized_keys() {
        let result = ProcessingResult {
            normalized_invoice: Invoice {
                invoice_id: "INV-1".to_string(),
                vendor: "V".to_string(),
                fields: Fields::new(),
                confidence: 0.5,
                raw_text: String::new(),
            },
            proposed_corrections: Vec::new(),
            requires_human_review: true,
            reasoning: "r".to_string(),
            confidence_score: 0.5,
            memory_updates: Vec::new(),
            audit_trail: Vec::new(),
            suggestions: Vec::new(),
            applied: 0,
            ai_available: false,
        };

        let json = serde_json::to_value(&result).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "auditTrail",
                "confidenceScore",
                "memoryUpdates",
                "normalizedInvoice",
                "proposedCorrections",
                "reasoning",
                "requiresHumanReview"
            ]
        );
        assert_eq!(json["normalizedInvoice"]["invoiceId"], "INV-1");
        assert_eq!(result.invoice_id(), "INV-1");
    }
}
