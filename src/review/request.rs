//! Review requests and how a human answer turns into learned memory.

use crate::agent::ProcessingResult;
use crate::invoice::{Correction, FieldPath, FieldValue, HumanReview, Invoice, Suggestion};

const AGREE_REASON: &str = "Human approved AI suggestion";
const MANUAL_REASON: &str = "Manual human correction";

/// A manual field edit entered by the reviewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEdit {
    pub field: String,
    pub value: FieldValue,
}

impl ManualEdit {
    /// Build an edit from raw text, parsing the value as JSON when possible.
    pub fn parse(field: impl Into<String>, raw_value: &str) -> Self {
        Self {
            field: field.into(),
            value: FieldValue::parse_lenient(raw_value),
        }
    }
}

/// What the reviewer decided.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    /// Accept every proposed suggestion.
    Agree,
    /// Replace the proposal with manual edits.
    Modify(Vec<ManualEdit>),
    /// Learn nothing from this invoice.
    Skip,
}

/// Decision request emitted for an escalated invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRequest {
    pub invoice_id: String,
    pub vendor: String,
    pub proposed: Vec<Suggestion>,
    pub reasoning: String,
    pub confidence_score: f64,
}

impl ReviewRequest {
    /// Build a request from a processing result, or `None` if no review is needed.
    #[must_use]
    pub fn from_result(result: &ProcessingResult) -> Option<Self> {
        result.requires_human_review.then(|| Self {
            invoice_id: result.invoice_id().to_string(),
            vendor: result.vendor().to_string(),
            proposed: result.suggestions.clone(),
            reasoning: result.reasoning.clone(),
            confidence_score: result.confidence_score,
        })
    }

    /// Turn the reviewer's action into a review to persist.
    ///
    /// Returns `None` for a skip or when the action yields no corrections.
    #[must_use]
    pub fn resolve(&self, action: &ReviewAction, original: &Invoice) -> Option<HumanReview> {
        let corrections: Vec<Correction> = match action {
            ReviewAction::Skip => return None,
            ReviewAction::Agree => self
                .proposed
                .iter()
                .map(|s| Correction {
                    field: s.field.clone(),
                    from: original_value(original, &s.field),
                    to: s.value.clone(),
                    reason: AGREE_REASON.to_string(),
                })
                .collect(),
            ReviewAction::Modify(edits) => edits
                .iter()
                .map(|edit| Correction {
                    field: edit.field.clone(),
                    from: original_value(original, &edit.field),
                    to: edit.value.clone(),
                    reason: MANUAL_REASON.to_string(),
                })
                .collect(),
        };

        if corrections.is_empty() {
            return None;
        }
        Some(HumanReview::approved(
            self.invoice_id.clone(),
            self.vendor.clone(),
            corrections,
        ))
    }
}

fn original_value(invoice: &Invoice, field: &str) -> FieldValue {
    FieldPath::parse(field)
        .get(&invoice.fields)
        .cloned()
        .unwrap_or_default()
}
