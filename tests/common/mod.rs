//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use invoice_agent::ai::{AiError, Suggester, SuggestionRequest, SuggestionResponse};
use invoice_agent::invoice::{Correction, FieldValue, Fields, HumanReview, Invoice, Suggestion};

/// Suggester answering from a per-invoice script and recording what it saw.
#[derive(Default)]
pub struct ScriptedSuggester {
    responses: HashMap<String, SuggestionResponse>,
    fail: bool,
    seen_history: Mutex<Vec<usize>>,
}

impl ScriptedSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggester whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn respond(mut self, invoice_id: &str, suggestions: Vec<Suggestion>) -> Self {
        self.responses.insert(
            invoice_id.to_string(),
            SuggestionResponse {
                suggestions,
                reasoning: format!("Checked {invoice_id}."),
            },
        );
        self
    }

    /// Number of past reviews passed on each call, in call order.
    pub fn seen_history(&self) -> Vec<usize> {
        self.seen_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl Suggester for ScriptedSuggester {
    async fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<SuggestionResponse, AiError> {
        self.seen_history
            .lock()
            .unwrap()
            .push(request.past_reviews.len());
        if self.fail {
            return Err(AiError::RequestFailed("HTTP 503: upstream down".to_string()));
        }
        Ok(self
            .responses
            .get(&request.invoice.invoice_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn invoice(id: &str, vendor: &str, confidence: f64) -> Invoice {
    let mut fields = Fields::new();
    fields.insert("grossTotal".to_string(), FieldValue::from(1190));
    fields.insert("currency".to_string(), FieldValue::Null);
    Invoice {
        invoice_id: id.to_string(),
        vendor: vendor.to_string(),
        fields,
        confidence,
        raw_text: format!("Rechnung {id}"),
    }
}

pub fn review(id: &str, vendor: &str, to: &str) -> HumanReview {
    HumanReview::approved(
        id,
        vendor,
        vec![Correction {
            field: "currency".to_string(),
            from: FieldValue::Null,
            to: FieldValue::from(to),
            reason: "Manual human correction".to_string(),
        }],
    )
}
