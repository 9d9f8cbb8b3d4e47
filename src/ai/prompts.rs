//! Prompts for the suggestion model.

use super::SuggestionRequest;

/// System prompt for the suggestion model.
pub const SUGGESTION_SYSTEM_PROMPT: &str = r#"You are a cautious invoice correction agent.

You ONLY give high confidence (>0.85) when a proposed change exactly matches a past human correction.
If no past human correction exists for this vendor, be conservative: confidence < 0.8.

Use dot notation for nested fields (e.g. "tax.rate").

Return ONLY valid JSON with this structure:
{
  "suggestions": [{ "field": "string", "value": "any", "reason": "string", "confidence": number }],
  "reasoning": "string"
}"#;

const NO_HISTORY: &str = "NONE - be very cautious, low confidence";

/// Format the user prompt for one invoice.
///
/// Shows the `history_limit` most recent reviews and the first
/// `reference_limit` purchase orders and delivery notes.
#[must_use]
pub fn format_suggestion_prompt(
    request: &SuggestionRequest<'_>,
    history_limit: usize,
    reference_limit: usize,
) -> String {
    let reviews = request.past_reviews;
    let examples = reviews[reviews.len().saturating_sub(history_limit)..]
        .iter()
        .map(|r| {
            format!(
                "Invoice {} ({}): Corrections → {}",
                r.invoice_id,
                r.vendor,
                serde_json::to_string(&r.corrections).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let examples = if examples.is_empty() {
        NO_HISTORY.to_string()
    } else {
        examples
    };

    let invoice = request.invoice;
    let fields = serde_json::to_string_pretty(&invoice.fields).unwrap_or_default();
    let pos = &request.reference.purchase_orders;
    let dns = &request.reference.delivery_notes;
    let pos = serde_json::to_string(&pos[..pos.len().min(reference_limit)]).unwrap_or_default();
    let dns = serde_json::to_string(&dns[..dns.len().min(reference_limit)]).unwrap_or_default();

    format!(
        r#"Past human corrections:
{examples}

Current invoice:
Vendor: {vendor}
ID: {id}
Raw text: """{raw}"""
Extracted fields: {fields}

Reference data:
POs: {pos}
DNs: {dns}"#,
        vendor = invoice.vendor,
        id = invoice.invoice_id,
        raw = invoice.raw_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{Correction, FieldValue, Fields, HumanReview, Invoice, ReferenceData};

    fn invoice() -> Invoice {
        let mut fields = Fields::new();
        fields.insert("grossTotal".to_string(), FieldValue::from(1200));
        Invoice {
            invoice_id: "INV-EX-001".to_string(),
            vendor: "Supplier GmbH".to_string(),
            fields,
            confidence: 0.75,
            raw_text: "Leistungsdatum fehlt".to_string(),
        }
    }

    fn review(n: usize) -> HumanReview {
        HumanReview::approved(
            format!("INV-{n}"),
            "Supplier GmbH",
            vec![Correction {
                field: "serviceDate".to_string(),
                from: FieldValue::Null,
                to: FieldValue::from("2024-01-01"),
                reason: "From Leistungsdatum".to_string(),
            }],
        )
    }

    #[test]
    fn test_prompt_without_history() {
        let invoice = invoice();
        let reference = ReferenceData::default();
        let request = SuggestionRequest {
            invoice: &invoice,
            past_reviews: &[],
            reference: &reference,
        };

        let prompt = format_suggestion_prompt(&request, 10, 5);
        assert!(prompt.contains("NONE - be very cautious"));
        assert!(prompt.contains("Vendor: Supplier GmbH"));
        assert!(prompt.contains("ID: INV-EX-001"));
        assert!(prompt.contains("Leistungsdatum fehlt"));
        assert!(prompt.contains("\"grossTotal\": 1200"));
    }

    #[test]
    fn test_prompt_keeps_most_recent_history() {
        let invoice = invoice();
        let reference = ReferenceData::default();
        let reviews: Vec<_> = (0..12).map(review).collect();
        let request = SuggestionRequest {
            invoice: &invoice,
            past_reviews: &reviews,
            reference: &reference,
        };

        let prompt = format_suggestion_prompt(&request, 10, 5);
        assert!(!prompt.contains("Invoice INV-1 "));
        assert!(prompt.contains("Invoice INV-2 (Supplier GmbH)"));
        assert!(prompt.contains("Invoice INV-11 (Supplier GmbH)"));
    }

    #[test]
    fn test_prompt_limits_reference_data() {
        let invoice = invoice();
        let reference = ReferenceData {
            purchase_orders: (0..8).map(|i| serde_json::json!({"po": i})).collect(),
            delivery_notes: vec![serde_json::json!({"dn": "DN-1"})],
        };
        let request = SuggestionRequest {
            invoice: &invoice,
            past_reviews: &[],
            reference: &reference,
        };

        let prompt = format_suggestion_prompt(&request, 10, 5);
        assert!(prompt.contains(r#"{"po":4}"#));
        assert!(!prompt.contains(r#"{"po":5}"#));
        assert!(prompt.contains(r#"{"dn":"DN-1"}"#));
    }

    #[test]
    fn test_system_prompt_describes_response_shape() {
        assert!(SUGGESTION_SYSTEM_PROMPT.contains("\"suggestions\""));
        assert!(SUGGESTION_SYSTEM_PROMPT.contains("\"reasoning\""));
    }
}
