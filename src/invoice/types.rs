//! Invoice, suggestion and review types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::path::FieldPath;
use super::value::{FieldValue, Fields};

/// An extracted invoice awaiting correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique invoice identifier.
    pub invoice_id: String,
    /// Issuing vendor; the unit of memory partitioning.
    pub vendor: String,
    /// Extracted fields. `null` reads as no fields.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: Fields,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
    /// Raw text the fields were extracted from.
    #[serde(default)]
    pub raw_text: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fields, D::Error> {
    Ok(Option::<Fields>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_or_numeric_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(text)) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("confidence is not a number: {text:?}"))
        }),
    }
}

/// Reference documents passed along to the suggester.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    #[serde(default)]
    pub purchase_orders: Vec<serde_json::Value>,
    #[serde(default)]
    pub delivery_notes: Vec<serde_json::Value>,
}

/// A field-level correction proposed by the AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Dot-notation path of the field.
    pub field: String,
    /// Proposed value.
    #[serde(default)]
    pub value: FieldValue,
    /// Why the change is proposed.
    #[serde(default)]
    pub reason: String,
    /// Confidence in `[0, 1]`. Numeric strings such as `"0.85"` are accepted.
    #[serde(default, deserialize_with = "number_or_numeric_text")]
    pub confidence: f64,
}

impl Suggestion {
    /// Create a suggestion.
    pub fn new(
        field: impl Into<String>,
        value: impl Into<FieldValue>,
        reason: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            confidence,
        }
    }

    /// Parsed field path.
    #[must_use]
    pub fn path(&self) -> FieldPath {
        FieldPath::parse(&self.field)
    }

    /// Clamp confidence into `[0, 1]`; non-finite values become 0.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Human-readable description, e.g.
    /// `serviceDate → "2024-01-01" (conf: 0.92, From Leistungsdatum)`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} → {} (conf: {:.2}, {})",
            self.field, self.value, self.confidence, self.reason
        )
    }
}

/// A human-confirmed field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub field: String,
    #[serde(default)]
    pub from: FieldValue,
    pub to: FieldValue,
    #[serde(default)]
    pub reason: String,
}

/// Outcome of a human review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalDecision {
    #[default]
    Approved,
    Rejected,
}

impl FinalDecision {
    /// Returns the string representation for database storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown decision string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown final decision: {0}")]
pub struct UnknownDecision(pub String);

impl FromStr for FinalDecision {
    type Err = UnknownDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownDecision(other.to_string())),
        }
    }
}

/// A human review of one invoice: the unit of learned memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanReview {
    pub invoice_id: String,
    pub vendor: String,
    pub corrections: Vec<Correction>,
    pub final_decision: FinalDecision,
}

impl HumanReview {
    /// Create an approved review.
    pub fn approved(
        invoice_id: impl Into<String>,
        vendor: impl Into<String>,
        corrections: Vec<Correction>,
    ) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            vendor: vendor.into(),
            corrections,
            final_decision: FinalDecision::Approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_deserializes_camel_case() {
        let json = r#"{
            "invoiceId": "INV-A-001",
            "vendor": "Supplier GmbH",
            "fields": {"serviceDate": null, "grossTotal": 1200},
            "confidence": 0.75,
            "rawText": "Rechnung vom 15.03.2024",
            "extra": "ignored"
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.invoice_id, "INV-A-001");
        assert!(invoice.fields["serviceDate"].is_null());
        assert_eq!(invoice.fields["grossTotal"], FieldValue::from(1200));
    }

    #[test]
    fn test_invoice_null_fields_read_as_empty() {
        let json = r#"{"invoiceId": "INV-1", "vendor": "Parts AG", "fields": null, "confidence": 0.6}"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert!(invoice.fields.is_empty());
        assert!(invoice.raw_text.is_empty());
    }

    #[test]
    fn test_suggestion_confidence_accepts_numeric_text() {
        let s: Suggestion =
            serde_json::from_str(r#"{"field": "x", "value": 1, "confidence": " 0.85"}"#).unwrap();
        assert!((s.confidence - 0.85).abs() < f64::EPSILON);

        let s: Suggestion =
            serde_json::from_str(r#"{"field": "x", "confidence": null}"#).unwrap();
        assert!(s.confidence.abs() < f64::EPSILON);

        assert!(serde_json::from_str::<Suggestion>(r#"{"field": "x", "confidence": "high"}"#).is_err());
    }

    #[test]
    fn test_suggestion_describe() {
        let s = Suggestion::new("serviceDate", "2024-01-01", "From Leistungsdatum", 0.9);
        assert_eq!(
            s.describe(),
            "serviceDate → \"2024-01-01\" (conf: 0.90, From Leistungsdatum)"
        );
    }

    #[test]
    fn test_suggestion_sanitized_clamps() {
        assert!((Suggestion::new("a", 1, "", 1.7).sanitized().confidence - 1.0).abs() < f64::EPSILON);
        assert!(Suggestion::new("a", 1, "", -0.2).sanitized().confidence.abs() < f64::EPSILON);
        assert!(Suggestion::new("a", 1, "", f64::NAN).sanitized().confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_suggestion_missing_value_defaults_null() {
        let s: Suggestion =
            serde_json::from_str(r#"{"field": "x", "reason": "r", "confidence": 0.5}"#).unwrap();
        assert!(s.value.is_null());
    }

    #[test]
    fn test_final_decision_parse() {
        assert_eq!("approved".parse(), Ok(FinalDecision::Approved));
        assert_eq!("rejected".parse(), Ok(FinalDecision::Rejected));
        assert!("maybe".parse::<FinalDecision>().is_err());
    }

    #[test]
    fn test_human_review_serializes_camel_case() {
        let review = HumanReview::approved("INV-1", "Parts AG", vec![]);
        let json = serde_json::to_string(&review).unwrap();
        assert!(json.contains("\"invoiceId\":\"INV-1\""));
        assert!(json.contains("\"finalDecision\":\"approved\""));
    }
}
