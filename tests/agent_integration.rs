//! Integration tests for the per-invoice decision engine.

mod common;

use invoice_agent::agent::{
    fold_confidence, DecisionInputs, DecisionPolicy, EscalationReason, Orchestrator,
    ReviewDecision,
};
use invoice_agent::audit::AuditStep;
use invoice_agent::config::Thresholds;
use invoice_agent::invoice::{FieldValue, ReferenceData, Suggestion};
use invoice_agent::memory::MemoryStore;

use common::{invoice, review, ScriptedSuggester};

async fn store_with(vendor: &str) -> MemoryStore {
    let store = MemoryStore::open_in_memory().await.unwrap();
    store.save(&review("INV-0", vendor, "EUR")).await.unwrap();
    store
}

/// Folding is sequential, so the order of suggestions changes the score.
#[tokio::test]
async fn test_running_average_is_order_sensitive() {
    let mut scores = Vec::new();
    for confidences in [[0.9, 0.5], [0.5, 0.9]] {
        let suggestions = confidences
            .iter()
            .enumerate()
            .map(|(i, &c)| Suggestion::new(format!("note{i}"), "x", "test", c))
            .collect();
        let suggester = ScriptedSuggester::new().respond("INV-1", suggestions);
        let orchestrator = Orchestrator::new(
            MemoryStore::open_in_memory().await.unwrap(),
            suggester,
            Thresholds::default(),
        );
        let result = orchestrator
            .process(&invoice("INV-1", "Supplier GmbH", 0.7), &ReferenceData::default())
            .await;
        scores.push(result.confidence_score);
    }

    assert!((scores[0] - 0.65).abs() < 1e-9, "got {}", scores[0]);
    assert!((scores[1] - 0.75).abs() < 1e-9, "got {}", scores[1]);
    assert!((fold_confidence(0.7, [0.9, 0.5]) - fold_confidence(0.7, [0.5, 0.9])).abs() > 0.05);
}

/// A suggestion at exactly 0.8 is applied; one at 0.79 is not.
#[tokio::test]
async fn test_auto_apply_threshold_is_inclusive() {
    let suggester = ScriptedSuggester::new().respond(
        "INV-1",
        vec![
            Suggestion::new("currency", "EUR", "Raw text", 0.8),
            Suggestion::new("grossTotal", 2380, "VAT included", 0.79),
        ],
    );
    let orchestrator = Orchestrator::new(
        MemoryStore::open_in_memory().await.unwrap(),
        suggester,
        Thresholds::default(),
    );
    let result = orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.9), &ReferenceData::default())
        .await;

    let fields = &result.normalized_invoice.fields;
    assert_eq!(fields["currency"], FieldValue::from("EUR"));
    assert_eq!(fields["grossTotal"], FieldValue::from(1190));
    assert_eq!(result.applied, 1);
    assert_eq!(
        result
            .audit_trail
            .iter()
            .filter(|e| e.step() == AuditStep::Apply)
            .count(),
        1
    );
}

/// The applied-ratio gate passes at 7 of 10 and fails at 6 of 10.
#[test]
fn test_decision_gate_boundaries() {
    let policy = DecisionPolicy::new(Thresholds::default());
    let inputs = |applied| DecisionInputs {
        has_vendor_history: true,
        score: 0.80,
        applied,
        total_suggestions: 10,
        suggestions_available: true,
    };

    let pass = policy.decide(&inputs(7));
    assert_eq!(pass, ReviewDecision::AutoApprove);
    assert!(!pass.requires_human_review());

    let fail = policy.decide(&inputs(6));
    assert_eq!(
        fail,
        ReviewDecision::Escalate(EscalationReason::InsufficientConfidence)
    );
    assert!(fail.requires_human_review());
}

/// A failing suggester yields a well-formed escalated result.
#[tokio::test]
async fn test_suggester_failure_falls_back() {
    let orchestrator = Orchestrator::new(
        store_with("Supplier GmbH").await,
        ScriptedSuggester::failing(),
        Thresholds::default(),
    );
    let result = orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.95), &ReferenceData::default())
        .await;

    assert!(result.suggestions.is_empty());
    assert!(result.proposed_corrections.is_empty());
    assert!(result.requires_human_review);
    assert!(!result.ai_available);
    assert_eq!(
        result.reasoning,
        "AI suggestion failed. | AI unavailable — escalating to human review"
    );
    assert!((result.confidence_score - 0.95).abs() < f64::EPSILON);
    assert_eq!(result.audit_trail.len(), 2);
}

/// Zero suggestions with history and a high base score auto-approve.
#[tokio::test]
async fn test_no_suggestions_with_history_auto_approves() {
    let orchestrator = Orchestrator::new(
        store_with("Supplier GmbH").await,
        ScriptedSuggester::new(),
        Thresholds::default(),
    );
    let result = orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.85), &ReferenceData::default())
        .await;

    assert!(!result.requires_human_review);
    assert!(result.reasoning.ends_with("auto-approved."));
    assert_eq!(
        result.audit_trail.last().unwrap().details(),
        "Vendor memory exists: true | Final confidence: 0.85 | Human review: false"
    );
}

/// History for other vendors does not count as vendor history.
#[tokio::test]
async fn test_other_vendor_history_escalates() {
    let orchestrator = Orchestrator::new(
        store_with("Parts AG").await,
        ScriptedSuggester::new(),
        Thresholds::default(),
    );
    let result = orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.95), &ReferenceData::default())
        .await;

    assert!(result.requires_human_review);
    assert!(result.reasoning.contains("First time processing invoice"));
}

/// The suggester sees the full history, not only the vendor's.
#[tokio::test]
async fn test_suggester_receives_full_history() {
    let store = store_with("Parts AG").await;
    store
        .save(&review("INV-00", "Supplier GmbH", "EUR"))
        .await
        .unwrap();
    let orchestrator = Orchestrator::new(store, ScriptedSuggester::new(), Thresholds::default());

    orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.9), &ReferenceData::default())
        .await;
    assert_eq!(orchestrator.suggester().seen_history(), [2]);
}

/// The audit trail is recall, applies, then decide, with ordered timestamps.
#[tokio::test]
async fn test_audit_trail_order() {
    let suggester = ScriptedSuggester::new().respond(
        "INV-1",
        vec![
            Suggestion::new("currency", "EUR", "Raw text", 0.9),
            Suggestion::new("grossTotal", 2380, "VAT included", 0.85),
            Suggestion::new("tax.rate", 0.19, "Parent missing", 0.95),
        ],
    );
    let orchestrator = Orchestrator::new(
        MemoryStore::open_in_memory().await.unwrap(),
        suggester,
        Thresholds::default(),
    );
    let result = orchestrator
        .process(&invoice("INV-1", "Supplier GmbH", 0.8), &ReferenceData::default())
        .await;

    let steps: Vec<_> = result.audit_trail.iter().map(|e| e.step()).collect();
    assert_eq!(
        steps,
        [
            AuditStep::Recall,
            AuditStep::Apply,
            AuditStep::Apply,
            AuditStep::Decide
        ]
    );
    assert!(result
        .audit_trail
        .windows(2)
        .all(|w| w[0].timestamp() <= w[1].timestamp()));
    assert_eq!(result.applied, 2);
    assert_eq!(result.suggestion_count(), 3);
    assert_eq!(result.proposed_corrections.len(), 3);
}
