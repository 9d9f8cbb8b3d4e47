//! Per-invoice orchestration: recall, suggest, decide, commit.

use crate::ai::{Suggester, SuggestionRequest, SuggestionResponse};
use crate::audit::{AuditStep, AuditTrail};
use crate::config::Thresholds;
use crate::invoice::{HumanReview, Invoice, ReferenceData, Suggestion};
use crate::memory::MemoryStore;

use super::aggregate::Aggregator;
use super::policy::{DecisionInputs, DecisionPolicy};
use super::result::{round_score, ProcessingResult};
use super::stage::{ProcessingStage, StageMachine};

/// Reasoning used when the suggester answers without any.
const DEFAULT_REASONING: &str = "AI analysis completed.";

/// Processes invoices one at a time against learned memory.
///
/// Owns the memory store handle; callers write human reviews back through
/// [`Orchestrator::store`].
pub struct Orchestrator<S> {
    store: MemoryStore,
    suggester: S,
    aggregator: Aggregator,
    policy: DecisionPolicy,
}

impl<S: Suggester> Orchestrator<S> {
    #[must_use]
    pub fn new(store: MemoryStore, suggester: S, thresholds: Thresholds) -> Self {
        Self {
            store,
            suggester,
            aggregator: Aggregator::new(thresholds.auto_apply),
            policy: DecisionPolicy::new(thresholds),
        }
    }

    /// The memory store, for saving human reviews.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    #[must_use]
    pub fn suggester(&self) -> &S {
        &self.suggester
    }

    #[must_use]
    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Process one invoice.
    ///
    /// Never fails: suggester errors fall back to an empty suggestion list
    /// and memory read errors to empty history, both ending in human review.
    pub async fn process(&self, invoice: &Invoice, reference: &ReferenceData) -> ProcessingResult {
        let mut stages = StageMachine::new();
        let mut trail = AuditTrail::new();

        let history = self.recall(invoice).await;
        let has_vendor_history = history.iter().any(|r| r.vendor == invoice.vendor);
        trail.record(
            AuditStep::Recall,
            "Loaded past human reviews for learned memory",
        );
        tracing::debug!(
            invoice_id = %invoice.invoice_id,
            vendor = %invoice.vendor,
            reviews = history.len(),
            has_vendor_history,
            "Recalled memory"
        );

        stages.advance(ProcessingStage::Suggest);
        let (response, ai_available) = self.suggest(invoice, &history, reference).await;
        let suggestions: Vec<Suggestion> = response
            .suggestions
            .into_iter()
            .map(Suggestion::sanitized)
            .collect();

        stages.advance(ProcessingStage::Decide);
        let aggregation = self.aggregator.aggregate(invoice, &suggestions, &mut trail);
        let decision = self.policy.decide(&DecisionInputs {
            has_vendor_history,
            score: aggregation.score,
            applied: aggregation.applied,
            total_suggestions: aggregation.total,
            suggestions_available: ai_available,
        });
        let requires_human_review = decision.requires_human_review();

        let base = if response.reasoning.trim().is_empty() {
            DEFAULT_REASONING
        } else {
            response.reasoning.as_str()
        };
        let reasoning = format!("{base} | {}", decision.reasoning())
            .trim()
            .to_string();

        trail.record(
            AuditStep::Decide,
            format!(
                "Vendor memory exists: {has_vendor_history} | Final confidence: {:.2} | Human review: {requires_human_review}",
                aggregation.score
            ),
        );
        tracing::info!(
            invoice_id = %invoice.invoice_id,
            score = aggregation.score,
            applied = aggregation.applied,
            total = aggregation.total,
            requires_human_review,
            "Decision made"
        );

        stages.advance(ProcessingStage::Commit);
        ProcessingResult {
            normalized_invoice: aggregation.normalized,
            proposed_corrections: aggregation.corrections,
            requires_human_review,
            reasoning,
            confidence_score: round_score(aggregation.score),
            memory_updates: Vec::new(),
            audit_trail: trail.into_events(),
            suggestions,
            applied: aggregation.applied,
            ai_available,
        }
    }

    async fn recall(&self, invoice: &Invoice) -> Vec<HumanReview> {
        match self.store.load_all().await {
            Ok(reviews) => reviews,
            Err(e) => {
                tracing::warn!(
                    invoice_id = %invoice.invoice_id,
                    error = %e,
                    "Failed to load memory, continuing without history"
                );
                Vec::new()
            }
        }
    }

    async fn suggest(
        &self,
        invoice: &Invoice,
        history: &[HumanReview],
        reference: &ReferenceData,
    ) -> (SuggestionResponse, bool) {
        let request = SuggestionRequest {
            invoice,
            past_reviews: history,
            reference,
        };
        match self.suggester.suggest(&request).await {
            Ok(response) => {
                tracing::debug!(
                    invoice_id = %invoice.invoice_id,
                    suggestions = response.suggestions.len(),
                    "Received suggestions"
                );
                (response, true)
            }
            Err(e) => {
                tracing::warn!(
                    invoice_id = %invoice.invoice_id,
                    error = %e,
                    "Suggester failed, using fallback"
                );
                (SuggestionResponse::fallback(), false)
            }
        }
    }
}
