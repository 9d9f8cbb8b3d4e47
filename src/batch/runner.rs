//! Sequential batch processing with human review write-back.

use super::error::BatchError;
use super::input::BatchInput;
use crate::agent::{Orchestrator, ProcessingResult};
use crate::ai::Suggester;
use crate::invoice::Invoice;
use crate::review::{ReviewOutcome, ReviewRequest, Reviewer};

/// Memory update recorded when an escalated invoice teaches nothing.
pub const NO_LEARNING: &str = "No new learning (skipped)";

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Results in input order, up to where the run stopped.
    pub results: Vec<ProcessingResult>,
    /// Number of human reviews saved.
    pub learned: usize,
    /// The reviewer stopped the run before every invoice was handled.
    pub stopped: bool,
}

impl BatchReport {
    #[must_use]
    pub fn auto_approved(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.requires_human_review)
            .count()
    }

    #[must_use]
    pub fn escalated(&self) -> usize {
        self.results.len() - self.auto_approved()
    }
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'r> {
    /// An invoice was processed; no review has been asked for yet.
    Processed(&'r ProcessingResult),
    /// A review was handled and its memory update recorded.
    MemoryUpdated(&'r str),
}

/// Drives the orchestrator over a batch, one invoice at a time.
///
/// Each invoice sees every review saved for the invoices before it.
pub struct BatchRunner<'a, S, R> {
    orchestrator: &'a Orchestrator<S>,
    reviewer: R,
}

impl<'a, S: Suggester, R: Reviewer> BatchRunner<'a, S, R> {
    pub fn new(orchestrator: &'a Orchestrator<S>, reviewer: R) -> Self {
        Self {
            orchestrator,
            reviewer,
        }
    }

    /// Process every invoice in order.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if a review cannot be collected or saved.
    pub async fn run(&mut self, input: &BatchInput) -> Result<BatchReport, BatchError> {
        self.run_with(input, |_| {}).await
    }

    /// Like [`BatchRunner::run`], reporting each result before any review is
    /// asked for and each memory update right after it is saved.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if a review cannot be collected or saved.
    pub async fn run_with<F>(
        &mut self,
        input: &BatchInput,
        mut on_event: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let mut report = BatchReport::default();

        for invoice in &input.invoices {
            let mut result = self.orchestrator.process(invoice, &input.reference).await;
            on_event(BatchEvent::Processed(&result));

            if let Some(request) = ReviewRequest::from_result(&result) {
                match self.review(&request, invoice).await? {
                    Some(update) => {
                        if update != NO_LEARNING {
                            report.learned += 1;
                        }
                        on_event(BatchEvent::MemoryUpdated(&update));
                        result.memory_updates = vec![update];
                    }
                    None => {
                        tracing::info!(invoice_id = %invoice.invoice_id, "Review stopped by user");
                        report.stopped = true;
                        break;
                    }
                }
            }

            report.results.push(result);
        }

        tracing::info!(
            processed = report.results.len(),
            learned = report.learned,
            stopped = report.stopped,
            "Batch complete"
        );
        Ok(report)
    }

    /// Ask the reviewer and persist what it taught. `None` if it stopped.
    async fn review(
        &mut self,
        request: &ReviewRequest,
        invoice: &Invoice,
    ) -> Result<Option<String>, BatchError> {
        let action = match self.reviewer.review(request)? {
            ReviewOutcome::Decided(action) => action,
            ReviewOutcome::Stopped => return Ok(None),
        };

        let Some(review) = request.resolve(&action, invoice) else {
            tracing::debug!(invoice_id = %request.invoice_id, "Nothing learned");
            return Ok(Some(NO_LEARNING.to_string()));
        };

        let count = review.corrections.len();
        self.orchestrator.store().save(&review).await?;
        tracing::info!(
            invoice_id = %request.invoice_id,
            vendor = %request.vendor,
            corrections = count,
            "Learned from human review"
        );
        Ok(Some(format!(
            "Learned {count} correction(s) for {}",
            request.invoice_id
        )))
    }
}
