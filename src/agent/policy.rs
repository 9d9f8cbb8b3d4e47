//! Auto-approval policy.

use std::fmt;

use crate::config::Thresholds;

/// Reasoning appended when the policy auto-approves.
pub const AUTO_APPROVED_REASONING: &str =
    "Learned pattern from past human corrections for this vendor + high confidence → auto-approved.";

/// Everything the policy looks at for one invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    /// At least one past review exists for the invoice's vendor.
    pub has_vendor_history: bool,
    /// Unrounded aggregate confidence.
    pub score: f64,
    /// Suggestions actually written into the normalized invoice.
    pub applied: usize,
    pub total_suggestions: usize,
    /// `false` when the suggester failed and the fallback was used.
    pub suggestions_available: bool,
}

/// Why an invoice was sent to a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    AiUnavailable,
    FirstTimeVendor,
    InsufficientConfidence,
}

impl EscalationReason {
    /// Reasoning text appended to the result.
    #[must_use]
    pub fn reasoning(&self) -> &'static str {
        match self {
            Self::AiUnavailable => "AI unavailable — escalating to human review",
            Self::FirstTimeVendor => {
                "First time processing invoice from this vendor → requires human review to establish reliable learned pattern."
            }
            Self::InsufficientConfidence => {
                "Confidence not sufficient yet → requires human verification."
            }
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reasoning())
    }
}

/// Outcome of the review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    AutoApprove,
    Escalate(EscalationReason),
}

impl ReviewDecision {
    #[must_use]
    pub fn requires_human_review(&self) -> bool {
        matches!(self, Self::Escalate(_))
    }

    #[must_use]
    pub fn reasoning(&self) -> &'static str {
        match self {
            Self::AutoApprove => AUTO_APPROVED_REASONING,
            Self::Escalate(reason) => reason.reasoning(),
        }
    }
}

/// Decides whether a human reviewer can be bypassed.
///
/// Auto-approval needs vendor history, an aggregate score at or above
/// `approval_score`, and at least `applied_ratio` of the suggestions applied.
/// With no suggestions the ratio clause holds trivially.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionPolicy {
    thresholds: Thresholds,
}

impl DecisionPolicy {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Pure decision function.
    #[must_use]
    pub fn decide(&self, inputs: &DecisionInputs) -> ReviewDecision {
        if !inputs.suggestions_available {
            return ReviewDecision::Escalate(EscalationReason::AiUnavailable);
        }
        if !inputs.has_vendor_history {
            return ReviewDecision::Escalate(EscalationReason::FirstTimeVendor);
        }
        if inputs.score >= self.thresholds.approval_score
            && self.ratio_met(inputs.applied, inputs.total_suggestions)
        {
            ReviewDecision::AutoApprove
        } else {
            ReviewDecision::Escalate(EscalationReason::InsufficientConfidence)
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio_met(&self, applied: usize, total: usize) -> bool {
        applied as f64 >= self.thresholds.applied_ratio * total as f64
    }
}
