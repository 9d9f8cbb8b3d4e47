//! The suggester seam between the agent and any AI backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::AiError;
use crate::invoice::{HumanReview, Invoice, ReferenceData, Suggestion};

/// Reasoning reported when no suggestions could be obtained.
pub const FALLBACK_REASONING: &str = "AI suggestion failed.";

/// Everything the suggester gets to see for one invoice.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    pub invoice: &'a Invoice,
    /// All learned reviews, oldest first.
    pub past_reviews: &'a [HumanReview],
    pub reference: &'a ReferenceData,
}

/// Suggestions returned by the AI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub reasoning: String,
}

impl SuggestionResponse {
    /// The empty response substituted when the suggester fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            suggestions: Vec::new(),
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

/// Source of field-level correction suggestions.
#[async_trait]
pub trait Suggester: Send + Sync {
    /// Ask for suggestions for one invoice.
    async fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<SuggestionResponse, AiError>;
}

#[async_trait]
impl<T: Suggester + ?Sized> Suggester for Box<T> {
    async fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<SuggestionResponse, AiError> {
        (**self).suggest(request).await
    }
}

/// Suggester that always fails, used when no AI backend is configured.
///
/// Every invoice processed with it degrades to human review.
#[derive(Debug, Clone)]
pub struct UnavailableSuggester {
    reason: String,
}

impl UnavailableSuggester {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Suggester for UnavailableSuggester {
    async fn suggest(&self, _request: &SuggestionRequest<'_>) -> Result<SuggestionResponse, AiError> {
        Err(AiError::Unavailable(self.reason.clone()))
    }
}
