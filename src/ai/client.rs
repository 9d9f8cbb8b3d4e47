//! Multi-provider AI client for invoice suggestions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;

use crate::config::{AiConfig, ProviderKind};

use super::{
    format_suggestion_prompt, parse_suggestions, Suggester, SuggestionRequest, SuggestionResponse,
    SUGGESTION_SYSTEM_PROMPT,
};

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Build an HTTP client with proper timeout configuration.
fn build_http_client(request_timeout: Duration) -> Result<Client, AiError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| AiError::RequestFailed(format!("Failed to build HTTP client: {e}")))
}

/// Determine if a request should be retried based on status code and attempt count.
fn should_retry(status_code: u16, attempt: u32) -> bool {
    if attempt >= MAX_RETRIES {
        return false;
    }
    (500..600).contains(&status_code)
}

/// Calculate exponential backoff duration for retry attempts.
fn calculate_backoff(attempt: u32) -> Duration {
    // 1s, 2s, 4s
    Duration::from_secs(1 << attempt)
}

/// Errors from AI client operations.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("AI request timed out")]
    Timeout,
    #[error("AI suggester unavailable: {0}")]
    Unavailable(String),
}

/// Send a JSON request, retrying 5xx responses with exponential backoff.
///
/// `build` is called once per attempt since a sent request cannot be reused.
async fn send_with_retry<F>(build: F) -> Result<serde_json::Value, AiError>
where
    F: Fn() -> RequestBuilder + Send + Sync,
{
    let mut attempt = 0;
    loop {
        let response = build().send().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AiError::ParseError(e.to_string()));
        }

        if should_retry(status.as_u16(), attempt) {
            let backoff = calculate_backoff(attempt);
            tracing::debug!(%status, attempt, ?backoff, "Retrying AI request");
            tokio::time::sleep(backoff).await;
            attempt += 1;
            continue;
        }

        let text = response.text().await.unwrap_or_default();
        return Err(AiError::RequestFailed(format!("HTTP {status}: {text}")));
    }
}

/// Trait for AI providers.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a response from the AI provider.
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError>;
}

/// OpenAI-compatible chat completions provider (`OpenRouter` and friends).
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenRouterProvider {
    /// Create a new chat completions provider.
    ///
    /// # Errors
    ///
    /// Returns `AiError::RequestFailed` if the HTTP client cannot be built.
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, AiError> {
        Ok(Self {
            client: build_http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl AiProvider for OpenRouterProvider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        });

        let json = send_with_retry(|| {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("No content in chat completion".to_string()))
    }
}

/// Claude API provider.
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeProvider {
    /// Create a new Claude provider.
    ///
    /// # Errors
    ///
    /// Returns `AiError::RequestFailed` if the HTTP client cannot be built.
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, AiError> {
        Ok(Self {
            client: build_http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user }]
        });

        let json = send_with_retry(|| {
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&body)
        })
        .await?;

        json["content"][0]["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("No text in Claude response".to_string()))
    }
}

/// Provider enum for dispatch.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenRouter(OpenRouterProvider),
    Claude(ClaudeProvider),
}

#[async_trait]
impl AiProvider for Provider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        match self {
            Self::OpenRouter(p) => p.generate(system, user).await,
            Self::Claude(p) => p.generate(system, user).await,
        }
    }
}

/// Suggester backed by a hosted language model.
#[derive(Debug, Clone)]
pub struct AiSuggester {
    provider: Provider,
    config: AiConfig,
}

impl AiSuggester {
    /// Create a suggester with the given provider and config.
    #[must_use]
    pub fn new(provider: Provider, config: AiConfig) -> Self {
        Self { provider, config }
    }

    /// Create a suggester from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AiError::MissingApiKey` if the configured API key environment
    /// variable is not set or empty.
    pub fn from_config(config: AiConfig) -> Result<Self, AiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(config.api_key_env.clone()))?;

        let provider = match config.provider {
            ProviderKind::OpenRouter => {
                Provider::OpenRouter(OpenRouterProvider::new(&config, api_key)?)
            }
            ProviderKind::Claude => Provider::Claude(ClaudeProvider::new(&config, api_key)?),
        };

        Ok(Self { provider, config })
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the provider kind.
    #[must_use]
    pub fn provider_kind(&self) -> &ProviderKind {
        &self.config.provider
    }
}

#[async_trait]
impl Suggester for AiSuggester {
    async fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<SuggestionResponse, AiError> {
        let user = format_suggestion_prompt(
            request,
            self.config.history_examples,
            self.config.reference_limit,
        );
        let text = self.provider.generate(SUGGESTION_SYSTEM_PROMPT, &user).await?;
        tracing::debug!(chars = text.len(), "Received suggestion response");
        parse_suggestions(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry_logic() {
        assert!(should_retry(500, 0));
        assert!(should_retry(503, 2));
        assert!(!should_retry(400, 0));
        assert!(!should_retry(401, 0));
        assert!(!should_retry(429, 0));
        assert!(!should_retry(200, 0));
        assert!(!should_retry(500, MAX_RETRIES));
    }

    #[test]
    fn test_calculate_backoff() {
        assert_eq!(calculate_backoff(0).as_secs(), 1);
        assert_eq!(calculate_backoff(1).as_secs(), 2);
        assert_eq!(calculate_backoff(2).as_secs(), 4);
    }

    #[test]
    fn test_from_config_missing_key() {
        let config = AiConfig {
            api_key_env: "INVOICE_AGENT_TEST_UNSET_KEY".to_string(),
            ..AiConfig::default()
        };
        let result = AiSuggester::from_config(config);
        assert!(matches!(result, Err(AiError::MissingApiKey(ref env)) if env == "INVOICE_AGENT_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_from_config_openrouter() {
        std::env::set_var("INVOICE_AGENT_TEST_OPENROUTER_KEY", "test-key");
        let config = AiConfig {
            api_key_env: "INVOICE_AGENT_TEST_OPENROUTER_KEY".to_string(),
            ..AiConfig::default()
        };
        let suggester = AiSuggester::from_config(config).unwrap();
        assert!(matches!(suggester.provider, Provider::OpenRouter(_)));
        assert_eq!(suggester.model(), "openai/gpt-oss-20b:free");
        std::env::remove_var("INVOICE_AGENT_TEST_OPENROUTER_KEY");
    }

    #[test]
    fn test_from_config_claude() {
        std::env::set_var("INVOICE_AGENT_TEST_CLAUDE_KEY", "test-key");
        let config = AiConfig {
            provider: ProviderKind::Claude,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_key_env: "INVOICE_AGENT_TEST_CLAUDE_KEY".to_string(),
            ..AiConfig::default()
        };
        let suggester = AiSuggester::from_config(config).unwrap();
        assert!(matches!(suggester.provider, Provider::Claude(_)));
        assert_eq!(suggester.provider_kind(), &ProviderKind::Claude);
        std::env::remove_var("INVOICE_AGENT_TEST_CLAUDE_KEY");
    }
}
