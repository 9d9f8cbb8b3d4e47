//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::memory::default_memory_path;

/// AI provider kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Any OpenAI-compatible chat completions endpoint.
    #[default]
    OpenRouter,
    Claude,
}

/// Configuration for the suggestion client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider to use (openrouter or claude).
    pub provider: ProviderKind,
    /// Model to ask for suggestions.
    pub model: String,
    /// Maximum tokens in response.
    pub max_tokens: u32,
    /// Base URL for the API.
    pub base_url: String,
    /// Environment variable name for the API key.
    pub api_key_env: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// How many of the most recent reviews are shown to the model.
    pub history_examples: usize,
    /// How many purchase orders and delivery notes are shown to the model.
    pub reference_limit: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: "openai/gpt-oss-20b:free".to_string(),
            max_tokens: 4096,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 60,
            history_examples: 10,
            reference_limit: 5,
        }
    }
}

/// Memory store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
        }
    }
}

/// Decision thresholds. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum suggestion confidence for auto-apply.
    pub auto_apply: f64,
    /// Minimum aggregate score for auto-approval.
    pub approval_score: f64,
    /// Minimum applied / total suggestion ratio for auto-approval.
    pub applied_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            auto_apply: 0.80,
            approval_score: 0.80,
            applied_ratio: 0.70,
        }
    }
}

/// Where batch runs write their results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_path: PathBuf,
    pub memory_snapshot_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("output.json"),
            memory_snapshot_path: PathBuf::from("learned_memory.json"),
        }
    }
}

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub ai: AiConfig,
    pub memory: MemoryConfig,
    pub thresholds: Thresholds,
    pub output: OutputConfig,
}
