//! Configuration loading and evaluator factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use promptgrade_core::engine::OrchestratorConfig;
use promptgrade_core::error::ProviderError;
use promptgrade_core::traits::AiEvaluator;

use crate::gemini::{GeminiEvaluator, GenerationSettings, DEFAULT_MODEL};

/// AI evaluator settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Whether AI evaluation is attempted at all.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("api_key", &masked)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_temperature() -> f64 {
    0.2
}
fn default_max_output_tokens() -> u32 {
    1024
}
fn default_parallelism() -> usize {
    4
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            api_key: String::new(),
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl AiConfig {
    /// The orchestrator settings derived from this config.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            ai_enabled: self.enabled,
            ai_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Top-level promptgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptgradeConfig {
    #[serde(default)]
    pub ai: AiConfig,
    /// Max concurrent submissions in batch mode.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for PromptgradeConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            parallelism: default_parallelism(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

fn resolve_ai_config(ai: &mut AiConfig) {
    ai.provider = resolve_env_vars(&ai.provider);
    ai.api_key = resolve_env_vars(&ai.api_key);
    ai.model = resolve_env_vars(&ai.model);
    ai.base_url = ai.base_url.as_deref().map(resolve_env_vars);
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `promptgrade.toml` in the current directory
/// 2. `~/.config/promptgrade/config.toml`
///
/// Environment overrides: `PROMPTGRADE_ENABLE_AI`, `PROMPTGRADE_GEMINI_KEY`,
/// `PROMPTGRADE_GEMINI_MODEL`.
pub fn load_config() -> Result<PromptgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PromptgradeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("promptgrade.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => PromptgradeConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    resolve_ai_config(&mut config.ai);

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<PromptgradeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<PromptgradeConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env_overrides(config: &mut PromptgradeConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(flag) = env("PROMPTGRADE_ENABLE_AI") {
        config.ai.enabled = flag.trim().eq_ignore_ascii_case("true");
    }
    if let Some(key) = env("PROMPTGRADE_GEMINI_KEY") {
        config.ai.api_key = key;
    }
    if let Some(model) = env("PROMPTGRADE_GEMINI_MODEL") {
        config.ai.model = model;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("promptgrade"))
}

/// Build the configured AI evaluator.
///
/// Fails with a configuration error ([`ProviderError::is_configuration`])
/// when AI is disabled, the credential is missing, or the provider is unknown.
pub fn build_evaluator(config: &AiConfig) -> Result<Arc<dyn AiEvaluator>, ProviderError> {
    if !config.enabled {
        return Err(ProviderError::Disabled);
    }
    if config.api_key.trim().is_empty() {
        return Err(ProviderError::MissingCredential);
    }

    match config.provider.as_str() {
        "gemini" => {
            let settings = GenerationSettings {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                timeout: Duration::from_secs(config.timeout_secs),
            };
            let client = GeminiEvaluator::new(
                &config.api_key,
                &config.model,
                config.base_url.clone(),
                settings,
            )
            .map_err(|e| ProviderError::NetworkError(format!("{e:#}")))?;
            Ok(Arc::new(client))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

/// Create an AI evaluator, or `None` so callers run heuristic-only.
pub fn create_evaluator(config: &AiConfig) -> Option<Arc<dyn AiEvaluator>> {
    match build_evaluator(config) {
        Ok(client) => {
            info!(provider = %config.provider, model = %config.model, "AI evaluator configured");
            Some(client)
        }
        Err(ProviderError::Disabled) => None,
        Err(e) if e.is_configuration() => {
            warn!("{e}, using heuristic evaluator");
            None
        }
        Err(e) => {
            warn!("failed to initialise AI evaluator: {e}");
            None
        }
    }
}
