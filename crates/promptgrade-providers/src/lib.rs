//! promptgrade-providers — AI evaluator integrations and configuration.
//!
//! Implements the `AiEvaluator` trait for Google Gemini, plus a mock for
//! tests, and loads the host configuration that decides whether the AI path
//! is used at all.

pub mod config;
pub mod gemini;
pub mod mock;

pub use config::{build_evaluator, create_evaluator, load_config, load_config_from, AiConfig, PromptgradeConfig};
pub use gemini::{GeminiEvaluator, GenerationSettings};
pub use promptgrade_core::error::ProviderError;
