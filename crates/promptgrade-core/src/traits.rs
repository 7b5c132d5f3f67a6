//! Core trait definitions for AI evaluators and collaborator stores.
//!
//! The AI evaluator trait is implemented by `promptgrade-providers`; the store
//! traits are implemented by whatever persistence the host uses (see
//! [`crate::memory::MemoryStore`] for the in-process reference).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, StoreError};
use crate::model::{
    Attempt, AttemptId, ChallengeSpec, Dimension, DimensionScore, DimensionScores, NewAttempt,
    UserStats, VersionedStats, MAX_DIMENSION_SCORE,
};

// ---------------------------------------------------------------------------
// AI evaluator trait
// ---------------------------------------------------------------------------

/// Trait for external services that grade a prompt on the five dimensions.
#[async_trait]
pub trait AiEvaluator: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Grade a prompt. Implementations report every failure as a `ProviderError`.
    async fn evaluate(&self, request: &AiEvaluationRequest) -> Result<AiAssessment, ProviderError>;
}

/// Everything an AI evaluator needs to grade one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiEvaluationRequest {
    /// The challenge instruction shown to the user.
    pub instruction: String,
    /// Challenge tips, in display order.
    pub tips: Vec<String>,
    /// The submitted prompt.
    pub prompt_text: String,
}

impl AiEvaluationRequest {
    pub fn new(prompt_text: &str, challenge: &ChallengeSpec) -> Self {
        Self {
            instruction: challenge.instruction.clone(),
            tips: challenge.tips.clone(),
            prompt_text: prompt_text.to_string(),
        }
    }

    /// The natural-language instruction sent to the provider.
    pub fn to_prompt(&self) -> String {
        build_evaluation_prompt(&self.instruction, &self.tips, &self.prompt_text)
    }
}

/// A validated grading returned by an AI evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    pub scores: DimensionScores,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
}

pub const AI_MIN_SUGGESTIONS: usize = 1;
pub const AI_MAX_SUGGESTIONS: usize = 5;
pub const AI_MAX_STRENGTHS: usize = 3;

// ---------------------------------------------------------------------------
// Provider prompt
// ---------------------------------------------------------------------------

/// Build the grading instruction for a provider.
///
/// Tips are numbered from 1 and the submitted prompt is fenced with `"""`.
pub fn build_evaluation_prompt(instruction: &str, tips: &[String], prompt_text: &str) -> String {
    let numbered_tips = tips
        .iter()
        .enumerate()
        .map(|(i, tip)| format!("{}. {}", i + 1, tip))
        .collect::<Vec<_>>()
        .join("\n");

    let keys = Dimension::ALL
        .iter()
        .map(|d| {
            format!(
                "    {{ \"key\": \"{}\", \"score\": 0-2, \"feedback\": \"one sentence\" }}",
                d.key()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are an expert prompt engineering evaluator. Score the submitted prompt on 5 \
dimensions, each from 0 to 2 (decimals allowed). Respond ONLY with valid JSON. Do not use \
markdown code fences. Do not add any other text.

Task the user was given:
{instruction}

Hints the prompt should cover:
{numbered_tips}

Submitted prompt:
\"\"\"
{prompt_text}
\"\"\"

Return exactly this JSON shape:
{{
  \"dimensionScores\": [
{keys}
  ],
  \"suggestions\": [\"1 to 5 actionable improvements\"],
  \"strengths\": [\"0 to 3 things done well\"]
}}"
    )
}

// ---------------------------------------------------------------------------
// Provider payload parsing
// ---------------------------------------------------------------------------

/// Strip a markdown code fence wrapped around a provider reply.
///
/// Handles:
/// - A fenced block with or without a language tag (first block wins)
/// - Inline fences on a single line
/// - Unclosed (truncated) blocks
/// - Raw text with no fences (returned trimmed)
pub fn strip_markdown_fences(response: &str) -> String {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            let rest = trimmed.trim_start_matches('`');
            // Single-line fence such as ```json {"a":1}```
            if rest.ends_with("```") && rest.len() > 3 {
                return strip_inline_fences(trimmed);
            }
            in_block = true;
            current_block.clear();
            continue;
        }

        if in_block && trimmed.starts_with("```") {
            return current_block.trim().to_string();
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    if in_block && !current_block.trim().is_empty() {
        return current_block.trim().to_string();
    }

    strip_inline_fences(response)
}

fn strip_inline_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    dimension_scores: Vec<WireDimension>,
    suggestions: Vec<String>,
    strengths: Vec<String>,
}

#[derive(Deserialize)]
struct WireDimension {
    key: Dimension,
    score: f64,
    feedback: String,
}

/// Parse and validate a provider reply into an [`AiAssessment`].
///
/// Malformed JSON maps to `MalformedPayload`; JSON with the wrong shape or
/// out-of-range values maps to `InvalidPayload`.
pub fn parse_assessment(raw: &str) -> Result<AiAssessment, ProviderError> {
    let clean = strip_markdown_fences(raw);
    if clean.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(&clean)
        .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;
    let payload: WirePayload = serde_json::from_value(value)
        .map_err(|e| ProviderError::InvalidPayload(e.to_string()))?;

    for d in &payload.dimension_scores {
        if !d.score.is_finite() || !(0.0..=MAX_DIMENSION_SCORE).contains(&d.score) {
            return Err(ProviderError::InvalidPayload(format!(
                "{} score {} outside [0, {MAX_DIMENSION_SCORE}]",
                d.key, d.score
            )));
        }
    }

    let suggestion_count = payload.suggestions.len();
    if !(AI_MIN_SUGGESTIONS..=AI_MAX_SUGGESTIONS).contains(&suggestion_count) {
        return Err(ProviderError::InvalidPayload(format!(
            "expected {AI_MIN_SUGGESTIONS}-{AI_MAX_SUGGESTIONS} suggestions, got {suggestion_count}"
        )));
    }
    if payload.strengths.len() > AI_MAX_STRENGTHS {
        return Err(ProviderError::InvalidPayload(format!(
            "expected at most {AI_MAX_STRENGTHS} strengths, got {}",
            payload.strengths.len()
        )));
    }

    let entries = payload
        .dimension_scores
        .into_iter()
        .map(|d| DimensionScore {
            key: d.key,
            score: d.score,
            feedback: Some(d.feedback),
        })
        .collect();
    let scores = DimensionScores::from_entries(entries).map_err(ProviderError::InvalidPayload)?;

    Ok(AiAssessment {
        scores,
        suggestions: payload.suggestions,
        strengths: payload.strengths,
    })
}

// ---------------------------------------------------------------------------
// Collaborator stores
// ---------------------------------------------------------------------------

/// Read-only challenge lookup.
#[async_trait]
pub trait ChallengeLookup: Send + Sync {
    async fn get_challenge(&self, id: &str) -> Result<Option<ChallengeSpec>, StoreError>;
}

/// Append-only attempt storage.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Persist an attempt on its own, returning its ID.
    async fn create_attempt(&self, attempt: NewAttempt) -> Result<AttemptId, StoreError>;

    /// Fetch an attempt owned by `user_id`.
    async fn get_attempt(
        &self,
        user_id: &str,
        attempt_id: AttemptId,
    ) -> Result<Option<Attempt>, StoreError>;

    /// All attempts recorded against a challenge.
    async fn attempts_for_challenge(&self, challenge_id: &str) -> Result<Vec<Attempt>, StoreError>;
}

/// Per-user statistics with optimistic concurrency control.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Current stats and version, or `None` if the user does not exist.
    async fn get_user_stats(&self, user_id: &str) -> Result<Option<VersionedStats>, StoreError>;

    /// Replace the stats if the stored version still equals `expected_version`.
    ///
    /// Returns `StoreError::Conflict` when another writer got there first.
    async fn update_user_stats(
        &self,
        user_id: &str,
        expected_version: u64,
        stats: UserStats,
    ) -> Result<(), StoreError>;
}

/// Atomic unit of work: one attempt plus one stats update.
#[async_trait]
pub trait EvaluationLedger: Send + Sync {
    /// Append `attempt` and replace the owner's stats with `stats`, or write nothing.
    ///
    /// Fails with `StoreError::Conflict` if the user's version is no longer
    /// `expected_version`.
    async fn record_evaluation(
        &self,
        attempt: NewAttempt,
        expected_version: u64,
        stats: UserStats,
    ) -> Result<AttemptId, StoreError>;
}
