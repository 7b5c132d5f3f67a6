//! Core data model types for promptgrade.
//!
//! These are the types every other module works with: challenges, submissions,
//! dimension scores, evaluation results, attempts, and per-user statistics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::count_words;
use crate::grade::Grade;
use crate::statistics::round2;

/// Maximum prompt length accepted for a submission, in characters.
pub const MAX_PROMPT_CHARS: usize = 5000;

/// Highest score a single dimension can receive.
pub const MAX_DIMENSION_SCORE: f64 = 2.0;

/// Identifier of a stored attempt.
pub type AttemptId = Uuid;

/// Challenge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Backend")]
    Backend,
    #[serde(rename = "AI Prompting")]
    AiPrompting,
    #[serde(rename = "Database")]
    Database,
    #[serde(rename = "DevOps")]
    DevOps,
    #[serde(rename = "Data Science")]
    DataScience,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::UiUxDesign => "UI/UX Design",
            Category::Backend => "Backend",
            Category::AiPrompting => "AI Prompting",
            Category::Database => "Database",
            Category::DevOps => "DevOps",
            Category::DataScience => "Data Science",
        };
        f.write_str(label)
    }
}

/// Challenge difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// A fixed challenge a user writes a prompt against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSpec {
    /// Unique identifier.
    pub id: String,
    /// Short human-readable title.
    #[serde(default)]
    pub title: String,
    /// What the user is asked to write a prompt for.
    pub instruction: String,
    /// Hints the prompt is expected to cover, in display order.
    pub tips: Vec<String>,
    pub category: Category,
    pub difficulty: Difficulty,
    /// Free-form tags for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// A reference prompt shown after the attempt.
    #[serde(default)]
    pub example_prompt: Option<String>,
}

/// A prompt submitted against a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSubmission {
    pub challenge_id: String,
    pub prompt_text: String,
}

impl PromptSubmission {
    pub fn new(challenge_id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            prompt_text: prompt_text.into(),
        }
    }

    /// Check the length bounds (1..=5000 characters, not blank).
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt_text.trim().is_empty() {
            return Err("prompt text must not be empty".to_string());
        }
        let chars = self.prompt_text.chars().count();
        if chars > MAX_PROMPT_CHARS {
            return Err(format!(
                "prompt text is {chars} characters, maximum is {MAX_PROMPT_CHARS}"
            ));
        }
        Ok(())
    }
}

/// One of the five grading dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clarity,
    Specificity,
    Context,
    Structure,
    Completeness,
}

impl Dimension {
    /// All dimensions in reporting order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Clarity,
        Dimension::Specificity,
        Dimension::Context,
        Dimension::Structure,
        Dimension::Completeness,
    ];

    /// Wire key used in provider payloads.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Clarity => "clarity",
            Dimension::Specificity => "specificity",
            Dimension::Context => "context",
            Dimension::Structure => "structure",
            Dimension::Completeness => "completeness",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clarity" => Ok(Dimension::Clarity),
            "specificity" => Ok(Dimension::Specificity),
            "context" => Ok(Dimension::Context),
            "structure" => Ok(Dimension::Structure),
            "completeness" => Ok(Dimension::Completeness),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

/// Score for a single dimension, in `[0.0, 2.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub key: Dimension,
    pub score: f64,
    /// Reviewer comment; only the AI evaluator fills this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl DimensionScore {
    pub fn new(key: Dimension, score: f64) -> Self {
        Self {
            key,
            score,
            feedback: None,
        }
    }
}

/// The five named dimension scores of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub clarity: DimensionScore,
    pub specificity: DimensionScore,
    pub context: DimensionScore,
    pub structure: DimensionScore,
    pub completeness: DimensionScore,
}

impl DimensionScores {
    /// Build from plain values, one per dimension in `Dimension::ALL` order.
    pub fn from_values(
        clarity: f64,
        specificity: f64,
        context: f64,
        structure: f64,
        completeness: f64,
    ) -> Self {
        Self {
            clarity: DimensionScore::new(Dimension::Clarity, clarity),
            specificity: DimensionScore::new(Dimension::Specificity, specificity),
            context: DimensionScore::new(Dimension::Context, context),
            structure: DimensionScore::new(Dimension::Structure, structure),
            completeness: DimensionScore::new(Dimension::Completeness, completeness),
        }
    }

    /// Build from an unordered list that must name every dimension exactly once.
    pub fn from_entries(entries: Vec<DimensionScore>) -> Result<Self, String> {
        if entries.len() != Dimension::ALL.len() {
            return Err(format!(
                "expected {} dimension scores, got {}",
                Dimension::ALL.len(),
                entries.len()
            ));
        }

        let mut slots: [Option<DimensionScore>; 5] = Default::default();
        for entry in entries {
            let idx = Dimension::ALL
                .iter()
                .position(|d| *d == entry.key)
                .unwrap_or_default();
            if slots[idx].is_some() {
                return Err(format!("duplicate dimension: {}", entry.key));
            }
            slots[idx] = Some(entry);
        }

        let [Some(clarity), Some(specificity), Some(context), Some(structure), Some(completeness)] =
            slots
        else {
            return Err("missing dimension score".to_string());
        };

        Ok(Self {
            clarity,
            specificity,
            context,
            structure,
            completeness,
        })
    }

    /// Scores in `Dimension::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionScore> {
        [
            &self.clarity,
            &self.specificity,
            &self.context,
            &self.structure,
            &self.completeness,
        ]
        .into_iter()
    }

    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Clarity => &self.clarity,
            Dimension::Specificity => &self.specificity,
            Dimension::Context => &self.context,
            Dimension::Structure => &self.structure,
            Dimension::Completeness => &self.completeness,
        }
    }

    /// Sum of the five scores, rounded to two decimals.
    pub fn total(&self) -> f64 {
        round2(self.iter().map(|d| d.score).sum())
    }
}

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorType {
    Ai,
    Heuristic,
}

impl fmt::Display for EvaluatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorType::Ai => write!(f, "ai"),
            EvaluatorType::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// The graded outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub scores: DimensionScores,
    /// Rounded sum of the five dimension scores, in `[0, 10]`.
    pub total_score: f64,
    pub grade: Grade,
    /// Up to five improvement hints.
    pub suggestions: Vec<String>,
    /// Up to three things the prompt did well.
    pub strengths: Vec<String>,
    pub evaluator_type: EvaluatorType,
    pub word_count: usize,
}

impl EvaluationResult {
    /// Assemble a result, deriving total, grade, and word count locally.
    pub fn new(
        scores: DimensionScores,
        suggestions: Vec<String>,
        strengths: Vec<String>,
        evaluator_type: EvaluatorType,
        prompt_text: &str,
    ) -> Self {
        let total_score = scores.total();
        Self {
            scores,
            total_score,
            grade: Grade::from_score(total_score),
            suggestions,
            strengths,
            evaluator_type,
            word_count: count_words(prompt_text),
        }
    }
}

/// Running statistics for a user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_attempts: u32,
    pub best_score: f64,
    pub average_score: f64,
}

/// User stats together with the store's version counter for optimistic updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VersionedStats {
    pub stats: UserStats,
    pub version: u64,
}

/// An attempt about to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttempt {
    pub user_id: String,
    pub challenge_id: String,
    pub prompt_text: String,
    pub result: EvaluationResult,
}

/// An immutable stored attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub user_id: String,
    pub challenge_id: String,
    pub prompt_text: String,
    pub result: EvaluationResult,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    pub fn from_new(id: AttemptId, attempt: NewAttempt, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: attempt.user_id,
            challenge_id: attempt.challenge_id,
            prompt_text: attempt.prompt_text,
            result: attempt.result,
            created_at,
        }
    }
}
