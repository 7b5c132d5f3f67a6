//! Rule-based prompt scoring.
//!
//! Each dimension starts at zero and gains 0.5 for every threshold the prompt
//! crosses, capped at 2.0. The scorer needs no network and always produces the
//! same result for the same `(prompt, challenge)` pair.

use crate::features::TextFeatures;
use crate::model::{
    ChallengeSpec, Dimension, DimensionScores, EvaluationResult, EvaluatorType,
    MAX_DIMENSION_SCORE,
};

const STEP: f64 = 0.5;

/// Dimensions scoring below this get a suggestion; at or above it, a strength.
pub const STRENGTH_THRESHOLD: f64 = 1.5;

pub const MAX_SUGGESTIONS: usize = 5;
pub const MAX_STRENGTHS: usize = 3;

/// Fixed improvement hint for a weak dimension.
pub fn suggestion_for(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Add more detail and avoid vague language",
        Dimension::Specificity => "Include more technical terms and specific requirements",
        Dimension::Context => "Provide more background context and use case information",
        Dimension::Structure => "Organize your prompt with clear sections or bullet points",
        Dimension::Completeness => "Address more of the challenge hints in your prompt",
    }
}

/// Fixed praise for a strong dimension.
pub fn strength_for(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Clear and well-articulated prompt",
        Dimension::Specificity => "Good use of technical terminology",
        Dimension::Context => "Strong contextual information provided",
        Dimension::Structure => "Well-structured and organized",
        Dimension::Completeness => "Comprehensive coverage of requirements",
    }
}

/// Deterministic scorer built on [`TextFeatures`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a prompt against a challenge.
    pub fn evaluate(&self, prompt_text: &str, challenge: &ChallengeSpec) -> EvaluationResult {
        let features = TextFeatures::extract(prompt_text, &challenge.tips);
        let scores = score_dimensions(&features);

        let suggestions = scores
            .iter()
            .filter(|d| d.score < STRENGTH_THRESHOLD)
            .map(|d| suggestion_for(d.key).to_string())
            .take(MAX_SUGGESTIONS)
            .collect();

        let strengths = scores
            .iter()
            .filter(|d| d.score >= STRENGTH_THRESHOLD)
            .map(|d| strength_for(d.key).to_string())
            .take(MAX_STRENGTHS)
            .collect();

        EvaluationResult::new(
            scores,
            suggestions,
            strengths,
            EvaluatorType::Heuristic,
            prompt_text,
        )
    }
}

/// Compute the five capped dimension scores from extracted features.
pub fn score_dimensions(f: &TextFeatures) -> DimensionScores {
    DimensionScores::from_values(
        clarity(f),
        specificity(f),
        context(f),
        structure(f),
        completeness(f),
    )
}

/// 0.5 per satisfied condition, capped at the dimension maximum.
fn steps(conditions: &[bool]) -> f64 {
    let earned = conditions.iter().filter(|c| **c).count() as f64 * STEP;
    earned.min(MAX_DIMENSION_SCORE)
}

fn clarity(f: &TextFeatures) -> f64 {
    steps(&[
        f.word_count >= 20,
        f.word_count >= 50,
        f.word_count >= 100,
        !f.has_filler_words,
    ])
}

fn specificity(f: &TextFeatures) -> f64 {
    steps(&[
        f.technical_terms >= 3,
        f.technical_terms >= 6,
        f.technical_terms >= 10,
        f.has_digits,
    ])
}

fn context(f: &TextFeatures) -> f64 {
    steps(&[
        f.context_keywords >= 2,
        f.context_keywords >= 4,
        f.context_keywords >= 6,
        f.word_count >= 80,
    ])
}

fn structure(f: &TextFeatures) -> f64 {
    steps(&[
        f.has_list_markers,
        f.has_multiple_sections,
        f.sentence_count >= 3,
        f.sentence_count >= 5,
    ])
}

fn completeness(f: &TextFeatures) -> f64 {
    steps(&[
        f.tip_coverage >= 0.25,
        f.tip_coverage >= 0.5,
        f.tip_coverage >= 0.75,
        f.tip_coverage >= 1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::model::{Category, Difficulty};

    fn rest_challenge() -> ChallengeSpec {
        ChallengeSpec {
            id: "rest-api".into(),
            title: "REST API design".into(),
            instruction: "Build a REST API".into(),
            tips: vec![
                "Define resources and HTTP methods".into(),
                "Mention authentication method".into(),
                "Specify pagination".into(),
            ],
            category: Category::Backend,
            difficulty: Difficulty::Intermediate,
            tags: vec!["API".into(), "REST".into()],
            example_prompt: None,
        }
    }

    const DETAILED_PROMPT: &str = "
Create a RESTful API for user management with the following endpoints:
GET /api/users - List all users with pagination support
POST /api/users - Create new user with validation
PUT /api/users/:id - Update user information
DELETE /api/users/:id - Remove user from system

Use JWT authentication for all endpoints.
Implement role-based access control with admin and user roles.
Add pagination with page and limit query parameters.
Return consistent JSON responses with proper error handling.
Use Express.js with TypeScript and PostgreSQL database.
";

    const EXCELLENT_PROMPT: &str = "Design a comprehensive RESTful API for an e-commerce platform. \
The purpose is to serve a customer-facing store, because the client needs a clear example for every case.

Resources and Endpoints:
1. Products: GET /products, POST /products, PUT /products/:id, DELETE /products/:id
2. Users: GET /users, POST /users, PUT /users/:id
3. Orders: GET /orders, POST /orders, GET /orders/:id

Authentication: JWT-based authentication with refresh tokens for every user.
Authorization: role-based access with an admin role and a permission check for each request.
Pagination: support page and limit query parameters for all list endpoints.
Validation: every request must pass schema validation, and each error response should include a code.
Database: PostgreSQL with a data model per service, since the goal is an auditable system for the user.

The API should be built for a business-to-consumer platform where sellers can list products and customers can browse and purchase.";

    #[test]
    fn short_prompt_scores_low() {
        let result = HeuristicScorer.evaluate("Build API", &rest_challenge());

        assert_eq!(result.evaluator_type, EvaluatorType::Heuristic);
        assert_eq!(result.word_count, 2);
        assert!(result.total_score < 5.0);
        assert!(matches!(result.grade, Grade::C | Grade::D | Grade::F));
        assert!(!result.suggestions.is_empty());
    }

    #[test]
    fn short_prompt_exact_breakdown() {
        let result = HeuristicScorer.evaluate("Build API", &rest_challenge());

        // Only "no filler words" and a single sentence: clarity 0.5, rest 0.
        assert_eq!(result.scores.clarity.score, 0.5);
        assert_eq!(result.scores.specificity.score, 0.0);
        assert_eq!(result.scores.context.score, 0.0);
        assert_eq!(result.scores.structure.score, 0.0);
        assert_eq!(result.scores.completeness.score, 0.0);
        assert_eq!(result.total_score, 0.5);
        assert_eq!(result.grade, Grade::F);
        assert_eq!(result.suggestions.len(), 5);
        assert!(result.strengths.is_empty());
        assert_eq!(result.suggestions[0], suggestion_for(Dimension::Clarity));
    }

    #[test]
    fn detailed_prompt_scores_higher() {
        let result = HeuristicScorer.evaluate(DETAILED_PROMPT, &rest_challenge());

        assert!(result.word_count > 50);
        assert!(result.total_score > 5.0, "got {}", result.total_score);
        for d in result.scores.iter() {
            assert!(d.score > 0.0, "{} should be positive", d.key);
        }
        assert!(!result.strengths.is_empty());
    }

    #[test]
    fn scores_are_capped() {
        let result = HeuristicScorer.evaluate(EXCELLENT_PROMPT, &rest_challenge());

        for d in result.scores.iter() {
            assert!((0.0..=2.0).contains(&d.score), "{} = {}", d.key, d.score);
        }
        assert!(result.total_score <= 10.0);
        assert_eq!(result.scores.specificity.score, 2.0);
        assert_eq!(result.scores.completeness.score, 2.0);
        assert!(result.strengths.len() <= MAX_STRENGTHS);
    }

    #[test]
    fn filler_words_cost_clarity() {
        let challenge = rest_challenge();
        let clean = HeuristicScorer.evaluate("Write a concise summary of the release.", &challenge);
        let vague = HeuristicScorer.evaluate("Maybe write a summary of the release.", &challenge);
        assert_eq!(clean.scores.clarity.score, 0.5);
        assert_eq!(vague.scores.clarity.score, 0.0);
    }

    #[test]
    fn structure_reaches_max_from_sentences_plus_one_signal() {
        let text = "One. Two. Three. Four. Five.\n\nSix.";
        let result = HeuristicScorer.evaluate(text, &rest_challenge());
        assert_eq!(result.scores.structure.score, 1.5);

        let listed = "One. Two. Three. Four. Five.\n- Six.";
        let result = HeuristicScorer.evaluate(listed, &rest_challenge());
        assert_eq!(result.scores.structure.score, 1.5);

        let both = "One. Two. Three. Four. Five.\n\n- Six.";
        let result = HeuristicScorer.evaluate(both, &rest_challenge());
        assert_eq!(result.scores.structure.score, 2.0);
    }

    #[test]
    fn completeness_grows_with_tip_coverage() {
        let challenge = rest_challenge();
        let none = HeuristicScorer.evaluate("Write something general", &challenge);
        let one = HeuristicScorer.evaluate("Describe the resources", &challenge);
        let all = HeuristicScorer.evaluate(
            "Describe the resources, the authentication scheme, and pagination",
            &challenge,
        );
        assert_eq!(none.scores.completeness.score, 0.0);
        assert_eq!(one.scores.completeness.score, 0.5);
        assert_eq!(all.scores.completeness.score, 2.0);
        assert!(none.scores.completeness.score < all.scores.completeness.score);
    }

    #[test]
    fn no_tips_means_no_completeness() {
        let mut challenge = rest_challenge();
        challenge.tips.clear();
        let result = HeuristicScorer.evaluate(DETAILED_PROMPT, &challenge);
        assert_eq!(result.scores.completeness.score, 0.0);
    }

    #[test]
    fn total_is_rounded_sum_of_dimensions() {
        for text in ["", "Build API", DETAILED_PROMPT, EXCELLENT_PROMPT] {
            let result = HeuristicScorer.evaluate(text, &rest_challenge());
            let sum: f64 = result.scores.iter().map(|d| d.score).sum();
            assert!((result.total_score - sum).abs() < 1e-9);
            assert_eq!(result.grade, Grade::from_score(result.total_score));
            assert!((0.0..=10.0).contains(&result.total_score));
        }
    }

    #[test]
    fn deterministic_output() {
        let challenge = rest_challenge();
        let a = HeuristicScorer.evaluate(DETAILED_PROMPT, &challenge);
        let b = HeuristicScorer.evaluate(DETAILED_PROMPT, &challenge);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn suggestions_and_strengths_follow_dimension_order() {
        let result = HeuristicScorer.evaluate(EXCELLENT_PROMPT, &rest_challenge());
        let expected: Vec<String> = result
            .scores
            .iter()
            .filter(|d| d.score >= STRENGTH_THRESHOLD)
            .map(|d| strength_for(d.key).to_string())
            .take(MAX_STRENGTHS)
            .collect();
        assert_eq!(result.strengths, expected);
    }

    #[test]
    fn no_feedback_on_heuristic_path() {
        let result = HeuristicScorer.evaluate(DETAILED_PROMPT, &rest_challenge());
        assert!(result.scores.iter().all(|d| d.feedback.is_none()));
    }
}
