//! Evaluation orchestrator.
//!
//! Picks one strategy per call (AI when enabled and configured, otherwise the
//! heuristic scorer) and falls back to the heuristic scorer whenever the AI
//! path fails. Exactly one strategy contributes to a result.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::ProviderError;
use crate::heuristic::HeuristicScorer;
use crate::model::{ChallengeSpec, EvaluationResult, EvaluatorType};
use crate::traits::{AiEvaluationRequest, AiEvaluator};

/// Configuration for the orchestrator, supplied by the host process.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Whether the AI path may be used at all.
    pub ai_enabled: bool,
    /// Upper bound on a single AI evaluation, including transport.
    pub ai_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            ai_timeout: Duration::from_secs(30),
        }
    }
}

/// The strategy selected for one evaluation.
#[derive(Clone)]
pub enum Strategy {
    Ai(Arc<dyn AiEvaluator>),
    Heuristic,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Ai(client) => f.debug_tuple("Ai").field(&client.name()).finish(),
            Strategy::Heuristic => f.write_str("Heuristic"),
        }
    }
}

/// Converts a submitted prompt into a graded result.
pub struct EvaluationOrchestrator {
    ai: Option<Arc<dyn AiEvaluator>>,
    heuristic: HeuristicScorer,
    config: OrchestratorConfig,
}

impl EvaluationOrchestrator {
    pub fn new(ai: Option<Arc<dyn AiEvaluator>>, config: OrchestratorConfig) -> Self {
        Self {
            ai,
            heuristic: HeuristicScorer::new(),
            config,
        }
    }

    /// An orchestrator that only ever uses the heuristic scorer.
    pub fn heuristic_only() -> Self {
        Self::new(None, OrchestratorConfig::default())
    }

    /// Choose the strategy for the next call.
    pub fn select_strategy(&self) -> Strategy {
        match (&self.ai, self.config.ai_enabled) {
            (Some(client), true) => Strategy::Ai(Arc::clone(client)),
            _ => Strategy::Heuristic,
        }
    }

    /// Evaluate a prompt. Never fails: AI problems fall back to the heuristic scorer.
    #[instrument(skip_all, fields(challenge = %challenge.id))]
    pub async fn evaluate(&self, challenge: &ChallengeSpec, prompt_text: &str) -> EvaluationResult {
        let ai_result = match self.select_strategy() {
            Strategy::Ai(client) => {
                try_evaluate(client.as_ref(), prompt_text, challenge, self.config.ai_timeout)
                    .await
            }
            Strategy::Heuristic => {
                info!("AI evaluation disabled or not configured, using heuristic evaluator");
                None
            }
        };

        match ai_result {
            Some(result) => result,
            None => {
                info!("using heuristic evaluator");
                self.heuristic.evaluate(prompt_text, challenge)
            }
        }
    }
}

/// Ask an AI evaluator for a result, bounded by `timeout`.
///
/// Returns `None` on any failure; the cause is logged but not returned.
pub async fn try_evaluate(
    client: &dyn AiEvaluator,
    prompt_text: &str,
    challenge: &ChallengeSpec,
    timeout: Duration,
) -> Option<EvaluationResult> {
    match evaluate_with_ai(client, prompt_text, challenge, timeout).await {
        Ok(result) => {
            info!(provider = client.name(), "AI evaluation successful");
            Some(result)
        }
        Err(e) => {
            warn!(
                provider = client.name(),
                "AI evaluation failed, falling back to heuristic: {e}"
            );
            None
        }
    }
}

async fn evaluate_with_ai(
    client: &dyn AiEvaluator,
    prompt_text: &str,
    challenge: &ChallengeSpec,
    timeout: Duration,
) -> Result<EvaluationResult, ProviderError> {
    let request = AiEvaluationRequest::new(prompt_text, challenge);
    let assessment = tokio::time::timeout(timeout, client.evaluate(&request))
        .await
        .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;

    // Total, grade, and word count are always derived locally.
    Ok(EvaluationResult::new(
        assessment.scores,
        assessment.suggestions,
        assessment.strengths,
        EvaluatorType::Ai,
        prompt_text,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::model::{Category, Difficulty, DimensionScores};
    use crate::traits::AiAssessment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum Behaviour {
        Succeed,
        Fail,
        Hang,
    }

    struct StubEvaluator {
        behaviour: Behaviour,
        calls: AtomicU32,
    }

    impl StubEvaluator {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl AiEvaluator for StubEvaluator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn evaluate(
            &self,
            _request: &AiEvaluationRequest,
        ) -> Result<AiAssessment, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(AiAssessment {
                    scores: DimensionScores::from_values(2.0, 1.75, 1.5, 2.0, 1.25),
                    suggestions: vec!["Mention rate limits".into()],
                    strengths: vec!["Clear".into()],
                }),
                Behaviour::Fail => Err(ProviderError::ApiError {
                    status: 500,
                    message: "boom".into(),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ProviderError::EmptyResponse)
                }
            }
        }
    }

    fn challenge() -> ChallengeSpec {
        ChallengeSpec {
            id: "c1".into(),
            title: "Challenge".into(),
            instruction: "Build a REST API".into(),
            tips: vec!["Specify pagination".into()],
            category: Category::Backend,
            difficulty: Difficulty::Beginner,
            tags: vec![],
            example_prompt: None,
        }
    }

    fn enabled() -> OrchestratorConfig {
        OrchestratorConfig {
            ai_enabled: true,
            ai_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn uses_ai_result_when_available() {
        let stub = StubEvaluator::new(Behaviour::Succeed);
        let orchestrator = EvaluationOrchestrator::new(Some(stub.clone()), enabled());

        let result = orchestrator.evaluate(&challenge(), "Build API now").await;
        assert_eq!(result.evaluator_type, EvaluatorType::Ai);
        assert_eq!(result.total_score, 8.5);
        assert_eq!(result.grade, Grade::A);
        assert_eq!(result.word_count, 3);
        assert_eq!(result.suggestions, vec!["Mention rate limits"]);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_on_provider_failure() {
        let stub = StubEvaluator::new(Behaviour::Fail);
        let orchestrator = EvaluationOrchestrator::new(Some(stub.clone()), enabled());

        let result = orchestrator.evaluate(&challenge(), "Build API").await;
        assert_eq!(result.evaluator_type, EvaluatorType::Heuristic);
        assert_eq!(result, HeuristicScorer.evaluate("Build API", &challenge()));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_never_calls_provider() {
        let stub = StubEvaluator::new(Behaviour::Succeed);
        let config = OrchestratorConfig {
            ai_enabled: false,
            ..enabled()
        };
        let orchestrator = EvaluationOrchestrator::new(Some(stub.clone()), config);

        for text in ["Build API", "A much longer prompt for the user API. It has detail."] {
            let result = orchestrator.evaluate(&challenge(), text).await;
            assert_eq!(result.evaluator_type, EvaluatorType::Heuristic);
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn enabled_without_client_uses_heuristic() {
        let orchestrator = EvaluationOrchestrator::new(None, enabled());
        assert!(matches!(orchestrator.select_strategy(), Strategy::Heuristic));
        let result = orchestrator.evaluate(&challenge(), "Build API").await;
        assert_eq!(result.evaluator_type, EvaluatorType::Heuristic);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out() {
        let stub = StubEvaluator::new(Behaviour::Hang);
        let orchestrator = EvaluationOrchestrator::new(Some(stub), enabled());

        let result = orchestrator.evaluate(&challenge(), "Build API").await;
        assert_eq!(result.evaluator_type, EvaluatorType::Heuristic);
    }

    #[test]
    fn strategy_selection() {
        let stub: Arc<dyn AiEvaluator> = StubEvaluator::new(Behaviour::Succeed);
        let orchestrator = EvaluationOrchestrator::new(Some(stub), enabled());
        assert!(matches!(orchestrator.select_strategy(), Strategy::Ai(_)));
        assert_eq!(
            format!("{:?}", orchestrator.select_strategy()),
            "Ai(\"stub\")"
        );
        assert!(matches!(
            EvaluationOrchestrator::heuristic_only().select_strategy(),
            Strategy::Heuristic
        ));
    }
}
