//! Mock evaluator for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use promptgrade_core::error::ProviderError;
use promptgrade_core::traits::{parse_assessment, AiAssessment, AiEvaluationRequest, AiEvaluator};

enum Reply {
    /// Raw provider text, run through the same payload validation as a real reply.
    Raw {
        by_prompt: HashMap<String, String>,
        default: String,
    },
    /// Always fail with an error built by this function.
    Fail(fn() -> ProviderError),
}

/// An AI evaluator that never touches the network.
///
/// Replies are matched by prompt substring, so one mock can serve several
/// submissions with different grades.
pub struct MockEvaluator {
    reply: Reply,
    call_count: AtomicU32,
    last_request: Mutex<Option<AiEvaluationRequest>>,
}

impl MockEvaluator {
    /// Create a mock with `prompt substring → raw reply` mappings.
    pub fn new(responses: HashMap<String, String>, default_response: &str) -> Self {
        Self::with_reply(Reply::Raw {
            by_prompt: responses,
            default: default_response.to_string(),
        })
    }

    /// Create a mock that always returns the same raw reply.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(HashMap::new(), response)
    }

    /// Create a mock whose every call fails.
    pub fn failing(error: fn() -> ProviderError) -> Self {
        Self::with_reply(Reply::Fail(error))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this evaluator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<AiEvaluationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AiEvaluator for MockEvaluator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(&self, request: &AiEvaluationRequest) -> Result<AiAssessment, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        match &self.reply {
            Reply::Fail(error) => Err(error()),
            Reply::Raw { by_prompt, default } => {
                let raw = by_prompt
                    .iter()
                    .find(|(key, _)| request.prompt_text.contains(key.as_str()))
                    .map(|(_, v)| v.as_str())
                    .unwrap_or(default);
                parse_assessment(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgrade_core::model::{Category, ChallengeSpec, Difficulty};

    fn reply(score: f64) -> String {
        serde_json::json!({
            "dimensionScores": (["clarity", "specificity", "context", "structure", "completeness"]
                .iter()
                .map(|k| serde_json::json!({"key": k, "score": score, "feedback": "ok"}))
                .collect::<Vec<_>>()),
            "suggestions": ["More detail"],
            "strengths": []
        })
        .to_string()
    }

    fn request(prompt: &str) -> AiEvaluationRequest {
        let challenge = ChallengeSpec {
            id: "c1".into(),
            title: "Challenge".into(),
            instruction: "Do the thing".into(),
            tips: vec![],
            category: Category::AiPrompting,
            difficulty: Difficulty::Beginner,
            tags: vec![],
            example_prompt: None,
        };
        AiEvaluationRequest::new(prompt, &challenge)
    }

    #[tokio::test]
    async fn fixed_response() {
        let mock = MockEvaluator::with_fixed_response(&reply(1.0));
        let assessment = mock.evaluate(&request("anything")).await.unwrap();
        assert_eq!(assessment.scores.total(), 5.0);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_request().unwrap().prompt_text, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("excellent".to_string(), reply(2.0));
        let mock = MockEvaluator::new(responses, &reply(0.5));

        let high = mock.evaluate(&request("an excellent prompt")).await.unwrap();
        let low = mock.evaluate(&request("meh")).await.unwrap();
        assert_eq!(high.scores.total(), 10.0);
        assert_eq!(low.scores.total(), 2.5);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn invalid_reply_surfaces_payload_error() {
        let mock = MockEvaluator::with_fixed_response("not json");
        let err = mock.evaluate(&request("x")).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn failing_mock() {
        let mock = MockEvaluator::failing(|| ProviderError::NetworkError("down".into()));
        assert!(mock.evaluate(&request("x")).await.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
