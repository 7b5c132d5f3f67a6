//! Evaluation service: one submission in, one attempt plus one stats update out.
//!
//! Stats are updated with an optimistic compare-and-swap loop against the
//! store's per-user version, so concurrent submissions for the same user never
//! lose an update. Nothing is written until the evaluation has finished.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use crate::engine::EvaluationOrchestrator;
use crate::error::{EvalError, StoreError};
use crate::model::{Attempt, AttemptId, EvaluationResult, NewAttempt, PromptSubmission};
use crate::statistics::{apply_result, compute_challenge_stats, ChallengeStats};
use crate::traits::{AttemptStore, ChallengeLookup, EvaluationLedger, UserStore};

/// What a successful submission returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub attempt_id: AttemptId,
    pub result: EvaluationResult,
}

/// Wires the orchestrator to the collaborator stores.
pub struct EvaluationService {
    orchestrator: EvaluationOrchestrator,
    challenges: Arc<dyn ChallengeLookup>,
    attempts: Arc<dyn AttemptStore>,
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn EvaluationLedger>,
}

impl EvaluationService {
    pub fn new(
        orchestrator: EvaluationOrchestrator,
        challenges: Arc<dyn ChallengeLookup>,
        attempts: Arc<dyn AttemptStore>,
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn EvaluationLedger>,
    ) -> Self {
        Self {
            orchestrator,
            challenges,
            attempts,
            users,
            ledger,
        }
    }

    /// Build a service backed by a single store that implements every collaborator trait.
    pub fn with_store<S>(orchestrator: EvaluationOrchestrator, store: Arc<S>) -> Self
    where
        S: ChallengeLookup + AttemptStore + UserStore + EvaluationLedger + 'static,
    {
        Self::new(
            orchestrator,
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    /// Evaluate a submission, record the attempt, and fold it into the user's stats.
    #[instrument(skip(self, submission), fields(challenge = %submission.challenge_id))]
    pub async fn submit(
        &self,
        user_id: &str,
        submission: PromptSubmission,
    ) -> Result<SubmissionOutcome, EvalError> {
        submission
            .validate()
            .map_err(EvalError::InvalidSubmission)?;

        let challenge = self
            .challenges
            .get_challenge(&submission.challenge_id)
            .await?
            .ok_or_else(|| EvalError::ChallengeNotFound(submission.challenge_id.clone()))?;

        if self.users.get_user_stats(user_id).await?.is_none() {
            return Err(EvalError::UserNotFound(user_id.to_string()));
        }

        let result = self
            .orchestrator
            .evaluate(&challenge, &submission.prompt_text)
            .await;

        let attempt = NewAttempt {
            user_id: user_id.to_string(),
            challenge_id: submission.challenge_id,
            prompt_text: submission.prompt_text,
            result: result.clone(),
        };
        let attempt_id = self.record(attempt).await?;

        info!(
            %attempt_id,
            total_score = result.total_score,
            grade = %result.grade,
            evaluator = %result.evaluator_type,
            "attempt recorded"
        );

        Ok(SubmissionOutcome { attempt_id, result })
    }

    /// Commit the attempt and the stats update together, retrying on version conflicts.
    async fn record(&self, attempt: NewAttempt) -> Result<AttemptId, EvalError> {
        let mut retries = 0u32;
        loop {
            let current = self
                .users
                .get_user_stats(&attempt.user_id)
                .await?
                .ok_or_else(|| EvalError::UserNotFound(attempt.user_id.clone()))?;
            let next = apply_result(&current.stats, attempt.result.total_score);

            match self
                .ledger
                .record_evaluation(attempt.clone(), current.version, next)
                .await
            {
                Ok(id) => return Ok(id),
                Err(StoreError::Conflict { user_id }) => {
                    retries += 1;
                    debug!(%user_id, retries, "stats version moved, retrying");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Submit many prompts concurrently, at most `parallelism` at a time.
    ///
    /// Results are returned in input order.
    pub async fn submit_many(
        &self,
        submissions: Vec<(String, PromptSubmission)>,
        parallelism: usize,
    ) -> Vec<Result<SubmissionOutcome, EvalError>> {
        let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
        let mut futures = FuturesUnordered::new();

        for (idx, (user_id, submission)) in submissions.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => self.submit(&user_id, submission).await,
                    Err(_) => Err(EvalError::Store(StoreError::Backend(
                        "semaphore closed".to_string(),
                    ))),
                };
                (idx, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(futures.len());
        while let Some(item) = futures.next().await {
            outcomes.push(item);
        }
        outcomes.sort_by_key(|(idx, _)| *idx);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Fetch one of the user's own attempts.
    pub async fn attempt(&self, user_id: &str, attempt_id: AttemptId) -> Result<Attempt, EvalError> {
        self.attempts
            .get_attempt(user_id, attempt_id)
            .await?
            .ok_or_else(|| EvalError::AttemptNotFound(attempt_id.to_string()))
    }

    /// Aggregate statistics for a challenge.
    pub async fn challenge_stats(&self, challenge_id: &str) -> Result<ChallengeStats, EvalError> {
        if self.challenges.get_challenge(challenge_id).await?.is_none() {
            return Err(EvalError::ChallengeNotFound(challenge_id.to_string()));
        }
        let attempts = self.attempts.attempts_for_challenge(challenge_id).await?;
        Ok(compute_challenge_stats(&attempts))
    }
}
