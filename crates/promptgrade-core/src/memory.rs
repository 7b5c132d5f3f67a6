//! In-process store implementing every collaborator trait.
//!
//! Users and attempts share one lock so `record_evaluation` is atomic. Each
//! user carries a version counter that increments on every stats write.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Attempt, AttemptId, ChallengeSpec, NewAttempt, UserStats, VersionedStats};
use crate::traits::{AttemptStore, ChallengeLookup, EvaluationLedger, UserStore};

#[derive(Default)]
struct Ledger {
    users: HashMap<String, VersionedStats>,
    attempts: Vec<Attempt>,
}

impl Ledger {
    fn swap_stats(
        &mut self,
        user_id: &str,
        expected_version: u64,
        stats: UserStats,
    ) -> Result<(), StoreError> {
        let entry = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::Backend(format!("unknown user: {user_id}")))?;
        if entry.version != expected_version {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
            });
        }
        entry.stats = stats;
        entry.version += 1;
        Ok(())
    }

    fn append(&mut self, attempt: NewAttempt) -> AttemptId {
        let id = Uuid::new_v4();
        self.attempts
            .push(Attempt::from_new(id, attempt, Utc::now()));
        id
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    challenges: RwLock<HashMap<String, ChallengeSpec>>,
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Backend("ledger lock poisoned".to_string()))
    }

    /// Add or replace a challenge.
    pub fn insert_challenge(&self, challenge: ChallengeSpec) -> Result<(), StoreError> {
        self.challenges
            .write()
            .map_err(|_| StoreError::Backend("challenge lock poisoned".to_string()))?
            .insert(challenge.id.clone(), challenge);
        Ok(())
    }

    /// Create a user with zeroed stats. Returns `false` if the user already exists.
    pub fn register_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut ledger = self.ledger()?;
        if ledger.users.contains_key(user_id) {
            return Ok(false);
        }
        ledger.users.insert(
            user_id.to_string(),
            VersionedStats {
                stats: UserStats::default(),
                version: 0,
            },
        );
        Ok(true)
    }

    /// Snapshot of every user's stats, sorted by user id.
    pub fn all_user_stats(&self) -> Result<Vec<(String, UserStats)>, StoreError> {
        let ledger = self.ledger()?;
        let mut stats: Vec<_> = ledger
            .users
            .iter()
            .map(|(id, v)| (id.clone(), v.stats))
            .collect();
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(stats)
    }

    pub fn attempt_count(&self) -> Result<usize, StoreError> {
        Ok(self.ledger()?.attempts.len())
    }
}

#[async_trait]
impl ChallengeLookup for MemoryStore {
    async fn get_challenge(&self, id: &str) -> Result<Option<ChallengeSpec>, StoreError> {
        let challenges = self
            .challenges
            .read()
            .map_err(|_| StoreError::Backend("challenge lock poisoned".to_string()))?;
        Ok(challenges.get(id).cloned())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn create_attempt(&self, attempt: NewAttempt) -> Result<AttemptId, StoreError> {
        Ok(self.ledger()?.append(attempt))
    }

    async fn get_attempt(
        &self,
        user_id: &str,
        attempt_id: AttemptId,
    ) -> Result<Option<Attempt>, StoreError> {
        Ok(self
            .ledger()?
            .attempts
            .iter()
            .find(|a| a.id == attempt_id && a.user_id == user_id)
            .cloned())
    }

    async fn attempts_for_challenge(&self, challenge_id: &str) -> Result<Vec<Attempt>, StoreError> {
        Ok(self
            .ledger()?
            .attempts
            .iter()
            .filter(|a| a.challenge_id == challenge_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user_stats(&self, user_id: &str) -> Result<Option<VersionedStats>, StoreError> {
        Ok(self.ledger()?.users.get(user_id).copied())
    }

    async fn update_user_stats(
        &self,
        user_id: &str,
        expected_version: u64,
        stats: UserStats,
    ) -> Result<(), StoreError> {
        self.ledger()?.swap_stats(user_id, expected_version, stats)
    }
}

#[async_trait]
impl EvaluationLedger for MemoryStore {
    async fn record_evaluation(
        &self,
        attempt: NewAttempt,
        expected_version: u64,
        stats: UserStats,
    ) -> Result<AttemptId, StoreError> {
        let mut ledger = self.ledger()?;
        ledger.swap_stats(&attempt.user_id, expected_version, stats)?;
        Ok(ledger.append(attempt))
    }
}
