//! Running user statistics and per-challenge aggregates.
//!
//! `apply_result` is the only way user stats change. It is pure; the
//! evaluation service is responsible for applying it against the latest
//! stored snapshot (see [`crate::service`]).

use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::model::{Attempt, UserStats};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold one new total score into a user's running stats.
///
/// `average' = round2((average * attempts + score) / (attempts + 1))`.
pub fn apply_result(stats: &UserStats, total_score: f64) -> UserStats {
    let total_attempts = stats.total_attempts + 1;
    let average_score = round2(
        (stats.average_score * stats.total_attempts as f64 + total_score) / total_attempts as f64,
    );

    UserStats {
        total_attempts,
        best_score: stats.best_score.max(total_score),
        average_score,
    }
}

/// Number of attempts per grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradeDistribution {
    #[serde(rename = "S")]
    pub s: u32,
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "D")]
    pub d: u32,
    #[serde(rename = "F")]
    pub f: u32,
}

impl GradeDistribution {
    fn slot_mut(&mut self, grade: Grade) -> &mut u32 {
        match grade {
            Grade::S => &mut self.s,
            Grade::A => &mut self.a,
            Grade::B => &mut self.b,
            Grade::C => &mut self.c,
            Grade::D => &mut self.d,
            Grade::F => &mut self.f,
        }
    }

    pub fn record(&mut self, grade: Grade) {
        *self.slot_mut(grade) += 1;
    }

    pub fn count(&self, grade: Grade) -> u32 {
        match grade {
            Grade::S => self.s,
            Grade::A => self.a,
            Grade::B => self.b,
            Grade::C => self.c,
            Grade::D => self.d,
            Grade::F => self.f,
        }
    }
}

/// Aggregate results for one challenge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChallengeStats {
    pub total_attempts: u32,
    pub average_score: f64,
    pub best_score: f64,
    pub grade_distribution: GradeDistribution,
}

/// Compute challenge statistics from its attempts. All zero when empty.
pub fn compute_challenge_stats(attempts: &[Attempt]) -> ChallengeStats {
    if attempts.is_empty() {
        return ChallengeStats::default();
    }

    let total: f64 = attempts.iter().map(|a| a.result.total_score).sum();
    let best_score = attempts
        .iter()
        .map(|a| a.result.total_score)
        .fold(0.0, f64::max);

    let mut grade_distribution = GradeDistribution::default();
    for attempt in attempts {
        grade_distribution.record(attempt.result.grade);
    }

    ChallengeStats {
        total_attempts: attempts.len() as u32,
        average_score: round2(total / attempts.len() as f64),
        best_score,
        grade_distribution,
    }
}
