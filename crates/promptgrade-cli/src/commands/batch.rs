//! The `promptgrade batch` command.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Deserialize;

use promptgrade_core::memory::MemoryStore;
use promptgrade_core::model::PromptSubmission;
use promptgrade_core::service::EvaluationService;

#[derive(Debug, Deserialize)]
struct SubmissionFile {
    #[serde(default)]
    submissions: Vec<SubmissionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubmissionEntry {
    user: String,
    challenge_id: String,
    prompt: String,
}

fn parse_submissions(path: &Path) -> Result<Vec<SubmissionEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submissions: {}", path.display()))?;
    let parsed: SubmissionFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse submissions: {}", path.display()))?;
    anyhow::ensure!(
        !parsed.submissions.is_empty(),
        "no submissions found in {}",
        path.display()
    );
    Ok(parsed.submissions)
}

pub async fn execute(
    challenges_path: PathBuf,
    submissions_path: PathBuf,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let challenges = super::load_challenges(&challenges_path)?;
    let entries = parse_submissions(&submissions_path)?;
    let (config, orchestrator) = super::build_orchestrator(config_path.as_ref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let store = Arc::new(MemoryStore::new());
    for challenge in challenges {
        store.insert_challenge(challenge)?;
    }
    for entry in &entries {
        store.register_user(&entry.user)?;
    }

    let service = EvaluationService::with_store(orchestrator, store.clone());

    let submissions: Vec<_> = entries
        .iter()
        .map(|e| {
            (
                e.user.clone(),
                PromptSubmission::new(e.challenge_id.clone(), e.prompt.clone()),
            )
        })
        .collect();

    eprintln!(
        "Grading {} submission(s), parallelism {parallelism}",
        submissions.len()
    );
    let start = Instant::now();
    let outcomes = service.submit_many(submissions, parallelism).await;

    let mut attempts = Table::new();
    attempts.set_header(vec!["#", "User", "Challenge", "Score", "Grade", "Evaluator"]);
    let mut failed = 0;
    for (idx, (entry, outcome)) in entries.iter().zip(&outcomes).enumerate() {
        let row = match outcome {
            Ok(o) => vec![
                Cell::new(idx + 1),
                Cell::new(&entry.user),
                Cell::new(&entry.challenge_id),
                Cell::new(format!("{:.2}", o.result.total_score)),
                Cell::new(o.result.grade),
                Cell::new(o.result.evaluator_type),
            ],
            Err(e) => {
                failed += 1;
                vec![
                    Cell::new(idx + 1),
                    Cell::new(&entry.user),
                    Cell::new(&entry.challenge_id),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("error: {e}")),
                ]
            }
        };
        attempts.add_row(row);
    }
    println!("{attempts}");

    let mut users = Table::new();
    users.set_header(vec!["User", "Attempts", "Best", "Average"]);
    for (user, stats) in store.all_user_stats()? {
        users.add_row(vec![
            Cell::new(user),
            Cell::new(stats.total_attempts),
            Cell::new(format!("{:.2}", stats.best_score)),
            Cell::new(format!("{:.2}", stats.average_score)),
        ]);
    }
    println!("\n{users}");

    let challenge_ids: BTreeSet<&str> = entries.iter().map(|e| e.challenge_id.as_str()).collect();
    let mut per_challenge = Table::new();
    per_challenge.set_header(vec![
        "Challenge", "Attempts", "Best", "Average", "S", "A", "B", "C", "D", "F",
    ]);
    for id in challenge_ids {
        // Unknown challenges already show up as errors in the attempts table.
        let Ok(stats) = service.challenge_stats(id).await else {
            continue;
        };
        let dist = stats.grade_distribution;
        per_challenge.add_row(vec![
            Cell::new(id),
            Cell::new(stats.total_attempts),
            Cell::new(format!("{:.2}", stats.best_score)),
            Cell::new(format!("{:.2}", stats.average_score)),
            Cell::new(dist.s),
            Cell::new(dist.a),
            Cell::new(dist.b),
            Cell::new(dist.c),
            Cell::new(dist.d),
            Cell::new(dist.f),
        ]);
    }
    println!("\n{per_challenge}");

    eprintln!(
        "\nComplete: {}/{} graded, {failed} failed ({:.1}s)",
        outcomes.len() - failed,
        outcomes.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submission_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.toml");
        std::fs::write(
            &path,
            r#"
[[submissions]]
user = "alice"
challenge_id = "rest-api"
prompt = "Build API"

[[submissions]]
user = "bob"
challenge_id = "rest-api"
prompt = """
Create a REST API for users.
Use JWT authentication.
"""
"#,
        )
        .unwrap();

        let entries = parse_submissions(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].user, "bob");
        assert!(entries[1].prompt.contains("JWT"));
    }

    #[test]
    fn empty_submission_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.toml");
        std::fs::write(&path, "").unwrap();
        assert!(parse_submissions(&path).is_err());
    }
}
