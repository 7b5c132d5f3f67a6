//! The `promptgrade evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use promptgrade_core::model::{EvaluationResult, PromptSubmission};

use crate::OutputFormat;

pub async fn execute(
    challenges_path: PathBuf,
    challenge_id: String,
    prompt: Option<String>,
    prompt_file: Option<PathBuf>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let prompt_text = match (prompt, prompt_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read prompt file: {}", path.display()))?,
        (None, None) => anyhow::bail!("either --prompt or --prompt-file is required"),
    };

    let submission = PromptSubmission::new(challenge_id, prompt_text);
    submission
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid prompt: {e}"))?;

    let challenges = super::load_challenges(&challenges_path)?;
    let challenge = challenges
        .iter()
        .find(|c| c.id == submission.challenge_id)
        .with_context(|| format!("challenge not found: {}", submission.challenge_id))?;

    let (_, orchestrator) = super::build_orchestrator(config_path.as_ref())?;
    let result = orchestrator
        .evaluate(challenge, &submission.prompt_text)
        .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("Challenge: {} ({})", challenge.title, challenge.id);
            print_result(&result);
            if let Some(example) = &challenge.example_prompt {
                println!("\nExample prompt:\n{}", example.trim());
            }
        }
    }

    Ok(())
}

fn print_result(result: &EvaluationResult) {
    let mut table = Table::new();
    table.set_header(vec!["Dimension", "Score", "Feedback"]);
    for d in result.scores.iter() {
        table.add_row(vec![
            Cell::new(d.key),
            Cell::new(format!("{:.2} / 2", d.score)),
            Cell::new(d.feedback.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");

    println!(
        "Total: {:.2} / 10  Grade: {}  Words: {}  Evaluator: {}",
        result.total_score, result.grade, result.word_count, result.evaluator_type
    );

    if !result.strengths.is_empty() {
        println!("\nStrengths:");
        for s in &result.strengths {
            println!("  + {s}");
        }
    }
    if !result.suggestions.is_empty() {
        println!("\nSuggestions:");
        for s in &result.suggestions {
            println!("  - {s}");
        }
    }
}
