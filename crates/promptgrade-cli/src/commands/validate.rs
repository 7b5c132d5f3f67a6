//! The `promptgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use promptgrade_core::parser;

pub fn execute(challenges_path: PathBuf) -> Result<()> {
    let challenges = if challenges_path.is_dir() {
        parser::load_challenge_directory(&challenges_path)?
    } else {
        parser::parse_challenge_file(&challenges_path)?
    };

    println!(
        "Challenges: {} ({} found)",
        challenges_path.display(),
        challenges.len()
    );
    for c in &challenges {
        println!(
            "  {}: {} [{} / {}, {} tips]",
            c.id,
            c.title,
            c.category,
            c.difficulty,
            c.tips.len()
        );
    }

    let warnings = parser::validate_challenges(&challenges);
    for w in &warnings {
        let prefix = w
            .challenge_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All challenges valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
