pub mod batch;
pub mod evaluate;
pub mod init;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use promptgrade_core::engine::EvaluationOrchestrator;
use promptgrade_core::model::ChallengeSpec;
use promptgrade_core::parser;
use promptgrade_providers::config::load_config_from;
use promptgrade_providers::{create_evaluator, PromptgradeConfig};

/// Load configuration and build the orchestrator it describes.
pub fn build_orchestrator(
    config_path: Option<&PathBuf>,
) -> Result<(PromptgradeConfig, EvaluationOrchestrator)> {
    let config = load_config_from(config_path.map(PathBuf::as_path))?;
    tracing::debug!(?config, "configuration loaded");

    let evaluator = create_evaluator(&config.ai);
    let orchestrator = EvaluationOrchestrator::new(evaluator, config.ai.orchestrator_config());
    Ok((config, orchestrator))
}

/// Load challenges from a file or directory, failing if none are found.
pub fn load_challenges(path: &Path) -> Result<Vec<ChallengeSpec>> {
    let challenges = parser::load_challenge_directory(path)?;
    anyhow::ensure!(
        !challenges.is_empty(),
        "no challenges found in {}",
        path.display()
    );
    Ok(challenges)
}
