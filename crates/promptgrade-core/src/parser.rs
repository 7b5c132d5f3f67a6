//! TOML challenge parser.
//!
//! Loads challenges from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::ChallengeSpec;

const TITLE_CHARS: std::ops::RangeInclusive<usize> = 5..=100;
const MIN_INSTRUCTION_CHARS: usize = 20;
const MAX_TIPS: usize = 10;
const MAX_TAGS: usize = 10;

#[derive(Debug, Deserialize)]
struct TomlChallengeFile {
    #[serde(default)]
    challenges: Vec<ChallengeSpec>,
}

/// Parse a single TOML file of `[[challenges]]` tables.
pub fn parse_challenge_file(path: &Path) -> Result<Vec<ChallengeSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read challenge file: {}", path.display()))?;

    parse_challenges_str(&content, path)
}

/// Parse challenges from a TOML string. `source_path` is only used in error messages.
pub fn parse_challenges_str(content: &str, source_path: &Path) -> Result<Vec<ChallengeSpec>> {
    let parsed: TomlChallengeFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    Ok(parsed.challenges)
}

/// Load every `.toml` file in a directory, in file-name order.
///
/// Files that fail to parse are skipped with a warning. A plain file path is
/// parsed directly and its errors are returned.
pub fn load_challenge_directory(dir: &Path) -> Result<Vec<ChallengeSpec>> {
    if dir.is_file() {
        return parse_challenge_file(dir);
    }
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut challenges = Vec::new();
    for path in paths {
        match parse_challenge_file(&path) {
            Ok(parsed) => {
                tracing::debug!(file = %path.display(), count = parsed.len(), "loaded challenges");
                challenges.extend(parsed);
            }
            Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
        }
    }

    Ok(challenges)
}

/// A warning from challenge validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The challenge ID, when the warning concerns one challenge.
    pub challenge_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn for_challenge(challenge: &ChallengeSpec, message: impl Into<String>) -> Self {
        Self {
            challenge_id: Some(challenge.id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a set of challenges for common authoring mistakes.
pub fn validate_challenges(challenges: &[ChallengeSpec]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if challenges.is_empty() {
        warnings.push(ValidationWarning {
            challenge_id: None,
            message: "no challenges found".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for challenge in challenges {
        if !seen_ids.insert(challenge.id.as_str()) {
            warnings.push(ValidationWarning::for_challenge(
                challenge,
                format!("duplicate challenge ID: {}", challenge.id),
            ));
        }

        let title_len = challenge.title.trim().chars().count();
        if !TITLE_CHARS.contains(&title_len) {
            warnings.push(ValidationWarning::for_challenge(
                challenge,
                format!(
                    "title must be {}-{} characters (got {title_len})",
                    TITLE_CHARS.start(),
                    TITLE_CHARS.end()
                ),
            ));
        }

        if challenge.instruction.trim().chars().count() < MIN_INSTRUCTION_CHARS {
            warnings.push(ValidationWarning::for_challenge(
                challenge,
                format!("instruction must be at least {MIN_INSTRUCTION_CHARS} characters"),
            ));
        }

        if challenge.tips.is_empty() || challenge.tips.len() > MAX_TIPS {
            warnings.push(ValidationWarning::for_challenge(
                challenge,
                format!("expected 1-{MAX_TIPS} tips (got {})", challenge.tips.len()),
            ));
        }
        if challenge.tips.iter().any(|t| t.trim().is_empty()) {
            warnings.push(ValidationWarning::for_challenge(challenge, "tip is empty"));
        }

        if challenge.tags.len() > MAX_TAGS {
            warnings.push(ValidationWarning::for_challenge(
                challenge,
                format!("at most {MAX_TAGS} tags allowed (got {})", challenge.tags.len()),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty};
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[[challenges]]
id = "rest-api"
title = "REST API design"
category = "Backend"
difficulty = "Intermediate"
instruction = "Write a prompt that asks for a REST API for user management."
tips = [
    "Define resources and HTTP methods",
    "Mention authentication method",
    "Specify pagination",
]
tags = ["API", "REST"]
example_prompt = "Create a RESTful API for user management..."

[[challenges]]
id = "landing-page"
title = "Landing page layout"
category = "UI/UX Design"
difficulty = "Beginner"
instruction = "Write a prompt for a responsive product landing page."
tips = ["Describe the target audience"]
"#;

    fn path() -> PathBuf {
        PathBuf::from("test.toml")
    }

    #[test]
    fn parse_valid_toml() {
        let challenges = parse_challenges_str(VALID_TOML, &path()).unwrap();
        assert_eq!(challenges.len(), 2);

        let rest = &challenges[0];
        assert_eq!(rest.id, "rest-api");
        assert_eq!(rest.category, Category::Backend);
        assert_eq!(rest.difficulty, Difficulty::Intermediate);
        assert_eq!(rest.tips.len(), 3);
        assert_eq!(rest.tags, vec!["API", "REST"]);
        assert!(rest.example_prompt.is_some());

        let landing = &challenges[1];
        assert_eq!(landing.category, Category::UiUxDesign);
        assert!(landing.tags.is_empty());
        assert!(landing.example_prompt.is_none());
        assert!(validate_challenges(&challenges).is_empty());
    }

    #[test]
    fn parse_unknown_category_fails() {
        let toml = VALID_TOML.replace("\"Backend\"", "\"Frontend\"");
        assert!(parse_challenges_str(&toml, &path()).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_challenges_str("this is not valid toml [[[", &path());
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("test.toml"));
    }

    #[test]
    fn validate_duplicate_ids() {
        let mut challenges = parse_challenges_str(VALID_TOML, &path()).unwrap();
        challenges[1].id = "rest-api".into();

        let warnings = validate_challenges(&challenges);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].challenge_id.as_deref(), Some("rest-api"));
        assert!(warnings[0].message.contains("duplicate"));
    }

    #[test]
    fn validate_field_bounds() {
        let mut challenges = parse_challenges_str(VALID_TOML, &path()).unwrap();
        let c = &mut challenges[0];
        c.title = "API".into();
        c.instruction = "Too short".into();
        c.tips = vec![];
        c.tags = (0..11).map(|i| format!("tag{i}")).collect();

        let warnings = validate_challenges(&challenges[..1]);
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(warnings.len(), 4, "{messages:?}");
        assert!(messages.iter().any(|m| m.starts_with("title")));
        assert!(messages.iter().any(|m| m.starts_with("instruction")));
        assert!(messages.iter().any(|m| m.contains("tips")));
        assert!(messages.iter().any(|m| m.contains("tags")));
    }

    #[test]
    fn validate_empty_tip_and_empty_set() {
        let mut challenges = parse_challenges_str(VALID_TOML, &path()).unwrap();
        challenges[1].tips.push("   ".into());
        let warnings = validate_challenges(&challenges);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "tip is empty");

        let warnings = validate_challenges(&[]);
        assert_eq!(warnings[0].challenge_id, None);
    }

    #[test]
    fn load_directory_sorted_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let second = VALID_TOML
            .replace("rest-api", "z-rest")
            .replace("landing-page", "z-landing");
        std::fs::write(dir.path().join("b.toml"), second).unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "[[[").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let challenges = load_challenge_directory(dir.path()).unwrap();
        let ids: Vec<_> = challenges.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["rest-api", "landing-page", "z-rest", "z-landing"]);

        let single = load_challenge_directory(&dir.path().join("a.toml")).unwrap();
        assert_eq!(single.len(), 2);
        assert!(load_challenge_directory(&dir.path().join("missing")).is_err());
    }
}
