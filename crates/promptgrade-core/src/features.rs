//! Lexical signals extracted from prompt text.
//!
//! Every function here is pure and deterministic. Vocabulary matching is
//! case-insensitive and anchored on word boundaries; the vocabularies are
//! exposed as constants so callers and tests can enumerate them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Domain and technical nouns that signal a specific prompt.
pub const TECHNICAL_TERMS: &[&str] = &[
    "API",
    "database",
    "function",
    "component",
    "class",
    "interface",
    "endpoint",
    "schema",
    "model",
    "service",
    "authentication",
    "authorization",
    "validation",
    "error",
    "response",
    "request",
    "data",
    "user",
    "admin",
    "role",
    "permission",
];

/// Purpose and justification words that signal background context.
pub const CONTEXT_KEYWORDS: &[&str] = &[
    "for",
    "because",
    "since",
    "in order to",
    "purpose",
    "goal",
    "objective",
    "requirement",
    "need",
    "should",
    "must",
    "user",
    "customer",
    "client",
    "scenario",
    "case",
    "example",
];

/// Hedging words that make a prompt read as vague.
pub const FILLER_WORDS: &[&str] = &["um", "uh", "like", "maybe", "perhaps"];

/// Minimum length of a tip word that counts toward coverage.
pub const MIN_TIP_KEYWORD_LEN: usize = 4;

/// Bullet characters recognized at the start of a line.
const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

static TECHNICAL_TERMS_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(TECHNICAL_TERMS));
static CONTEXT_KEYWORDS_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(CONTEXT_KEYWORDS));
static FILLER_WORDS_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(FILLER_WORDS));

/// Build `(?i)\b(?:w1|w2|...)\b` from a vocabulary.
fn vocabulary_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid vocabulary regex")
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of technical-term occurrences.
pub fn technical_term_density(text: &str) -> usize {
    TECHNICAL_TERMS_RE.find_iter(text).count()
}

/// Number of context-keyword occurrences.
pub fn context_keyword_density(text: &str) -> usize {
    CONTEXT_KEYWORDS_RE.find_iter(text).count()
}

/// Whether any filler word appears as a whole word.
pub fn contains_filler_words(text: &str) -> bool {
    FILLER_WORDS_RE.is_match(text)
}

pub fn contains_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Whether some line after the first starts with a bullet, `N.`, or a lettered item like `a)`.
///
/// A marker must follow a line break, so a prompt that opens with one does not
/// count. Indented bullets do not count either.
pub fn has_list_markers(text: &str) -> bool {
    text.lines().skip(1).any(is_list_item)
}

fn is_list_item(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    if BULLET_MARKERS.contains(&first) {
        return true;
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        return line[digits..].starts_with('.');
    }

    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(')')) if letter.is_ascii_lowercase()
    )
}

/// Whether the text has at least two non-empty blocks separated by a blank line.
pub fn has_multiple_sections(text: &str) -> bool {
    section_count(text) >= 2
}

fn section_count(text: &str) -> usize {
    let mut sections = 0;
    let mut in_block = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_block = false;
        } else if !in_block {
            in_block = true;
            sections += 1;
        }
    }
    sections
}

/// Number of non-empty segments between `.`, `!`, and `?`.
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Words of at least four letters in a tip, lowercased.
pub fn tip_keywords(tip: &str) -> Vec<String> {
    tip.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| w.len() >= MIN_TIP_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Fraction of tips with at least one keyword present in the text.
///
/// Returns 0.0 when there are no tips.
pub fn tip_coverage_ratio(text: &str, tips: &[String]) -> f64 {
    if tips.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();
    let covered = tips
        .iter()
        .filter(|tip| tip_keywords(tip).iter().any(|kw| lower.contains(kw.as_str())))
        .count();
    covered as f64 / tips.len() as f64
}

/// All signals for one prompt, computed in a single pass over the extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub word_count: usize,
    pub technical_terms: usize,
    pub context_keywords: usize,
    pub has_filler_words: bool,
    pub has_digits: bool,
    pub has_list_markers: bool,
    pub has_multiple_sections: bool,
    pub sentence_count: usize,
    pub tip_coverage: f64,
}

impl TextFeatures {
    pub fn extract(text: &str, tips: &[String]) -> Self {
        Self {
            word_count: count_words(text),
            technical_terms: technical_term_density(text),
            context_keywords: context_keyword_density(text),
            has_filler_words: contains_filler_words(text),
            has_digits: contains_digit(text),
            has_list_markers: has_list_markers(text),
            has_multiple_sections: has_multiple_sections(text),
            sentence_count: sentence_count(text),
            tip_coverage: tip_coverage_ratio(text, tips),
        }
    }
}
