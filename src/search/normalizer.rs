//! Query Normalizer: tokenization, stop-word removal and synonym expansion
//!
//! The stop words and synonym groups live in a [`Lexicon`] value so they can
//! be swapped out (e.g. loaded from a TOML file) without touching the ranker.

use crate::errors::{Result, SenseiError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Minimum token length kept after splitting
const MIN_TOKEN_LEN: usize = 2;

/// Anything outside ASCII word characters and whitespace
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("static pattern"));

const DEFAULT_STOP_WORDS: &[&str] = &[
    "what", "is", "are", "how", "do", "does", "can", "could", "tell", "me", "about", "explain",
    "the", "a", "an", "of", "in", "to", "for", "on",
];

const DEFAULT_SYNONYM_GROUPS: &[&[&str]] = &[
    &["array", "arrays", "list", "lists"],
    &["function", "functions", "method", "methods", "def"],
    &["object", "objects", "dictionary", "dict", "dictionaries"],
    &["loop", "loops", "iterate", "iteration", "for", "while"],
    &["variable", "variables", "var", "let", "const"],
    &["class", "classes", "oop"],
    &["error", "errors", "exception", "exceptions"],
];

/// Stop words and synonym groups used to normalize queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub synonym_groups: Vec<Vec<String>>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            synonym_groups: DEFAULT_SYNONYM_GROUPS
                .iter()
                .map(|group| group.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }
}

impl Lexicon {
    /// Parse a lexicon from TOML text
    ///
    /// ```toml
    /// stop_words = ["what", "is"]
    /// synonym_groups = [["array", "list"], ["loop", "for"]]
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let lexicon: Lexicon = toml::from_str(text)?;
        if lexicon.synonym_groups.iter().any(|g| g.len() < 2) {
            return Err(SenseiError::Lexicon(
                "synonym groups need at least two members".to_string(),
            ));
        }
        Ok(lexicon)
    }

    /// Load a lexicon file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Normalized form of a raw query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Trimmed, lower-cased query used for exact-equality checks
    pub phrase: String,
    /// Expanded term set, in first-seen order without duplicates
    pub terms: Vec<String>,
}

impl NormalizedQuery {
    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

/// Turns free text into a weighted term set
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    stop_words: HashSet<String>,
    groups: Vec<Vec<String>>,
    /// term -> indices into `groups`
    membership: HashMap<String, Vec<usize>>,
}

impl QueryNormalizer {
    /// Create a normalizer over the given lexicon
    pub fn new(lexicon: &Lexicon) -> Self {
        let stop_words = lexicon
            .stop_words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        let groups: Vec<Vec<String>> = lexicon
            .synonym_groups
            .iter()
            .map(|g| g.iter().map(|w| w.to_lowercase()).collect())
            .collect();

        let mut membership: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for word in group {
                membership.entry(word.clone()).or_default().push(index);
            }
        }

        Self {
            stop_words,
            groups,
            membership,
        }
    }

    /// Normalize a raw query
    ///
    /// Whitespace-only input yields an empty query with no terms.
    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        let phrase = raw.trim().to_lowercase();
        if phrase.is_empty() {
            return NormalizedQuery {
                phrase,
                terms: Vec::new(),
            };
        }

        let cleaned = NON_WORD.replace_all(&phrase, " ");
        let mut base: Vec<String> = cleaned
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_LEN && !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect();

        if base.is_empty() {
            base.push(phrase.clone());
        }

        let mut terms: Vec<String> = Vec::new();
        for term in &base {
            push_unique(&mut terms, term);
        }
        // One level only: members of a group are not expanded again
        for term in &base {
            if let Some(indices) = self.membership.get(term) {
                for &index in indices {
                    for synonym in &self.groups[index] {
                        push_unique(&mut terms, synonym);
                    }
                }
            }
        }

        NormalizedQuery { phrase, terms }
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(&Lexicon::default())
    }
}

fn push_unique(terms: &mut Vec<String>, term: &str) {
    if !terms.iter().any(|t| t == term) {
        terms.push(term.to_string());
    }
}
