//! Knowledge Store: immutable topic catalog
//!
//! Loaded once at startup, either from the built-in catalog or from a JSON
//! file with the same shape. Nothing mutates it afterwards.

use crate::errors::{Result, SenseiError};
use crate::knowledge::types::{Difficulty, Topic};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../../data/knowledge_base.json");

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    topics: Vec<Topic>,
    #[serde(default)]
    categories: BTreeMap<String, String>,
    #[serde(default)]
    difficulty_levels: BTreeMap<String, String>,
}

/// Static in-memory catalog of topics
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    topics: Vec<Topic>,
    categories: BTreeMap<String, String>,
    difficulty_levels: BTreeMap<String, String>,
}

impl KnowledgeStore {
    /// Build a store from topics and label maps
    ///
    /// Fails if two topics share an id.
    pub fn new(
        topics: Vec<Topic>,
        categories: BTreeMap<String, String>,
        difficulty_levels: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if !seen.insert(topic.id.as_str()) {
                return Err(SenseiError::Catalog(format!(
                    "duplicate topic id '{}'",
                    topic.id
                )));
            }
        }

        Ok(Self {
            topics,
            categories,
            difficulty_levels,
        })
    }

    /// Load the built-in programming catalog
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let store = Self::new(file.topics, file.categories, file.difficulty_levels)?;
        debug!("Knowledge catalog loaded: {} topics", store.len());
        Ok(store)
    }

    /// Load a catalog file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// All topics in catalog order
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Find a topic by id
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Human label for a category key, falling back to the key itself
    pub fn category_label<'a>(&'a self, category: &'a str) -> &'a str {
        self.categories
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }

    /// Human label for a difficulty level
    pub fn difficulty_label(&self, difficulty: Difficulty) -> &str {
        self.difficulty_levels
            .get(difficulty.as_str())
            .map(String::as_str)
            .unwrap_or(difficulty.as_str())
    }

    /// Category keys in order of first appearance among the topics
    pub fn categories_in_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = Vec::new();
        for topic in &self.topics {
            if !ordered.contains(&topic.category.as_str()) {
                ordered.push(topic.category.as_str());
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let store = KnowledgeStore::builtin().unwrap();
        assert_eq!(store.len(), 8);
        assert_eq!(store.topics()[0].id, "variables");
        assert_eq!(store.get("arrays").unwrap().title, "Arrays and Lists");
    }

    #[test]
    fn test_category_labels() {
        let store = KnowledgeStore::builtin().unwrap();
        assert_eq!(
            store.category_label("data-structures"),
            "Ways to organize and store data"
        );
        assert_eq!(store.category_label("unknown"), "unknown");
        assert_eq!(
            store.difficulty_label(Difficulty::Beginner),
            "Suitable for those new to programming"
        );
    }

    #[test]
    fn test_categories_in_order() {
        let store = KnowledgeStore::builtin().unwrap();
        assert_eq!(
            store.categories_in_order(),
            vec!["fundamentals", "control-flow", "data-structures", "oop", "advanced"]
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"topics":[
            {"id":"a","title":"A","description":"","difficulty":"beginner","category":"x"},
            {"id":"a","title":"B","description":"","difficulty":"beginner","category":"x"}
        ]}"#;
        let err = KnowledgeStore::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate topic id"));
    }

    #[test]
    fn test_missing_topic() {
        let store = KnowledgeStore::builtin().unwrap();
        assert!(store.get("recursion").is_none());
    }
}
