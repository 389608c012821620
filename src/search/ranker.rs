//! Search Ranker: additive lexical scoring of topics against a query
//!
//! Every topic starts at zero and collects points for exact phrase hits,
//! whole-word term hits and substring hits across its title, keywords,
//! description, common questions and examples. Zero-score topics are dropped;
//! the rest are sorted by score with catalog order breaking ties.

use crate::knowledge::{KnowledgeStore, Topic};
use crate::search::normalizer::{NormalizedQuery, QueryNormalizer};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default number of matches returned
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Points awarded per kind of hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub title_exact: u32,
    pub keyword_exact: u32,
    pub id_exact: u32,
    pub title_word: u32,
    pub keyword_word: u32,
    pub title_contains: u32,
    pub keyword_contains: u32,
    pub description_contains: u32,
    pub question_exact: u32,
    pub question_word: u32,
    pub question_contains: u32,
    pub example_title_word: u32,
    pub example_description_word: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title_exact: 60,
            keyword_exact: 60,
            id_exact: 50,
            title_word: 25,
            keyword_word: 30,
            title_contains: 15,
            keyword_contains: 12,
            description_contains: 6,
            question_exact: 40,
            question_word: 15,
            question_contains: 8,
            example_title_word: 5,
            example_description_word: 3,
        }
    }
}

/// A topic matched by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub topic: Topic,
    pub score: u32,
}

/// Whole-word matcher for one expanded term
struct TermPattern<'q> {
    term: &'q str,
    word: Regex,
}

impl<'q> TermPattern<'q> {
    fn compile(term: &'q str) -> Option<Self> {
        let pattern = format!(r"(?i)(?:^|\b){}(?:\b|$)", regex::escape(term));
        match Regex::new(&pattern) {
            Ok(word) => Some(Self { term, word }),
            Err(e) => {
                warn!("Skipping unmatchable term '{}': {}", term, e);
                None
            }
        }
    }
}

/// Lexical ranker over a knowledge catalog
#[derive(Debug, Clone)]
pub struct SearchRanker {
    normalizer: QueryNormalizer,
    weights: ScoreWeights,
    max_results: usize,
}

impl SearchRanker {
    /// Create a ranker with default weights and result limit
    pub fn new(normalizer: QueryNormalizer) -> Self {
        Self {
            normalizer,
            weights: ScoreWeights::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Override the per-hit weights
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Override the number of returned matches
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    /// Rank catalog topics against a free-text query
    ///
    /// Pure function of (query, catalog): no state is touched.
    pub fn search(&self, raw: &str, knowledge: &KnowledgeStore) -> Vec<SearchMatch> {
        let query = self.normalizer.normalize(raw);
        if query.is_empty() {
            return Vec::new();
        }

        let patterns: Vec<TermPattern<'_>> = query
            .terms
            .iter()
            .filter_map(|t| TermPattern::compile(t))
            .collect();

        let mut matches: Vec<SearchMatch> = knowledge
            .topics()
            .iter()
            .filter_map(|topic| {
                let score = self.score_topic(topic, &query, &patterns);
                (score > 0).then(|| SearchMatch {
                    topic: topic.clone(),
                    score,
                })
            })
            .collect();

        // sort_by is stable, so equal scores keep catalog order
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(self.max_results);

        debug!(
            "Query '{}' -> {} terms, {} matches",
            query.phrase,
            query.terms.len(),
            matches.len()
        );

        matches
    }

    /// Score a single topic
    fn score_topic(
        &self,
        topic: &Topic,
        query: &NormalizedQuery,
        patterns: &[TermPattern<'_>],
    ) -> u32 {
        let w = &self.weights;
        let phrase = query.phrase.as_str();
        let title = topic.title.to_lowercase();
        let description = topic.description.to_lowercase();
        let keywords: Vec<String> = topic.keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut score = 0;

        // Exact phrase equality
        if title == phrase {
            score += w.title_exact;
        }
        if keywords.iter().any(|k| k == phrase) {
            score += w.keyword_exact;
        }
        if topic.id.to_lowercase() == phrase {
            score += w.id_exact;
        }

        // Whole-word hits
        for pattern in patterns {
            if pattern.word.is_match(&title) {
                score += w.title_word;
            }
            for keyword in &keywords {
                if pattern.word.is_match(keyword) {
                    score += w.keyword_word;
                }
            }
        }

        // Substring hits
        for pattern in patterns {
            let term = pattern.term;
            if title.contains(term) {
                score += w.title_contains;
            }
            for keyword in &keywords {
                if keyword.contains(term) || term.contains(keyword.as_str()) {
                    score += w.keyword_contains;
                }
            }
            if description.contains(term) {
                score += w.description_contains;
            }
        }

        for question in &topic.common_questions {
            let question = question.to_lowercase();
            if question == phrase {
                score += w.question_exact;
            }
            for pattern in patterns {
                if pattern.word.is_match(&question) {
                    score += w.question_word;
                }
                if question.contains(pattern.term) {
                    score += w.question_contains;
                }
            }
        }

        for example in &topic.examples {
            let example_title = example.title.to_lowercase();
            let example_description = example.description.to_lowercase();
            for pattern in patterns {
                if pattern.word.is_match(&example_title) {
                    score += w.example_title_word;
                }
                if pattern.word.is_match(&example_description) {
                    score += w.example_description_word;
                }
            }
        }

        score
    }
}

impl Default for SearchRanker {
    fn default() -> Self {
        Self::new(QueryNormalizer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_ids(results: &[SearchMatch]) -> Vec<&str> {
        results.iter().map(|m| m.topic.id.as_str()).collect()
    }

    #[test]
    fn test_for_loop_question_ranks_loops_first() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        let results = ranker.search("What is a for loop?", &store);

        assert_eq!(results[0].topic.id, "loops");
        assert!(results[0].score >= 60);
    }

    #[test]
    fn test_empty_and_blank_queries() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        assert!(ranker.search("", &store).is_empty());
        assert!(ranker.search("   ", &store).is_empty());
    }

    #[test]
    fn test_array_and_list_are_synonyms() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        for query in ["array", "list"] {
            let results = ranker.search(query, &store);
            assert_eq!(results[0].topic.title, "Arrays and Lists");
            assert!(results[0].score > 0);
        }
    }

    #[test]
    fn test_results_sorted_and_capped() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        let results = ranker.search("Classes and Object-Oriented Programming", &store);

        assert!(results.len() <= DEFAULT_MAX_RESULTS);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results[0].topic.id, "classes");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        // variables, functions, objects and classes all score 6 here
        let results = ranker.search("What is a for loop?", &store);
        assert_eq!(
            ranked_ids(&results),
            vec!["loops", "variables", "functions", "objects", "classes"]
        );
    }

    #[test]
    fn test_unmatched_query_returns_nothing() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();
        assert!(ranker.search("xyzzy", &store).is_empty());
    }

    #[test]
    fn test_max_results_override() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default().with_max_results(1);
        assert_eq!(ranker.search("array", &store).len(), 1);
    }

    #[test]
    fn test_known_scores() {
        let store = KnowledgeStore::builtin().unwrap();
        let ranker = SearchRanker::default();

        let results = ranker.search("array", &store);
        assert_eq!(ranked_ids(&results), vec!["arrays", "loops", "objects"]);
        assert_eq!(results[0].score, 410);
        assert_eq!(results[1].score, 43);
    }
}
