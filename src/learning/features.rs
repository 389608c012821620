//! Feature Extractor: behavioral features for a (progress, topic) pair
//!
//! Seven features, each computed independently and each falling back to a
//! neutral default when progress or catalog data is missing. Extraction never
//! fails.

use crate::knowledge::{Difficulty, KnowledgeStore, Topic};
use crate::progress::UserProgress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of model inputs
pub const FEATURE_COUNT: usize = 7;

/// Value used when a feature has nothing to describe
pub const NEUTRAL: f64 = 0.5;

/// Named model inputs, in weight-array order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    TopicFrequency,
    TopicDifficulty,
    TopicCategory,
    TimeSpent,
    QuestionsPerTopic,
    LearningPathSequence,
    TopicSimilarity,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::TopicFrequency,
        Feature::TopicDifficulty,
        Feature::TopicCategory,
        Feature::TimeSpent,
        Feature::QuestionsPerTopic,
        Feature::LearningPathSequence,
        Feature::TopicSimilarity,
    ];

    /// Position in the weight array
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable name used in persisted blobs
    pub fn name(self) -> &'static str {
        match self {
            Feature::TopicFrequency => "topic_frequency",
            Feature::TopicDifficulty => "topic_difficulty",
            Feature::TopicCategory => "topic_category",
            Feature::TimeSpent => "time_spent",
            Feature::QuestionsPerTopic => "questions_per_topic",
            Feature::LearningPathSequence => "learning_path_sequence",
            Feature::TopicSimilarity => "topic_similarity",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seven-dimensional feature vector
///
/// Missing fields in a stored blob deserialize as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    pub topic_frequency: f64,
    pub topic_difficulty: f64,
    pub topic_category: f64,
    /// Raw question count, deliberately left unnormalized
    pub time_spent: f64,
    pub questions_per_topic: f64,
    pub learning_path_sequence: f64,
    pub topic_similarity: f64,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::TopicFrequency => self.topic_frequency,
            Feature::TopicDifficulty => self.topic_difficulty,
            Feature::TopicCategory => self.topic_category,
            Feature::TimeSpent => self.time_spent,
            Feature::QuestionsPerTopic => self.questions_per_topic,
            Feature::LearningPathSequence => self.learning_path_sequence,
            Feature::TopicSimilarity => self.topic_similarity,
        }
    }

    /// Values in weight-array order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        Feature::ALL.map(|f| self.get(f))
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            topic_frequency: values[0],
            topic_difficulty: values[1],
            topic_category: values[2],
            time_spent: values[3],
            questions_per_topic: values[4],
            learning_path_sequence: values[5],
            topic_similarity: values[6],
        }
    }

    /// Vector with every feature set to `value`
    pub fn splat(value: f64) -> Self {
        Self::from_array([value; FEATURE_COUNT])
    }
}

/// Category weight shared by topics in the same category
const SAME_CATEGORY_WEIGHT: f64 = 0.6;
/// Difficulty weight shared by topics at the same level
const SAME_DIFFICULTY_WEIGHT: f64 = 0.4;

/// Derives feature vectors from progress and the catalog
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    category_encoding: HashMap<String, f64>,
}

impl FeatureExtractor {
    /// Create an extractor with the standard category ordinals
    pub fn new() -> Self {
        let category_encoding = [
            ("fundamentals", 0.2),
            ("control-flow", 0.4),
            ("data-structures", 0.6),
            ("oop", 0.8),
            ("advanced", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self { category_encoding }
    }

    /// Replace the category ordinal table
    pub fn with_category_encoding(mut self, encoding: HashMap<String, f64>) -> Self {
        self.category_encoding = encoding;
        self
    }

    /// Extract features for `topic_id`, or aggregate features when `None`
    pub fn extract(
        &self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
        topic_id: Option<&str>,
    ) -> FeatureVector {
        let topic = topic_id.and_then(|id| knowledge.get(id));

        FeatureVector {
            topic_frequency: self.topic_frequency(progress, knowledge, topic_id),
            topic_difficulty: topic
                .map(|t| difficulty_encoding(t.difficulty))
                .unwrap_or(NEUTRAL),
            topic_category: topic
                .and_then(|t| self.category_encoding.get(&t.category).copied())
                .unwrap_or(NEUTRAL),
            time_spent: progress.total_questions as f64,
            questions_per_topic: questions_per_topic(progress),
            learning_path_sequence: learning_path_sequence(progress, knowledge, topic_id),
            topic_similarity: topic
                .map(|t| topic_similarity(progress, knowledge, t))
                .unwrap_or(NEUTRAL),
        }
    }

    fn topic_frequency(
        &self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
        topic_id: Option<&str>,
    ) -> f64 {
        match topic_id {
            Some(id) => progress.questions_for(id) as f64,
            None => {
                if knowledge.is_empty() {
                    return 0.0;
                }
                let asked: u64 = progress
                    .topics
                    .values()
                    .map(|p| p.questions_asked as u64)
                    .sum();
                asked as f64 / knowledge.len() as f64
            }
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordinal encoding of a difficulty level
pub fn difficulty_encoding(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Beginner => 0.33,
        Difficulty::Intermediate => 0.66,
        Difficulty::Advanced => 1.0,
    }
}

fn questions_per_topic(progress: &UserProgress) -> f64 {
    let explored = progress.explored_count();
    if explored == 0 {
        return 0.0;
    }
    progress.total_questions as f64 / explored as f64
}

/// Relative position of a topic in the order the user explored topics
fn learning_path_sequence(
    progress: &UserProgress,
    knowledge: &KnowledgeStore,
    topic_id: Option<&str>,
) -> f64 {
    let mut order: Vec<(&str, i64)> = progress
        .topics
        .iter()
        .map(|(id, p)| {
            let at = p.last_asked.map(|t| t.timestamp_millis()).unwrap_or(0);
            (id.as_str(), at)
        })
        .collect();
    // Stable: never-asked topics and equal timestamps stay in id order
    order.sort_by_key(|&(_, at)| at);

    match topic_id {
        Some(id) => match order.iter().position(|&(explored, _)| explored == id) {
            Some(index) => (index + 1) as f64 / order.len().max(1) as f64,
            None => NEUTRAL,
        },
        None => order.len() as f64 / knowledge.len().max(1) as f64,
    }
}

/// Mean category/difficulty overlap between `topic` and explored topics
fn topic_similarity(progress: &UserProgress, knowledge: &KnowledgeStore, topic: &Topic) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;

    for explored in progress.topics.keys().filter_map(|id| knowledge.get(id)) {
        if explored.category == topic.category {
            total += SAME_CATEGORY_WEIGHT;
        }
        if explored.difficulty == topic.difficulty {
            total += SAME_DIFFICULTY_WEIGHT;
        }
        count += 1;
    }

    if count == 0 {
        NEUTRAL
    } else {
        total / count as f64
    }
}
