//! Recommendation Service: ranked, explained topic suggestions
//!
//! Runs the feature extractor and the linear recommender over every
//! candidate topic, and turns user interactions into training examples.

use crate::knowledge::{KnowledgeStore, Topic};
use crate::learning::features::{FeatureExtractor, FeatureVector};
use crate::learning::model::{LearnerConfig, LinearRecommender, TrainingReport};
use crate::progress::UserProgress;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Topics with at least this many questions are no longer recommended
const WELL_EXPLORED_QUESTIONS: u32 = 3;

/// Explored topics with at least this many questions yield implicit positives
const IMPLICIT_POSITIVE_QUESTIONS: u32 = 2;

/// Topics with at least this many questions count as strengths
const STRENGTH_QUESTIONS: u32 = 3;

const MAX_STRENGTHS: usize = 3;

/// Recommendation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Default list length
    pub top_n: usize,
    /// Multiplier on topic similarity added to the model confidence
    pub similarity_bonus: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            similarity_bonus: 0.2,
        }
    }
}

/// Why a topic was suggested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    SimilarToExplored,
    BeginnerFriendly,
    AdvancingLevel,
    NaturalNextStep,
    ContinueLearning,
    LearningPattern,
}

impl fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RecommendationReason::SimilarToExplored => "Similar to topics you've explored",
            RecommendationReason::BeginnerFriendly => "Beginner-friendly",
            RecommendationReason::AdvancingLevel => "Matches your advancing level",
            RecommendationReason::NaturalNextStep => "Natural next step in your learning path",
            RecommendationReason::ContinueLearning => "You've started this - continue learning",
            RecommendationReason::LearningPattern => "Based on your learning pattern",
        };
        f.write_str(text)
    }
}

/// Reason rules, applied in order; every rule that fires is kept
pub fn explain(features: &FeatureVector, explored: bool) -> Vec<RecommendationReason> {
    let mut reasons = Vec::new();

    if features.topic_similarity > 0.6 {
        reasons.push(RecommendationReason::SimilarToExplored);
    }
    if features.topic_difficulty < 0.4 {
        reasons.push(RecommendationReason::BeginnerFriendly);
    } else if features.topic_difficulty > 0.7 {
        reasons.push(RecommendationReason::AdvancingLevel);
    }
    if features.learning_path_sequence < 0.5 {
        reasons.push(RecommendationReason::NaturalNextStep);
    }
    if explored && features.topic_frequency < 2.0 {
        reasons.push(RecommendationReason::ContinueLearning);
    }

    if reasons.is_empty() {
        reasons.push(RecommendationReason::LearningPattern);
    }
    reasons
}

/// One suggested topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub topic: Topic,
    /// Ranking key: confidence plus similarity bonus
    pub score: f64,
    /// Raw model prediction
    pub confidence: f64,
    pub reasons: Vec<RecommendationReason>,
}

impl Recommendation {
    /// Human-readable reason line
    pub fn reason(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Summary of what the user has been learning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsights {
    /// Most explored category key, or "balanced"
    pub learning_style: String,
    /// Most explored difficulty key
    pub preferred_difficulty: String,
    pub recommended_next_steps: Vec<Recommendation>,
    pub strengths: Vec<String>,
    /// Labels of categories with no explored topic
    pub areas_for_growth: Vec<String>,
}

impl Default for LearningInsights {
    fn default() -> Self {
        Self {
            learning_style: "balanced".to_string(),
            preferred_difficulty: "beginner".to_string(),
            recommended_next_steps: Vec::new(),
            strengths: Vec::new(),
            areas_for_growth: Vec::new(),
        }
    }
}

/// Orchestrates feature extraction and the learner
pub struct RecommendationService {
    extractor: FeatureExtractor,
    learner: LinearRecommender,
    config: RecommendationConfig,
}

impl RecommendationService {
    /// Create a service around an existing learner
    pub fn new(learner: LinearRecommender, config: RecommendationConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            learner,
            config,
        }
    }

    /// Create a service with a fresh learner
    pub fn with_learner_config(learner: LearnerConfig, config: RecommendationConfig) -> Self {
        Self::new(LinearRecommender::new(learner), config)
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn learner(&self) -> &LinearRecommender {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut LinearRecommender {
        &mut self.learner
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Ranked recommendations using the configured list length
    pub fn recommend(
        &mut self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
    ) -> Vec<Recommendation> {
        self.get_recommendations(progress, knowledge, self.config.top_n)
    }

    /// Top `top_n` topics the user has not yet explored in depth
    pub fn get_recommendations(
        &mut self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
        top_n: usize,
    ) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = knowledge
            .topics()
            .iter()
            .filter(|topic| progress.questions_for(&topic.id) < WELL_EXPLORED_QUESTIONS)
            .map(|topic| {
                let features = self.extractor.extract(progress, knowledge, Some(&topic.id));
                let confidence = self.learner.predict(&features);
                let score = confidence + self.config.similarity_bonus * features.topic_similarity;

                Recommendation {
                    topic: topic.clone(),
                    score,
                    confidence,
                    reasons: explain(&features, progress.is_explored(&topic.id)),
                }
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(top_n);
        recommendations
    }

    /// Record an explicit or implicit judgement about a topic
    pub fn learn_from_interaction(
        &mut self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
        topic_id: &str,
        was_helpful: bool,
    ) -> Option<TrainingReport> {
        let features = self.extractor.extract(progress, knowledge, Some(topic_id));
        let label = u8::from(was_helpful);
        let feedback = if was_helpful { None } else { Some(-1) };
        debug!("Interaction on '{}' labelled {}", topic_id, label);
        self.learner.add_training_example(features, label, feedback)
    }

    /// Implicit positives for every topic the user keeps coming back to
    ///
    /// Returns the number of examples added.
    pub fn update_from_behavior(
        &mut self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
    ) -> usize {
        let mut added = 0;
        for (topic_id, topic_progress) in &progress.topics {
            if topic_progress.questions_asked >= IMPLICIT_POSITIVE_QUESTIONS {
                let features = self.extractor.extract(progress, knowledge, Some(topic_id));
                self.learner.add_training_example(features, 1, None);
                added += 1;
            }
        }
        if added > 0 {
            debug!("Added {} implicit positive examples", added);
        }
        added
    }

    /// Aggregate view of the user's learning so far
    pub fn learning_insights(
        &mut self,
        progress: &UserProgress,
        knowledge: &KnowledgeStore,
    ) -> LearningInsights {
        let explored: Vec<&Topic> = knowledge
            .topics()
            .iter()
            .filter(|t| progress.is_explored(&t.id))
            .collect();

        if explored.is_empty() {
            return LearningInsights::default();
        }

        let learning_style = mode(explored.iter().map(|t| t.category.as_str()))
            .unwrap_or("balanced")
            .to_string();
        let preferred_difficulty = mode(explored.iter().map(|t| t.difficulty.as_str()))
            .unwrap_or("beginner")
            .to_string();

        let strengths = explored
            .iter()
            .filter(|t| progress.questions_for(&t.id) >= STRENGTH_QUESTIONS)
            .map(|t| t.title.clone())
            .take(MAX_STRENGTHS)
            .collect();

        let areas_for_growth = knowledge
            .categories_in_order()
            .into_iter()
            .filter(|category| !explored.iter().any(|t| t.category == *category))
            .map(|category| knowledge.category_label(category).to_string())
            .collect();

        LearningInsights {
            learning_style,
            preferred_difficulty,
            recommended_next_steps: self.recommend(progress, knowledge),
            strengths,
            areas_for_growth,
        }
    }
}

/// Most frequent value; the earliest one wins ties
///
/// Counts are compared strictly, so a later value never displaces an
/// earlier one with the same count. Reducing with `>=` would pick the later.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn service() -> RecommendationService {
        RecommendationService::with_learner_config(
            LearnerConfig {
                seed: Some(42),
                ..LearnerConfig::default()
            },
            RecommendationConfig::default(),
        )
    }

    fn ask(progress: &mut UserProgress, topic: &str, times: u32) {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        for _ in 0..times {
            progress.record_question(topic, at);
        }
    }

    #[test]
    fn test_recommendations_exclude_well_explored() {
        let kb = KnowledgeStore::builtin().unwrap();
        let mut progress = UserProgress::new();
        ask(&mut progress, "loops", 3);

        let mut svc = service();
        let recs = svc.get_recommendations(&progress, &kb, 10);

        assert_eq!(recs.len(), 7);
        assert!(recs.iter().all(|r| r.topic.id != "loops"));
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_score_adds_similarity_bonus() {
        let kb = KnowledgeStore::builtin().unwrap();
        let progress = UserProgress::new();

        let mut svc = service();
        for rec in svc.get_recommendations(&progress, &kb, 3) {
            // Nothing explored: similarity is neutral
            assert!((rec.score - (rec.confidence + 0.2 * 0.5)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_recommendations_idempotent() {
        let kb = KnowledgeStore::builtin().unwrap();
        let mut progress = UserProgress::new();
        ask(&mut progress, "variables", 1);

        let mut svc = service();
        let first = svc.get_recommendations(&progress, &kb, 3);
        let second = svc.get_recommendations(&progress, &kb, 3);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_reason_rules() {
        let mut features = FeatureVector::splat(0.5);
        assert_eq!(
            explain(&features, false),
            vec![RecommendationReason::LearningPattern]
        );

        features.topic_similarity = 0.8;
        features.topic_difficulty = 0.33;
        features.learning_path_sequence = 0.2;
        features.topic_frequency = 1.0;
        assert_eq!(
            explain(&features, true),
            vec![
                RecommendationReason::SimilarToExplored,
                RecommendationReason::BeginnerFriendly,
                RecommendationReason::NaturalNextStep,
                RecommendationReason::ContinueLearning,
            ]
        );

        features.topic_difficulty = 1.0;
        assert!(explain(&features, false).contains(&RecommendationReason::AdvancingLevel));
    }

    #[test]
    fn test_reason_line_joins() {
        let kb = KnowledgeStore::builtin().unwrap();
        let rec = Recommendation {
            topic: kb.get("loops").unwrap().clone(),
            score: 0.6,
            confidence: 0.5,
            reasons: vec![
                RecommendationReason::BeginnerFriendly,
                RecommendationReason::NaturalNextStep,
            ],
        };
        assert_eq!(
            rec.reason(),
            "Beginner-friendly, Natural next step in your learning path"
        );
    }

    #[test]
    fn test_update_from_behavior_counts_repeat_topics() {
        let kb = KnowledgeStore::builtin().unwrap();
        let mut progress = UserProgress::new();
        ask(&mut progress, "loops", 2);
        ask(&mut progress, "arrays", 1);
        ask(&mut progress, "classes", 4);

        let mut svc = service();
        assert_eq!(svc.update_from_behavior(&progress, &kb), 2);
        assert_eq!(svc.learner().example_count(), 2);
    }

    #[test]
    fn test_negative_interaction_labels_zero() {
        let kb = KnowledgeStore::builtin().unwrap();
        let progress = UserProgress::new();

        let mut svc = service();
        svc.learn_from_interaction(&progress, &kb, "loops", false);
        let example = svc.learner().examples().next().unwrap();
        assert_eq!(example.label, 0);
        assert_eq!(example.feedback, Some(-1));
    }

    #[test]
    fn test_insights_defaults_when_nothing_explored() {
        let kb = KnowledgeStore::builtin().unwrap();
        let mut svc = service();
        let insights = svc.learning_insights(&UserProgress::new(), &kb);
        assert_eq!(insights, LearningInsights::default());
    }

    #[test]
    fn test_insights_for_arrays_learner() {
        let kb = KnowledgeStore::builtin().unwrap();
        let mut progress = UserProgress::new();
        ask(&mut progress, "arrays", 3);

        let mut svc = service();
        let insights = svc.learning_insights(&progress, &kb);

        assert_eq!(insights.learning_style, "data-structures");
        assert_eq!(insights.preferred_difficulty, "beginner");
        assert_eq!(insights.strengths, vec!["Arrays and Lists".to_string()]);
        assert_eq!(insights.areas_for_growth.len(), 4);
        assert!(insights
            .areas_for_growth
            .contains(&"Object-oriented programming concepts".to_string()));
        assert_eq!(insights.recommended_next_steps.len(), 3);
    }

    #[test]
    fn test_mode_prefers_first_on_tie() {
        let values = ["oop", "fundamentals", "fundamentals", "oop"];
        assert_eq!(mode(values.into_iter()), Some("oop"));
        assert_eq!(mode(std::iter::empty()), None);
    }
}
