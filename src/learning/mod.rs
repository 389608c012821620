//! Adaptive topic recommendations
//!
//! Implements a small supervised learner that personalizes which topics the
//! assistant suggests next.
//!
//! Components:
//! - Features: 7-dimensional behavioral feature vectors
//! - Model: logistic linear unit with online gradient descent
//! - Recommender: ranked, explained suggestions and learning insights

pub mod features;
pub mod model;
pub mod recommender;

pub use features::{Feature, FeatureExtractor, FeatureVector, FEATURE_COUNT};
pub use model::{
    train_step, LearnerConfig, LearnerSnapshot, LinearRecommender, Model, TrainingExample,
    TrainingReport,
};
pub use recommender::{
    LearningInsights, Recommendation, RecommendationConfig, RecommendationReason,
    RecommendationService,
};
