//! CodeSensei v0.3.0 - Adaptive Programming Tutor
//!
//! Answers beginner programming questions from a curated topic catalog and
//! learns, from the questions a user asks, which topics to suggest next.
//!
//! # Architecture
//!
//! - **Knowledge**: topic catalog and Markdown rendering
//! - **Search**: query normalization and keyword ranking
//! - **Learning**: feature extraction, online logistic model, recommendations
//! - **Assistant**: per-user session tying search, progress and learning together
//! - **Storage / Config / REPL / CLI**: persistence and terminal surface

pub mod errors;

pub mod knowledge;
pub mod progress;
pub mod search;

pub mod learning;

pub mod assistant;
pub mod config;
pub mod storage;

pub mod cli;
pub mod repl;

// Re-export commonly used types
pub use assistant::{QueryOutcome, QueryStatus, Sensei};
pub use errors::{Result, SenseiError};
pub use knowledge::{KnowledgeStore, Topic};
pub use learning::{LearningInsights, Recommendation, RecommendationService};
pub use progress::UserProgress;
pub use search::{SearchMatch, SearchRanker};
