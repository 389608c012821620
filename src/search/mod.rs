//! Lexical search over the knowledge catalog
//!
//! Components:
//! - Normalizer: query tokenization and synonym expansion driven by a Lexicon
//! - Ranker: additive keyword scoring of every topic

pub mod normalizer;
pub mod ranker;

pub use normalizer::{Lexicon, NormalizedQuery, QueryNormalizer};
pub use ranker::{ScoreWeights, SearchMatch, SearchRanker, DEFAULT_MAX_RESULTS};
