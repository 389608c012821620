//! Assistant session: scope gate plus query orchestration
//!
//! Components:
//! - Scope: programming/IT relevance check for incoming queries
//! - Sensei: answers queries, tracks progress and feeds the learner

pub mod scope;
pub mod sensei;

pub use scope::{is_it_query, is_programming_query};
pub use sensei::{QueryOutcome, QueryStatus, Sensei, GUEST_USER};
