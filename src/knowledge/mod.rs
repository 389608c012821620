//! Knowledge catalog
//!
//! Static set of programming topics the assistant can explain.
//!
//! Components:
//! - Types: Topic, Example, Difficulty
//! - Store: immutable catalog with category and difficulty labels
//! - Render: Markdown rendering of a topic for display

pub mod render;
pub mod store;
pub mod types;

pub use render::{code_language, render_topic, CodeLanguage};
pub use store::KnowledgeStore;
pub use types::{Difficulty, Example, Topic};
