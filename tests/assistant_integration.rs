//! Integration tests for the assistant session
//!
//! Full question flow over in-memory and file-backed stores.

use chrono::{TimeZone, Utc};
use codesensei::config::Config;
use codesensei::storage::{
    history_key, FileStore, KeyValueStore, MemoryStore, LEARNER_KEY, PROGRESS_KEY,
};
use codesensei::{QueryStatus, Sensei};
use tempfile::TempDir;

fn seeded_config() -> Config {
    let mut config = Config::default();
    config.learning.seed = Some(5);
    config
}

#[test]
fn test_question_flow_end_to_end() {
    let mut sensei = Sensei::from_config(&seeded_config(), MemoryStore::new(), "ada").unwrap();

    let outcome = sensei.handle_query("What is a for loop?");
    assert_eq!(outcome.status, QueryStatus::Answered);
    assert_eq!(outcome.best_topic(), Some("loops"));
    assert!(outcome.response.contains("## Loops"));
    assert!(outcome.response.contains("### Examples:"));
    assert_eq!(outcome.recommendations.len(), 3);

    assert_eq!(sensei.progress().total_questions, 1);
    assert_eq!(sensei.progress().questions_for("loops"), 1);
    assert_eq!(sensei.learner().example_count(), 1);

    let store = sensei.store();
    assert!(store.get(PROGRESS_KEY).unwrap().is_some());
    assert!(store.get(LEARNER_KEY).unwrap().is_some());
    assert!(store.get(&history_key("ada")).unwrap().is_some());
}

#[test]
fn test_corrupt_state_is_replaced_with_defaults() {
    let mut store = MemoryStore::new();
    store.set(PROGRESS_KEY, "not json at all").unwrap();
    store.set(LEARNER_KEY, "{\"trainingData\": 42}").unwrap();
    store.set(&history_key("guest"), "[{").unwrap();

    let mut sensei = Sensei::from_config(&seeded_config(), store, "guest").unwrap();
    assert_eq!(sensei.progress().total_questions, 0);
    assert_eq!(sensei.learner().example_count(), 0);
    assert!(sensei.history(10).is_empty());

    let outcome = sensei.handle_query("arrays");
    assert_eq!(outcome.status, QueryStatus::Answered);
    assert_eq!(sensei.progress().questions_for("arrays"), 1);
    assert_eq!(sensei.history(10).len(), 1);
}

#[test]
fn test_array_questions_shape_insights() {
    let mut sensei = Sensei::from_config(&seeded_config(), MemoryStore::new(), "guest").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();

    for question in ["How do arrays work?", "What is a list?", "Explain arrays"] {
        let outcome = sensei.handle_query_at(question, now);
        assert_eq!(outcome.best_topic(), Some("arrays"), "query '{}'", question);
    }

    let insights = sensei.insights();
    assert_eq!(insights.learning_style, "data-structures");
    assert_eq!(insights.preferred_difficulty, "beginner");
    assert!(insights.strengths.contains(&"Arrays and Lists".to_string()));
    assert!(!insights.areas_for_growth.is_empty());
}

#[test]
fn test_file_store_persists_across_sessions() {
    let temp = TempDir::new().unwrap();
    let config = seeded_config();
    let day1 = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
    let day2 = Utc.with_ymd_and_hms(2024, 6, 4, 10, 0, 0).unwrap();

    {
        let store = FileStore::new(temp.path()).unwrap();
        let mut sensei = Sensei::from_config(&config, store, "ada").unwrap();
        sensei.handle_query_at("functions", day1);
        sensei.feedback("functions", true).unwrap();
    }

    let store = FileStore::new(temp.path()).unwrap();
    let mut sensei = Sensei::from_config(&config, store, "ada").unwrap();
    assert_eq!(sensei.progress().questions_for("functions"), 1);
    assert_eq!(sensei.learner().example_count(), 2);
    assert!(sensei.learner().is_initialized());

    sensei.handle_query_at("functions", day2);
    assert_eq!(sensei.progress().streak, 2);

    let history = sensei.history(5);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].time, day2);
}

#[test]
fn test_history_is_per_user() {
    let temp = TempDir::new().unwrap();
    let config = seeded_config();

    let mut ada = Sensei::from_config(&config, FileStore::new(temp.path()).unwrap(), "ada").unwrap();
    ada.handle_query("loops");

    let grace =
        Sensei::from_config(&config, FileStore::new(temp.path()).unwrap(), "grace").unwrap();
    assert!(grace.history(10).is_empty());
    assert_eq!(ada.history(10).len(), 1);
}

#[test]
fn test_history_limit_from_config() {
    let mut config = seeded_config();
    config.assistant.history_limit = 2;
    let mut sensei = Sensei::from_config(&config, MemoryStore::new(), "guest").unwrap();

    for question in ["loops", "arrays", "classes"] {
        sensei.handle_query(question);
    }

    let queries: Vec<String> = sensei.history(10).into_iter().map(|e| e.query).collect();
    assert_eq!(queries, vec!["classes".to_string(), "arrays".to_string()]);
}

#[test]
fn test_scope_gate_can_be_disabled() {
    let mut config = seeded_config();
    let mut strict = Sensei::from_config(&config, MemoryStore::new(), "guest").unwrap();
    assert_eq!(
        strict.handle_query("Tell me a joke").status,
        QueryStatus::OffTopic
    );
    assert_eq!(strict.progress().total_questions, 0);

    config.assistant.restrict_to_it = false;
    let mut open = Sensei::from_config(&config, MemoryStore::new(), "guest").unwrap();
    assert_eq!(open.handle_query("Tell me a joke").status, QueryStatus::NoMatch);
}
