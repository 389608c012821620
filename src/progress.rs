//! Per-user learning progress
//!
//! Mutated only by [`UserProgress::record_question`]; everything else reads it.
//! Serialized in the same camelCase blob layout the assistant has always stored.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Questions on one topic that count as "complete" in progress displays
pub const QUESTIONS_FOR_COMPLETION: u32 = 5;

/// Progress on a single topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicProgress {
    pub questions_asked: u32,
    pub last_asked: Option<DateTime<Utc>>,
}

/// Progress across all topics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    /// Explored topics keyed by topic id
    pub topics: BTreeMap<String, TopicProgress>,
    pub total_questions: u32,
    /// Consecutive active days
    pub streak: u32,
    pub last_active_date: Option<NaiveDate>,
}

impl UserProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered question on `topic_id` at `now`
    ///
    /// Bumps the topic and total counters and advances the daily streak:
    /// same day keeps it, the day after extends it, anything else restarts at 1.
    pub fn record_question(&mut self, topic_id: &str, now: DateTime<Utc>) {
        let entry = self.topics.entry(topic_id.to_string()).or_default();
        entry.questions_asked = entry.questions_asked.saturating_add(1);
        entry.last_asked = Some(now);
        self.total_questions = self.total_questions.saturating_add(1);

        let today = now.date_naive();
        match self.last_active_date {
            Some(last) if last == today => {}
            Some(last) if last + Duration::days(1) == today => {
                self.streak = self.streak.saturating_add(1);
            }
            _ => self.streak = 1,
        }
        self.last_active_date = Some(today);
    }

    /// Questions asked on a topic (0 if unexplored)
    pub fn questions_for(&self, topic_id: &str) -> u32 {
        self.topics
            .get(topic_id)
            .map(|p| p.questions_asked)
            .unwrap_or(0)
    }

    pub fn is_explored(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// Number of distinct explored topics
    pub fn explored_count(&self) -> usize {
        self.topics.len()
    }

    /// Completion percentage for display, capped at 100
    pub fn completion_percent(&self, topic_id: &str) -> f64 {
        let asked = self.questions_for(topic_id) as f64;
        (asked / QUESTIONS_FOR_COMPLETION as f64).min(1.0) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_record_question_counts() {
        let mut progress = UserProgress::new();
        progress.record_question("loops", at(1, 9));
        progress.record_question("loops", at(1, 10));
        progress.record_question("arrays", at(1, 11));

        assert_eq!(progress.questions_for("loops"), 2);
        assert_eq!(progress.questions_for("arrays"), 1);
        assert_eq!(progress.questions_for("classes"), 0);
        assert_eq!(progress.total_questions, 3);
        assert_eq!(progress.explored_count(), 2);
        assert_eq!(progress.topics["loops"].last_asked, Some(at(1, 10)));
    }

    #[test]
    fn test_streak_progression() {
        let mut progress = UserProgress::new();
        progress.record_question("loops", at(1, 9));
        assert_eq!(progress.streak, 1);

        progress.record_question("loops", at(1, 18));
        assert_eq!(progress.streak, 1);

        progress.record_question("loops", at(2, 9));
        assert_eq!(progress.streak, 2);

        // Skipped a day
        progress.record_question("loops", at(4, 9));
        assert_eq!(progress.streak, 1);
    }

    #[test]
    fn test_completion_percent_caps() {
        let mut progress = UserProgress::new();
        for hour in 0..7 {
            progress.record_question("loops", at(1, hour));
        }
        progress.record_question("arrays", at(1, 8));

        assert_eq!(progress.completion_percent("loops"), 100.0);
        assert!((progress.completion_percent("arrays") - 20.0).abs() < 1e-9);
        assert_eq!(progress.completion_percent("classes"), 0.0);
    }

    #[test]
    fn test_blob_layout_is_camel_case() {
        let mut progress = UserProgress::new();
        progress.record_question("loops", at(1, 9));

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["totalQuestions"], 1);
        assert_eq!(json["topics"]["loops"]["questionsAsked"], 1);
        assert!(json.get("lastActiveDate").is_some());
    }

    #[test]
    fn test_partial_blob_uses_defaults() {
        let progress: UserProgress =
            serde_json::from_str(r#"{"topics":{"loops":{"questionsAsked":2}}}"#).unwrap();
        assert_eq!(progress.questions_for("loops"), 2);
        assert_eq!(progress.total_questions, 0);
        assert!(progress.topics["loops"].last_asked.is_none());
    }
}
