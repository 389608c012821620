//! Per-user query history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One past query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub time: DateTime<Utc>,
}

/// Bounded list of past queries, oldest first
///
/// Stored as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query, dropping the oldest entries beyond `limit`
    pub fn push(&mut self, query: &str, time: DateTime<Utc>, limit: usize) {
        self.entries.push(HistoryEntry {
            query: query.to_string(),
            time,
        });
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
    }

    /// Up to `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
