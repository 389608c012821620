//! Sensei: one user's assistant session
//!
//! Owns the catalog, the ranker, the recommendation service and the user's
//! progress, and persists state to a key-value store after every change.
//! Storage failures while answering are logged and swallowed.

use crate::assistant::scope::is_it_query;
use crate::config::{AssistantConfig, Config};
use crate::errors::{Result, SenseiError};
use crate::knowledge::{render_topic, KnowledgeStore};
use crate::learning::{
    LearnerSnapshot, LearningInsights, LinearRecommender, Recommendation, RecommendationService,
    TrainingReport,
};
use crate::progress::UserProgress;
use crate::search::{Lexicon, QueryNormalizer, SearchMatch, SearchRanker};
use crate::storage::{
    history_key, load_or_default, save_json, HistoryEntry, KeyValueStore, QueryHistory,
    LEARNER_KEY, PROGRESS_KEY,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// User name used when none is given
pub const GUEST_USER: &str = "guest";

const EMPTY_MESSAGE: &str = "Ask me about a programming concept to get started.";

const OFF_TOPIC_MESSAGE: &str = "I can help with IT topics: programming, web, databases, \
networking, operating systems, cloud/DevOps, and cybersecurity. Please ask an IT-related question.";

const NO_MATCH_MESSAGE: &str = "I'm not sure I understand that question. Could you try asking \
about programming concepts like variables, loops, functions, arrays, or objects? I'm here to \
help you learn programming fundamentals!";

/// How a query was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Best match rendered and progress recorded
    Answered,
    /// In scope, but no topic scored above zero
    NoMatch,
    /// Rejected by the topic-scope gate
    OffTopic,
    /// Blank input
    Empty,
}

/// Result of handling one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub query: String,
    pub status: QueryStatus,
    pub matches: Vec<SearchMatch>,
    pub recommendations: Vec<Recommendation>,
    /// Markdown answer or a guidance message
    pub response: String,
}

impl QueryOutcome {
    fn message(query: &str, status: QueryStatus, response: &str) -> Self {
        Self {
            query: query.to_string(),
            status,
            matches: Vec::new(),
            recommendations: Vec::new(),
            response: response.to_string(),
        }
    }

    /// Topic id of the best match, if any
    pub fn best_topic(&self) -> Option<&str> {
        self.matches.first().map(|m| m.topic.id.as_str())
    }
}

/// Assistant session bound to one user and one store
pub struct Sensei<S: KeyValueStore> {
    knowledge: KnowledgeStore,
    ranker: SearchRanker,
    service: RecommendationService,
    progress: UserProgress,
    settings: AssistantConfig,
    store: S,
    user: String,
}

impl<S: KeyValueStore> Sensei<S> {
    /// Build a session from explicit parts, restoring persisted state from `store`
    pub fn new(
        knowledge: KnowledgeStore,
        ranker: SearchRanker,
        config: &Config,
        store: S,
        user: &str,
    ) -> Self {
        let progress: UserProgress = load_or_default(&store, PROGRESS_KEY);
        let snapshot: LearnerSnapshot = load_or_default(&store, LEARNER_KEY);
        let learner = LinearRecommender::from_snapshot(config.learning.learner(), snapshot);
        let service =
            RecommendationService::new(learner, config.learning.recommendations());

        let user = if user.trim().is_empty() {
            GUEST_USER.to_string()
        } else {
            user.trim().to_string()
        };

        debug!(
            "Session for '{}': {} questions, {} training examples",
            user,
            progress.total_questions,
            service.learner().example_count()
        );

        Self {
            knowledge,
            ranker,
            service,
            progress,
            settings: config.assistant.clone(),
            store,
            user,
        }
    }

    /// Build a session from configuration, loading catalog and lexicon overrides
    pub fn from_config(config: &Config, store: S, user: &str) -> Result<Self> {
        if config.search.max_results == 0 {
            return Err(SenseiError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if config.assistant.history_limit == 0 {
            return Err(SenseiError::Config(
                "assistant.history_limit must be at least 1".to_string(),
            ));
        }

        let knowledge = match &config.assistant.catalog_path {
            Some(path) => KnowledgeStore::from_path(path)?,
            None => KnowledgeStore::builtin()?,
        };
        let lexicon = match &config.search.lexicon_path {
            Some(path) => Lexicon::from_path(path)?,
            None => Lexicon::default(),
        };
        let ranker = SearchRanker::new(QueryNormalizer::new(&lexicon))
            .with_max_results(config.search.max_results);

        info!("Loaded {} topics", knowledge.len());
        Ok(Self::new(knowledge, ranker, config, store, user))
    }

    /// Built-in catalog and default settings
    pub fn with_defaults(store: S) -> Result<Self> {
        Self::from_config(&Config::default(), store, GUEST_USER)
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn learner(&self) -> &LinearRecommender {
        self.service.learner()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Answer a query now
    pub fn handle_query(&mut self, raw: &str) -> QueryOutcome {
        self.handle_query_at(raw, Utc::now())
    }

    /// Answer a query as if asked at `now`
    pub fn handle_query_at(&mut self, raw: &str, now: DateTime<Utc>) -> QueryOutcome {
        let query = raw.trim();
        if query.is_empty() {
            return QueryOutcome::message(query, QueryStatus::Empty, EMPTY_MESSAGE);
        }

        self.record_history(query, now);

        if self.settings.restrict_to_it && !is_it_query(query) {
            debug!("Rejected off-topic query: {}", query);
            return QueryOutcome::message(query, QueryStatus::OffTopic, OFF_TOPIC_MESSAGE);
        }

        let matches = self.ranker.search(query, &self.knowledge);
        let Some(best) = matches.first() else {
            info!("No topic matched '{}'", query);
            return QueryOutcome::message(query, QueryStatus::NoMatch, NO_MATCH_MESSAGE);
        };

        let topic_id = best.topic.id.clone();
        let response = render_topic(&best.topic);
        info!("Answered '{}' with '{}' (score {})", query, topic_id, best.score);

        self.progress.record_question(&topic_id, now);
        self.persist_progress();

        self.service
            .learn_from_interaction(&self.progress, &self.knowledge, &topic_id, true);
        self.service
            .update_from_behavior(&self.progress, &self.knowledge);
        let recommendations = self.service.recommend(&self.progress, &self.knowledge);
        self.persist_learner();

        QueryOutcome {
            query: query.to_string(),
            status: QueryStatus::Answered,
            matches,
            recommendations,
            response,
        }
    }

    /// Explicit judgement on a topic's answer
    ///
    /// Fails only for unknown topics; a failed save is logged.
    pub fn feedback(&mut self, topic_id: &str, helpful: bool) -> Result<Option<TrainingReport>> {
        if self.knowledge.get(topic_id).is_none() {
            return Err(SenseiError::Catalog(format!("Unknown topic: {}", topic_id)));
        }

        let report =
            self.service
                .learn_from_interaction(&self.progress, &self.knowledge, topic_id, helpful);
        self.persist_learner();
        Ok(report)
    }

    /// Top `top_n` recommendations, or the configured default count
    pub fn recommendations(&mut self, top_n: Option<usize>) -> Vec<Recommendation> {
        let recommendations = match top_n {
            Some(n) => self
                .service
                .get_recommendations(&self.progress, &self.knowledge, n),
            None => self.service.recommend(&self.progress, &self.knowledge),
        };
        self.persist_learner();
        recommendations
    }

    pub fn insights(&mut self) -> LearningInsights {
        let insights = self
            .service
            .learning_insights(&self.progress, &self.knowledge);
        self.persist_learner();
        insights
    }

    /// Past queries, newest first
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let history: QueryHistory = load_or_default(&self.store, &history_key(&self.user));
        history.recent(limit).into_iter().cloned().collect()
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.store.remove(&history_key(&self.user))?;
        info!("Cleared query history for '{}'", self.user);
        Ok(())
    }

    /// Forget progress, model and training log
    pub fn reset(&mut self) -> Result<()> {
        self.progress = UserProgress::default();
        self.service.learner_mut().reset();
        self.store.remove(PROGRESS_KEY)?;
        self.store.remove(LEARNER_KEY)?;
        info!("Reset progress and learner state");
        Ok(())
    }

    /// Persist progress and learner state
    pub fn save(&mut self) -> Result<()> {
        save_json(&mut self.store, PROGRESS_KEY, &self.progress)?;
        save_json(&mut self.store, LEARNER_KEY, &self.service.learner().snapshot())?;
        Ok(())
    }

    fn record_history(&mut self, query: &str, now: DateTime<Utc>) {
        let key = history_key(&self.user);
        let mut history: QueryHistory = load_or_default(&self.store, &key);
        history.push(query, now, self.settings.history_limit);
        if let Err(e) = save_json(&mut self.store, &key, &history) {
            warn!("Failed to save query history: {}", e);
        }
    }

    fn persist_progress(&mut self) {
        if let Err(e) = save_json(&mut self.store, PROGRESS_KEY, &self.progress) {
            warn!("Failed to save progress: {}", e);
        }
    }

    fn persist_learner(&mut self) {
        let snapshot = self.service.learner().snapshot();
        if let Err(e) = save_json(&mut self.store, LEARNER_KEY, &snapshot) {
            warn!("Failed to save learner state: {}", e);
        }
    }
}
