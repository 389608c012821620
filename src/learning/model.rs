//! Linear Recommender: single-layer logistic unit trained online
//!
//! The model is a plain `Copy` value (7 weights plus a bias) and
//! [`train_step`] is a pure transition from one model to the next. The
//! [`LinearRecommender`] owns the current model and the bounded log of
//! training examples.
//!
//! # Training
//!
//! Each pass walks every stored example and nudges the weights immediately:
//! `w_i += lr * (label - p) * x_i`, `bias += lr * (label - p)`. This is online
//! gradient descent on the logistic output, an approximation of logistic
//! regression that is expected to be noisy on small logs.

use crate::learning::features::{Feature, FeatureVector, FEATURE_COUNT};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info};

/// Pre-activation is clamped to this magnitude before the exponential
const ACTIVATION_CLAMP: f64 = 10.0;

/// Initial weights are drawn uniformly from [-INIT_RANGE, INIT_RANGE]
const INIT_RANGE: f64 = 0.05;

/// Mean absolute error below which a training run stops early
const EARLY_STOP_ERROR: f64 = 0.01;

/// Learner hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Maximum passes per training run
    pub epochs: usize,
    pub learning_rate: f64,
    /// Training log capacity (oldest evicted first)
    pub max_examples: usize,
    /// Training is skipped below this many examples
    pub min_examples: usize,
    /// Adding an example retrains once the log holds this many
    pub retrain_threshold: usize,
    /// Fixed RNG seed for reproducible initial weights
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.01,
            max_examples: 1000,
            min_examples: 5,
            retrain_threshold: 10,
            seed: None,
        }
    }
}

/// Linear model weights
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelRecord", into = "ModelRecord")]
pub struct Model {
    pub weights: [f64; FEATURE_COUNT],
    pub bias: f64,
}

impl Model {
    /// Small random weights and bias
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut weights = [0.0; FEATURE_COUNT];
        for weight in weights.iter_mut() {
            *weight = rng.gen_range(-INIT_RANGE..=INIT_RANGE);
        }
        Self {
            weights,
            bias: rng.gen_range(-INIT_RANGE..=INIT_RANGE),
        }
    }

    pub fn weight(&self, feature: Feature) -> f64 {
        self.weights[feature.index()]
    }

    /// Weighted sum plus bias, clamped to the activation range
    ///
    /// Non-finite inputs count as 0 and a NaN sum collapses to 0.
    pub fn activation(&self, features: &FeatureVector) -> f64 {
        let sum: f64 = features
            .to_array()
            .iter()
            .zip(self.weights.iter())
            .map(|(&x, &w)| finite_or_zero(x) * w)
            .sum::<f64>()
            + self.bias;

        if sum.is_nan() {
            0.0
        } else {
            sum.clamp(-ACTIVATION_CLAMP, ACTIVATION_CLAMP)
        }
    }

    /// Relevance score in (0, 1)
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.activation(features))
    }
}

/// Persisted model layout: weights keyed by feature name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ModelRecord {
    weights: BTreeMap<String, f64>,
    biases: BTreeMap<String, f64>,
    /// Reserved; always written empty
    #[serde(rename = "featureImportance")]
    feature_importance: BTreeMap<String, f64>,
}

impl From<ModelRecord> for Model {
    fn from(record: ModelRecord) -> Self {
        let mut weights = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            weights[feature.index()] = record
                .weights
                .get(feature.name())
                .copied()
                .map(finite_or_zero)
                .unwrap_or(0.0);
        }
        let bias = record
            .biases
            .get("base")
            .copied()
            .map(finite_or_zero)
            .unwrap_or(0.0);
        Self { weights, bias }
    }
}

impl From<Model> for ModelRecord {
    fn from(model: Model) -> Self {
        let weights = Feature::ALL
            .iter()
            .map(|f| (f.name().to_string(), model.weights[f.index()]))
            .collect();
        let mut biases = BTreeMap::new();
        biases.insert("base".to_string(), model.bias);
        Self {
            weights,
            biases,
            feature_importance: BTreeMap::new(),
        }
    }
}

/// One labeled observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    /// 1 = worth recommending, 0 = not
    pub label: u8,
    /// Optional explicit rating in {-1, 0, 1}
    #[serde(default)]
    pub feedback: Option<i8>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl TrainingExample {
    pub fn new(features: FeatureVector, label: u8, feedback: Option<i8>) -> Self {
        Self {
            features,
            label: label.min(1),
            feedback: feedback.map(|f| f.clamp(-1, 1)),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Label as a regression target
    pub fn target(&self) -> f64 {
        if self.label > 0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Apply one online gradient step for `example`
///
/// Returns the updated model and the signed error (label - prediction)
/// measured before the update.
pub fn train_step(model: Model, example: &TrainingExample, learning_rate: f64) -> (Model, f64) {
    let error = example.target() - model.predict(&example.features);
    let mut next = model;
    for (weight, x) in next.weights.iter_mut().zip(example.features.to_array()) {
        *weight += learning_rate * error * finite_or_zero(x);
    }
    next.bias += learning_rate * error;
    (next, error)
}

/// Summary of one training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub epochs_run: usize,
    /// Mean absolute error of the last pass
    pub mean_error: f64,
    pub examples: usize,
}

/// Serializable learner state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnerSnapshot {
    pub training_data: Vec<TrainingExample>,
    pub model: Option<Model>,
    pub initialized: bool,
}

/// Online-trained linear recommender
pub struct LinearRecommender {
    config: LearnerConfig,
    /// `None` until the first prediction or training run
    model: Option<Model>,
    examples: VecDeque<TrainingExample>,
    rng: StdRng,
}

impl LinearRecommender {
    /// Create an uninitialized learner
    pub fn new(config: LearnerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            model: None,
            examples: VecDeque::new(),
            rng,
        }
    }

    /// Restore a learner from a persisted snapshot
    ///
    /// Logs longer than the configured capacity keep their newest entries.
    pub fn from_snapshot(config: LearnerConfig, snapshot: LearnerSnapshot) -> Self {
        let mut learner = Self::new(config);
        if snapshot.initialized {
            learner.model = Some(snapshot.model.unwrap_or_default());
        }
        learner.examples = snapshot.training_data.into();
        learner.evict_overflow();
        learner
    }

    /// Capture the current state for persistence
    pub fn snapshot(&self) -> LearnerSnapshot {
        LearnerSnapshot {
            training_data: self.examples.iter().cloned().collect(),
            model: self.model,
            initialized: self.model.is_some(),
        }
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Stored examples, oldest first
    pub fn examples(&self) -> impl Iterator<Item = &TrainingExample> {
        self.examples.iter()
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    /// Drop the model and the training log
    pub fn reset(&mut self) {
        self.model = None;
        self.examples.clear();
    }

    fn ensure_model(&mut self) -> Model {
        match self.model {
            Some(model) => model,
            None => {
                let model = Model::random(&mut self.rng);
                debug!("Initialized recommender weights: {:?}", model);
                self.model = Some(model);
                model
            }
        }
    }

    /// Predict relevance in (0, 1), initializing weights on first use
    pub fn predict(&mut self, features: &FeatureVector) -> f64 {
        self.ensure_model().predict(features)
    }

    /// Train with the configured epochs and learning rate
    pub fn train(&mut self) -> Option<TrainingReport> {
        self.train_with(self.config.epochs, self.config.learning_rate)
    }

    /// Run up to `epochs` online passes over the stored examples
    ///
    /// Returns `None` without touching the model when fewer than
    /// `min_examples` examples are stored.
    pub fn train_with(&mut self, epochs: usize, learning_rate: f64) -> Option<TrainingReport> {
        if self.examples.len() < self.config.min_examples {
            return None;
        }

        let mut model = self.ensure_model();
        let mut epochs_run = 0;
        let mut mean_error = 0.0;

        for _ in 0..epochs {
            let mut total_error = 0.0;
            for example in &self.examples {
                let (next, error) = train_step(model, example, learning_rate);
                model = next;
                total_error += error.abs();
            }
            epochs_run += 1;
            mean_error = total_error / self.examples.len() as f64;
            if mean_error < EARLY_STOP_ERROR {
                break;
            }
        }

        self.model = Some(model);
        info!(
            "Trained recommender on {} examples: {} epochs, mean error {:.4}",
            self.examples.len(),
            epochs_run,
            mean_error
        );

        Some(TrainingReport {
            epochs_run,
            mean_error,
            examples: self.examples.len(),
        })
    }

    /// Append a labeled example, evict beyond capacity, retrain when due
    pub fn add_training_example(
        &mut self,
        features: FeatureVector,
        label: u8,
        feedback: Option<i8>,
    ) -> Option<TrainingReport> {
        self.examples
            .push_back(TrainingExample::new(features, label, feedback));
        self.evict_overflow();

        if self.examples.len() >= self.config.retrain_threshold {
            self.train()
        } else {
            None
        }
    }

    fn evict_overflow(&mut self) {
        while self.examples.len() > self.config.max_examples {
            self.examples.pop_front();
        }
    }
}
