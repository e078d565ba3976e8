//! The blended intent classifier and its helpers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, SimpleAnalyzer, StandardAnalyzer};
use crate::error::{ChatscoreError, Result};
use crate::ml::RunningMean;
use crate::ml::intent_classifier::classifier::IntentModel;
use crate::ml::intent_classifier::keyword_classifier::KeywordIntentModel;
use crate::ml::intent_classifier::naive_bayes::NaiveBayesIntentModel;
use crate::ml::intent_classifier::templates::synthesize_samples;
use crate::ml::intent_classifier::types::{DecisionMethod, Intent, IntentResult, IntentSample};

/// Load additional training data from a JSON file (`[{"text", "intent"}]`).
pub fn load_training_data<P: AsRef<Path>>(path: P) -> Result<Vec<IntentSample>> {
    let content = std::fs::read_to_string(path)?;
    let samples: Vec<IntentSample> = serde_json::from_str(&content)?;
    Ok(samples)
}

/// Configuration for intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntentConfig {
    /// Model confidence above which the naive Bayes intent is trusted.
    pub model_confidence_threshold: f64,
    /// Multiplier applied to the keyword overlap fraction.
    pub keyword_overlap_multiplier: f64,
    /// Synthetic sentences generated per keyword.
    pub templates_per_keyword: usize,
    /// Laplace smoothing for the naive Bayes model.
    pub smoothing: f64,
    /// Number of ranked probabilities returned.
    pub top_k: usize,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            model_confidence_threshold: 0.6,
            keyword_overlap_multiplier: 2.0,
            templates_per_keyword: 5,
            smoothing: 1.0,
            top_k: 3,
        }
    }
}

impl IntentConfig {
    /// Validate ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.model_confidence_threshold) {
            return Err(ChatscoreError::invalid_config(
                "modelConfidenceThreshold must be within [0, 1]",
            ));
        }
        if self.templates_per_keyword == 0 {
            return Err(ChatscoreError::invalid_config(
                "templatesPerKeyword must be at least 1",
            ));
        }
        if self.keyword_overlap_multiplier <= 0.0 {
            return Err(ChatscoreError::invalid_config(
                "keywordOverlapMultiplier must be positive",
            ));
        }
        Ok(())
    }
}

/// Running counters exposed through pipeline analytics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentStats {
    pub total_classified: u64,
    pub distribution: BTreeMap<Intent, u64>,
    pub average_confidence: RunningMean,
}

/// Blends a naive Bayes model with a keyword-overlap heuristic.
///
/// The model is trained once at construction and never retrained.
pub struct IntentClassifier {
    config: IntentConfig,
    model: Box<dyn IntentModel>,
    keywords: Box<dyn IntentModel>,
    stats: Mutex<IntentStats>,
}

impl std::fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .field("keywords", &self.keywords.name())
            .finish()
    }
}

impl IntentClassifier {
    /// Train on synthetic keyword templates.
    pub fn new(config: IntentConfig) -> Result<Self> {
        Self::with_samples(config, Vec::new())
    }

    /// Train on synthetic templates plus caller-supplied samples.
    pub fn with_samples(config: IntentConfig, extra_samples: Vec<IntentSample>) -> Result<Self> {
        config.validate()?;

        let mut samples = synthesize_samples(config.templates_per_keyword);
        samples.extend(extra_samples);

        let model = NaiveBayesIntentModel::train(
            &samples,
            Arc::new(StandardAnalyzer::new()),
            config.smoothing,
        )?;
        let keywords = KeywordIntentModel::new(
            config.keyword_overlap_multiplier,
            Arc::new(SimpleAnalyzer::new()) as Arc<dyn Analyzer>,
        );

        Ok(Self::from_models(config, Box::new(model), Box::new(keywords)))
    }

    /// Assemble a classifier from already-built models.
    pub fn from_models(
        config: IntentConfig,
        model: Box<dyn IntentModel>,
        keywords: Box<dyn IntentModel>,
    ) -> Self {
        Self {
            config,
            model,
            keywords,
            stats: Mutex::new(IntentStats::default()),
        }
    }

    /// Classify a message.
    pub fn classify(&self, message: &str) -> Result<IntentResult> {
        let model = self.model.predict(message)?;
        let keyword = self.keywords.predict(message)?;

        // The model also wins when no keyword matched at all, since an empty
        // keyword result carries no intent.
        let (intent, method) = if model.confidence > self.config.model_confidence_threshold
            || keyword.confidence == 0.0
        {
            (model.intent, DecisionMethod::NaiveBayes)
        } else {
            (keyword.intent, DecisionMethod::Keyword)
        };
        let confidence = model.confidence.max(keyword.confidence).clamp(0.0, 1.0);

        let probabilities = model
            .ranked
            .into_iter()
            .take(self.config.top_k)
            .collect();

        debug!(
            "intent: {intent} via {method:?} (model {:.3}, keyword {:.3})",
            model.confidence, keyword.confidence
        );

        self.record(intent, confidence);

        Ok(IntentResult {
            intent,
            confidence,
            probabilities,
            suggested_action: intent.suggested_action().to_string(),
            urgency_level: intent.urgency(),
            method,
        })
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> IntentStats {
        self.stats.lock().clone()
    }

    /// Reset the running statistics.
    pub fn reset_stats(&self) {
        *self.stats.lock() = IntentStats::default();
    }

    fn record(&self, intent: Intent, confidence: f64) {
        let mut stats = self.stats.lock();
        stats.total_classified += 1;
        *stats.distribution.entry(intent).or_insert(0) += 1;
        stats.average_confidence.push(confidence);
    }
}
