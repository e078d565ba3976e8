//! Multinomial naive Bayes intent model.
//!
//! Trained once from labelled samples; prediction returns the posterior
//! distribution normalized with log-sum-exp.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::analysis::analyzer::Analyzer;
use crate::error::{ChatscoreError, Result};
use crate::ml::intent_classifier::classifier::IntentModel;
use crate::ml::intent_classifier::types::{
    Intent, IntentPrediction, IntentProbability, IntentSample,
};

/// Per-intent term statistics.
#[derive(Debug, Clone, Default)]
struct ClassStats {
    documents: usize,
    term_counts: HashMap<String, usize>,
    total_terms: usize,
}

/// Naive Bayes model over analyzed message terms.
pub struct NaiveBayesIntentModel {
    classes: HashMap<Intent, ClassStats>,
    vocabulary_size: usize,
    total_documents: usize,
    /// Additive (Laplace) smoothing.
    alpha: f64,
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for NaiveBayesIntentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaiveBayesIntentModel")
            .field("classes", &self.classes.len())
            .field("vocabulary_size", &self.vocabulary_size)
            .field("total_documents", &self.total_documents)
            .field("alpha", &self.alpha)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl NaiveBayesIntentModel {
    /// Train a model from samples.
    pub fn train(samples: &[IntentSample], analyzer: Arc<dyn Analyzer>, alpha: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(ChatscoreError::training("training samples cannot be empty"));
        }
        if alpha <= 0.0 {
            return Err(ChatscoreError::invalid_config(
                "naive Bayes smoothing must be positive",
            ));
        }

        let mut classes: HashMap<Intent, ClassStats> = HashMap::new();
        let mut vocabulary: std::collections::HashSet<String> = std::collections::HashSet::new();

        for sample in samples {
            let terms = analyzer.terms(&sample.text)?;
            let stats = classes.entry(sample.intent).or_default();
            stats.documents += 1;
            stats.total_terms += terms.len();
            for term in terms {
                *stats.term_counts.entry(term.clone()).or_insert(0) += 1;
                vocabulary.insert(term);
            }
        }

        if vocabulary.is_empty() {
            return Err(ChatscoreError::training(
                "training samples produced an empty vocabulary",
            ));
        }

        debug!(
            "trained naive Bayes intent model: {} samples, {} classes, {} terms",
            samples.len(),
            classes.len(),
            vocabulary.len()
        );

        Ok(Self {
            classes,
            vocabulary_size: vocabulary.len(),
            total_documents: samples.len(),
            alpha,
            analyzer,
        })
    }

    /// Number of distinct terms seen during training.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Posterior probability for every trained intent, best first.
    pub fn distribution(&self, text: &str) -> Result<Vec<IntentProbability>> {
        let terms = self.analyzer.terms(text)?;

        let mut log_scores: Vec<(Intent, f64)> = self
            .classes
            .iter()
            .map(|(intent, stats)| {
                let prior = (stats.documents as f64 / self.total_documents as f64).ln();
                let denominator = stats.total_terms as f64 + self.alpha * self.vocabulary_size as f64;
                let likelihood: f64 = terms
                    .iter()
                    .filter(|term| self.is_known(term))
                    .map(|term| {
                        let count = stats.term_counts.get(term.as_str()).copied().unwrap_or(0);
                        ((count as f64 + self.alpha) / denominator).ln()
                    })
                    .sum();
                (*intent, prior + likelihood)
            })
            .collect();

        let max = log_scores
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let normalizer: f64 = log_scores.iter().map(|(_, s)| (s - max).exp()).sum();

        for (_, score) in log_scores.iter_mut() {
            *score = (*score - max).exp() / normalizer;
        }

        log_scores.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(log_scores
            .into_iter()
            .map(|(intent, probability)| IntentProbability {
                intent,
                probability,
            })
            .collect())
    }

    fn is_known(&self, term: &str) -> bool {
        self.classes
            .values()
            .any(|stats| stats.term_counts.contains_key(term))
    }
}

impl IntentModel for NaiveBayesIntentModel {
    fn predict(&self, text: &str) -> Result<IntentPrediction> {
        let ranked = self.distribution(text)?;
        let best = ranked
            .first()
            .ok_or_else(|| ChatscoreError::training("model has no trained classes"))?;

        Ok(IntentPrediction {
            intent: best.intent,
            confidence: best.probability,
            ranked,
        })
    }

    fn name(&self) -> &str {
        "naive_bayes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StandardAnalyzer;

    fn samples() -> Vec<IntentSample> {
        [
            ("buy a laptop", Intent::Purchase),
            ("order pizza", Intent::Purchase),
            ("purchase book", Intent::Purchase),
            ("hello there", Intent::Greeting),
            ("hi friend", Intent::Greeting),
            ("app is broken", Intent::Support),
            ("login error", Intent::Support),
        ]
        .into_iter()
        .map(|(text, intent)| IntentSample {
            text: text.to_string(),
            intent,
        })
        .collect()
    }

    fn model() -> NaiveBayesIntentModel {
        NaiveBayesIntentModel::train(&samples(), Arc::new(StandardAnalyzer::new()), 1.0).unwrap()
    }

    #[test]
    fn test_predicts_trained_intents() {
        let model = model();
        assert_eq!(model.predict("buy pizza").unwrap().intent, Intent::Purchase);
        assert_eq!(model.predict("hello").unwrap().intent, Intent::Greeting);
        assert_eq!(model.predict("error broken").unwrap().intent, Intent::Support);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let ranked = model().distribution("buy something broken").unwrap();
        let total: f64 = ranked.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_unknown_words_fall_back_to_priors() {
        let ranked = model().distribution("zzz qqq").unwrap();
        // Purchase has the most documents.
        assert_eq!(ranked[0].intent, Intent::Purchase);
        assert!((ranked[0].probability - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_training_rejected() {
        let result = NaiveBayesIntentModel::train(&[], Arc::new(StandardAnalyzer::new()), 1.0);
        assert!(matches!(result, Err(ChatscoreError::Training(_))));
    }
}
