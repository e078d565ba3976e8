//! Keyword-overlap intent heuristic.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::error::Result;
use crate::ml::intent_classifier::classifier::IntentModel;
use crate::ml::intent_classifier::templates::intent_keywords;
use crate::ml::intent_classifier::types::{Intent, IntentPrediction, IntentProbability};

/// Scores each intent by the fraction of its keywords present in the message.
///
/// The fraction is multiplied by `overlap_multiplier` and capped at 1, so a
/// message hitting half of an intent's keywords is already fully confident
/// with the default multiplier of 2.
pub struct KeywordIntentModel {
    overlap_multiplier: f64,
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for KeywordIntentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordIntentModel")
            .field("overlap_multiplier", &self.overlap_multiplier)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl KeywordIntentModel {
    /// Create a new keyword-overlap model.
    pub fn new(overlap_multiplier: f64, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            overlap_multiplier,
            analyzer,
        }
    }

    /// Overlap score for every intent, best first. Ties keep declaration order.
    pub fn scores(&self, text: &str) -> Result<Vec<IntentProbability>> {
        let terms = self.analyzer.terms(text)?;
        let padded = format!(" {} ", terms.join(" "));

        let mut scores: Vec<IntentProbability> = Intent::ALL
            .iter()
            .map(|&intent| {
                let keywords = intent_keywords(intent);
                let matched = keywords
                    .iter()
                    .filter(|keyword| padded.contains(&format!(" {keyword} ")))
                    .count();
                let overlap = matched as f64 / keywords.len() as f64;
                IntentProbability {
                    intent,
                    probability: (overlap * self.overlap_multiplier).min(1.0),
                }
            })
            .collect();

        // Stable sort keeps declaration order among equal scores.
        scores.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(scores)
    }
}

impl IntentModel for KeywordIntentModel {
    fn predict(&self, text: &str) -> Result<IntentPrediction> {
        let ranked = self.scores(text)?;
        let best = ranked[0].clone();

        Ok(IntentPrediction {
            intent: best.intent,
            confidence: best.probability,
            ranked,
        })
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::SimpleAnalyzer;

    fn model() -> KeywordIntentModel {
        KeywordIntentModel::new(2.0, Arc::new(SimpleAnalyzer::new()))
    }

    #[test]
    fn test_overlap_score() {
        // 2 of 7 pricing keywords: 2/7 * 2
        let prediction = model().predict("what does the plan cost").unwrap();
        assert_eq!(prediction.intent, Intent::Pricing);
        assert!((prediction.confidence - 4.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_multi_word_keywords_match_whole_words() {
        let prediction = model().predict("Thank you, bye!").unwrap();
        assert_eq!(prediction.intent, Intent::Goodbye);

        // "hi" must not match inside "this"
        let scores = model().scores("this").unwrap();
        assert!(scores.iter().all(|s| s.probability == 0.0));
    }

    #[test]
    fn test_score_is_capped() {
        let prediction = model()
            .predict("hello hi hey greetings good morning")
            .unwrap();
        assert_eq!(prediction.intent, Intent::Greeting);
        assert_eq!(prediction.confidence, 1.0);
    }
}
