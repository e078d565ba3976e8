//! Lexicon-based sentiment, emotion and urgency scoring.
//!
//! The polarity score is the sum of AFINN-style word weights divided by the
//! number of tokens, clamped to `[-1, 1]`. Emotion and urgency detection are
//! plain keyword lookups over the same tokens.
//!
//! # Example
//!
//! ```
//! use chatscore::ml::sentiment::{SentimentClass, SentimentConfig, SentimentScorer, Emotion};
//!
//! let scorer = SentimentScorer::new(SentimentConfig::default()).unwrap();
//! let result = scorer.analyze("I HATE THIS!!!! worst service ever").unwrap();
//!
//! assert_eq!(result.classification, SentimentClass::Negative);
//! assert!(result.emotions[&Emotion::Anger].detected);
//! ```

mod lexicon;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, SimpleAnalyzer};
use crate::error::{ChatscoreError, Result};
use crate::ml::RunningMean;

use lexicon::{NEGATORS, POLARITY_LEXICON, URGENCY_TIERS, emotion_keywords};

/// Configuration for sentiment scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SentimentConfig {
    /// Scores strictly above this are positive.
    pub positive_threshold: f64,
    /// Scores strictly below this are negative.
    pub negative_threshold: f64,
    /// Confidence added per matched emotion keyword.
    pub emotion_match_weight: f64,
    /// Shortest token allowed to match inside a longer emotion keyword.
    pub min_reverse_match_len: usize,
    /// Confidence reported when an urgency keyword hits.
    pub urgency_hit_confidence: f64,
    /// Confidence reported for the default medium urgency.
    pub urgency_default_confidence: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.2,
            negative_threshold: -0.2,
            emotion_match_weight: 0.3,
            min_reverse_match_len: 4,
            urgency_hit_confidence: 0.8,
            urgency_default_confidence: 0.5,
        }
    }
}

impl SentimentConfig {
    /// Validate threshold ordering.
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.negative_threshold)
            || !(-1.0..=1.0).contains(&self.positive_threshold)
            || self.negative_threshold > self.positive_threshold
        {
            return Err(ChatscoreError::invalid_config(format!(
                "sentiment thresholds must satisfy -1 <= negative ({}) <= positive ({}) <= 1",
                self.negative_threshold, self.positive_threshold
            )));
        }
        Ok(())
    }
}

/// Polarity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

/// Emotion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Anger,
    Sadness,
    Fear,
    Surprise,
    Frustration,
}

impl Emotion {
    /// Every emotion category, in reporting order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Anger,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Frustration,
    ];
}

/// Urgency levels, shared with intent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

/// Detection outcome for one emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSignal {
    pub detected: bool,
    pub confidence: f64,
    pub keywords: Vec<String>,
}

/// Urgency estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urgency {
    pub level: UrgencyLevel,
    pub confidence: f64,
}

/// Result of scoring one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    /// Polarity in `[-1, 1]`.
    pub score: f64,
    pub classification: SentimentClass,
    pub emotions: BTreeMap<Emotion, EmotionSignal>,
    pub urgency: Urgency,
}

/// Running counters exposed through pipeline analytics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentStats {
    pub total_analyzed: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub emotion_counts: BTreeMap<Emotion, u64>,
    pub average_score: RunningMean,
}

/// Lexicon-based sentiment scorer.
pub struct SentimentScorer {
    config: SentimentConfig,
    analyzer: Arc<dyn Analyzer>,
    stats: Mutex<SentimentStats>,
}

impl std::fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("config", &self.config)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl SentimentScorer {
    /// Create a scorer using the simple (lowercase-only) analyzer.
    pub fn new(config: SentimentConfig) -> Result<Self> {
        Self::with_analyzer(config, Arc::new(SimpleAnalyzer::new()))
    }

    /// Create a scorer with a custom analyzer.
    ///
    /// The analyzer should not drop tokens, otherwise scores are normalized
    /// by a shorter message than the user wrote.
    pub fn with_analyzer(config: SentimentConfig, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            analyzer,
            stats: Mutex::new(SentimentStats::default()),
        })
    }

    /// Score a single message and fold it into the running statistics.
    pub fn analyze(&self, message: &str) -> Result<SentimentResult> {
        let tokens = self.analyzer.terms(message)?;

        let score = self.polarity(&tokens);
        let classification = self.classify(score);
        let emotions = self.detect_emotions(&tokens);
        let urgency = self.detect_urgency(&tokens);

        debug!(
            "sentiment: score={score:.3} class={classification:?} tokens={}",
            tokens.len()
        );

        self.record(score, classification, &emotions);

        Ok(SentimentResult {
            score,
            classification,
            emotions,
            urgency,
        })
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> SentimentStats {
        self.stats.lock().clone()
    }

    /// Reset the running statistics.
    pub fn reset_stats(&self) {
        *self.stats.lock() = SentimentStats::default();
    }

    fn polarity(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }

        let mut total = 0i32;
        for (i, token) in tokens.iter().enumerate() {
            if let Some(&weight) = POLARITY_LEXICON.get(token.as_str()) {
                let negated = i > 0 && NEGATORS.contains(&tokens[i - 1].as_str());
                total += if negated { -weight } else { weight };
            }
        }

        (total as f64 / tokens.len() as f64).clamp(-1.0, 1.0)
    }

    fn classify(&self, score: f64) -> SentimentClass {
        if score > self.config.positive_threshold {
            SentimentClass::Positive
        } else if score < self.config.negative_threshold {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }

    fn detect_emotions(&self, tokens: &[String]) -> BTreeMap<Emotion, EmotionSignal> {
        let min_len = self.config.min_reverse_match_len;

        Emotion::ALL
            .iter()
            .map(|&emotion| {
                let keywords: Vec<String> = emotion_keywords(emotion)
                    .iter()
                    .filter(|keyword| {
                        tokens.iter().any(|token| {
                            token.contains(*keyword)
                                || (token.chars().count() >= min_len && keyword.contains(token.as_str()))
                        })
                    })
                    .map(|keyword| keyword.to_string())
                    .collect();

                let confidence =
                    (keywords.len() as f64 * self.config.emotion_match_weight).min(1.0);
                let signal = EmotionSignal {
                    detected: !keywords.is_empty(),
                    confidence,
                    keywords,
                };
                (emotion, signal)
            })
            .collect()
    }

    fn detect_urgency(&self, tokens: &[String]) -> Urgency {
        // Padded so multi-word phrases match on whole-word boundaries.
        let padded = format!(" {} ", tokens.join(" "));

        for (level, keywords) in URGENCY_TIERS {
            if keywords
                .iter()
                .any(|keyword| padded.contains(&format!(" {keyword} ")))
            {
                return Urgency {
                    level: *level,
                    confidence: self.config.urgency_hit_confidence,
                };
            }
        }

        Urgency {
            level: UrgencyLevel::Medium,
            confidence: self.config.urgency_default_confidence,
        }
    }

    fn record(
        &self,
        score: f64,
        classification: SentimentClass,
        emotions: &BTreeMap<Emotion, EmotionSignal>,
    ) {
        let mut stats = self.stats.lock();
        stats.total_analyzed += 1;
        match classification {
            SentimentClass::Positive => stats.positive += 1,
            SentimentClass::Neutral => stats.neutral += 1,
            SentimentClass::Negative => stats.negative += 1,
        }
        for (emotion, signal) in emotions {
            if signal.detected {
                *stats.emotion_counts.entry(*emotion).or_insert(0) += 1;
            }
        }
        stats.average_score.push(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(SentimentConfig::default()).unwrap()
    }

    #[test]
    fn test_angry_message_is_negative() {
        let result = scorer().analyze("I HATE THIS!!!! worst service ever").unwrap();

        assert_eq!(result.classification, SentimentClass::Negative);
        assert_eq!(result.score, -1.0);
        let anger = &result.emotions[&Emotion::Anger];
        assert!(anger.detected);
        assert!(anger.keywords.contains(&"hate".to_string()));
        assert!((anger.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_positive_message() {
        let result = scorer().analyze("Thanks, great support!").unwrap();
        assert_eq!(result.classification, SentimentClass::Positive);
        assert!(result.score > 0.2);
        assert!(result.emotions[&Emotion::Joy].detected);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = scorer().analyze("this is good").unwrap();
        let negated = scorer().analyze("this is not good").unwrap();
        assert!(plain.score > 0.0);
        assert!(negated.score < 0.0);
    }

    #[test]
    fn test_empty_message() {
        let result = scorer().analyze("").unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.classification, SentimentClass::Neutral);
        assert!(result.emotions.values().all(|e| !e.detected));
        assert_eq!(result.urgency.level, UrgencyLevel::Medium);
        assert_eq!(result.urgency.confidence, 0.5);
    }

    #[test]
    fn test_score_bounds_and_thresholds() {
        let scorer = scorer();
        let messages = [
            "awesome amazing wonderful",
            "terrible",
            "ok then",
            "the product is fine but shipping was slow",
            "scam scam scam fraud",
            "!!!",
        ];
        for message in messages {
            let result = scorer.analyze(message).unwrap();
            assert!((-1.0..=1.0).contains(&result.score));
            let expected = if result.score > 0.2 {
                SentimentClass::Positive
            } else if result.score < -0.2 {
                SentimentClass::Negative
            } else {
                SentimentClass::Neutral
            };
            assert_eq!(result.classification, expected, "{message}");
        }
    }

    #[test]
    fn test_urgency_priority() {
        let scorer = scorer();
        let high = scorer.analyze("no rush but the site is down").unwrap();
        assert_eq!(high.urgency.level, UrgencyLevel::High);

        let low = scorer.analyze("no rush, just wondering about plans").unwrap();
        assert_eq!(low.urgency.level, UrgencyLevel::Low);

        let medium = scorer.analyze("please reply today").unwrap();
        assert_eq!(medium.urgency.level, UrgencyLevel::Medium);
        assert_eq!(medium.urgency.confidence, 0.8);
    }

    #[test]
    fn test_short_tokens_do_not_match_inside_keywords() {
        // "mad" is a keyword; "a" must not match "mad" through reverse containment.
        let result = scorer().analyze("a b c").unwrap();
        assert!(!result.emotions[&Emotion::Anger].detected);
    }

    #[test]
    fn test_stats_accumulate() {
        let scorer = scorer();
        scorer.analyze("great").unwrap();
        scorer.analyze("terrible").unwrap();
        scorer.analyze("hello").unwrap();

        let stats = scorer.stats();
        assert_eq!(stats.total_analyzed, 3);
        assert_eq!(stats.positive, 1);
        assert_eq!(stats.negative, 1);
        assert_eq!(stats.neutral, 1);
        assert_eq!(stats.average_score.count(), 3);

        scorer.reset_stats();
        assert_eq!(scorer.stats().total_analyzed, 0);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let config = SentimentConfig {
            positive_threshold: -0.5,
            negative_threshold: 0.5,
            ..Default::default()
        };
        assert!(SentimentScorer::new(config).is_err());
    }
}
