//! Anomaly detection for inbound chat messages.
//!
//! Five independent checks run in parallel and are aggregated into a single
//! [`AnomalyVerdict`]:
//!
//! | check | looks at | threshold |
//! |-------|----------|-----------|
//! | spam | patterns, links, punctuation, caps | 0.5 |
//! | bot | per-user history: repeats, bursts, gibberish, timing | 0.6 |
//! | fraud | sensitive keywords, phishing, IP mismatch | 0.5 |
//! | abuse | profanity, threats, hostile sentiment | 0.6 |
//! | unusual pattern | per-user baseline: hour, volume, location | 0.5 |
//!
//! Severity follows the highest check score; a strong spam hit always blocks.

mod behavior;
mod content;
pub mod store;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatscoreError, Result};
use crate::ml::MessageContext;

pub use store::{ActivityObservation, HistoryEntry, InMemoryUserStore, UserBaseline, UserStateStore};
pub use types::{
    ActionKind, AnomalyCheckResult, AnomalyVerdict, CheckType, RecommendedAction, Severity,
};

/// Configuration for anomaly detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnomalyConfig {
    pub spam_threshold: f64,
    pub bot_threshold: f64,
    pub fraud_threshold: f64,
    pub abuse_threshold: f64,
    pub unusual_threshold: f64,
    /// Spam score above which the message is blocked regardless of severity.
    pub spam_block_score: f64,
    /// Messages remembered per user.
    pub history_capacity: usize,
    /// Identical messages in history that count as repetition.
    pub repeat_count: usize,
    pub rapid_fire_window_ms: u64,
    /// Messages inside the rapid-fire window that count as a burst.
    pub rapid_fire_count: usize,
    /// Share of random-looking words that flags gibberish.
    pub random_text_ratio: f64,
    /// Number of most recent timestamps used for the timing check.
    pub timing_window: usize,
    /// Interval variance (ms²) below which timing looks scripted.
    pub timing_variance_threshold: f64,
    /// Weight of a new observation in the daily volume average.
    pub baseline_alpha: f64,
    /// Volume above `avg × multiplier` is a spike.
    pub volume_spike_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            spam_threshold: 0.5,
            bot_threshold: 0.6,
            fraud_threshold: 0.5,
            abuse_threshold: 0.6,
            unusual_threshold: 0.5,
            spam_block_score: 0.8,
            history_capacity: 100,
            repeat_count: 3,
            rapid_fire_window_ms: 1000,
            rapid_fire_count: 5,
            random_text_ratio: 0.3,
            timing_window: 5,
            timing_variance_threshold: 100.0,
            baseline_alpha: 0.2,
            volume_spike_multiplier: 3.0,
        }
    }
}

impl AnomalyConfig {
    /// Validate ranges.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("spamThreshold", self.spam_threshold),
            ("botThreshold", self.bot_threshold),
            ("fraudThreshold", self.fraud_threshold),
            ("abuseThreshold", self.abuse_threshold),
            ("unusualThreshold", self.unusual_threshold),
            ("spamBlockScore", self.spam_block_score),
            ("randomTextRatio", self.random_text_ratio),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ChatscoreError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.history_capacity == 0 {
            return Err(ChatscoreError::invalid_config(
                "historyCapacity must be at least 1",
            ));
        }
        if !(self.baseline_alpha > 0.0 && self.baseline_alpha <= 1.0) {
            return Err(ChatscoreError::invalid_config(
                "baselineAlpha must be within (0, 1]",
            ));
        }
        if self.timing_window < 2 {
            return Err(ChatscoreError::invalid_config(
                "timingWindow must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Running counters exposed through pipeline analytics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyStats {
    pub total_checked: u64,
    pub anomalies_detected: u64,
    pub by_severity: BTreeMap<Severity, u64>,
    /// Detections per check.
    pub by_check: BTreeMap<CheckType, u64>,
}

impl AnomalyStats {
    /// Share of checked messages that were anomalous.
    pub fn anomaly_rate(&self) -> f64 {
        if self.total_checked == 0 {
            0.0
        } else {
            self.anomalies_detected as f64 / self.total_checked as f64
        }
    }
}

/// Runs the five checks and aggregates a verdict.
pub struct AnomalyDetector {
    config: AnomalyConfig,
    store: Arc<dyn UserStateStore>,
    stats: Mutex<AnomalyStats>,
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnomalyDetector {
    /// Create a detector backed by an in-memory store.
    pub fn new(config: AnomalyConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemoryUserStore::new()))
    }

    /// Create a detector backed by the given store.
    pub fn with_store(config: AnomalyConfig, store: Arc<dyn UserStateStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            stats: Mutex::new(AnomalyStats::default()),
        })
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// The per-user state store.
    pub fn store(&self) -> &Arc<dyn UserStateStore> {
        &self.store
    }

    /// Run every check and aggregate.
    pub fn detect(&self, message: &str, context: &MessageContext) -> AnomalyVerdict {
        let ((spam, fraud), ((abuse, bot), unusual)) = rayon::join(
            || {
                rayon::join(
                    || self.detect_spam(message),
                    || self.detect_fraud(message, context),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || self.detect_abuse(message, context),
                            || self.detect_bot(message, context),
                        )
                    },
                    || self.detect_unusual_pattern(context),
                )
            },
        );

        let verdict = self.aggregate(vec![spam, bot, fraud, abuse, unusual]);
        self.record(&verdict);
        verdict
    }

    pub fn detect_spam(&self, message: &str) -> AnomalyCheckResult {
        content::check_spam(message, self.config.spam_threshold)
    }

    pub fn detect_fraud(&self, message: &str, context: &MessageContext) -> AnomalyCheckResult {
        content::check_fraud(message, context, self.config.fraud_threshold)
    }

    pub fn detect_abuse(&self, message: &str, context: &MessageContext) -> AnomalyCheckResult {
        content::check_abuse(message, context, self.config.abuse_threshold)
    }

    /// Appends the message to the user's history before evaluating it.
    pub fn detect_bot(&self, message: &str, context: &MessageContext) -> AnomalyCheckResult {
        behavior::check_bot(message, context, self.store.as_ref(), &self.config)
    }

    /// Compares against, then updates, the user's activity baseline.
    pub fn detect_unusual_pattern(&self, context: &MessageContext) -> AnomalyCheckResult {
        behavior::check_unusual_pattern(context, self.store.as_ref(), &self.config)
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> AnomalyStats {
        self.stats.lock().clone()
    }

    /// Reset the running statistics. Per-user state is kept.
    pub fn reset_stats(&self) {
        *self.stats.lock() = AnomalyStats::default();
    }

    fn aggregate(&self, checks: Vec<AnomalyCheckResult>) -> AnomalyVerdict {
        let detected = checks.iter().filter(|c| c.detected).count();
        let indicators: usize = checks.iter().map(|c| c.indicators.len()).sum();
        let max_score = checks.iter().map(|c| c.score).fold(0.0, f64::max);

        let severity = Severity::from_score(max_score);
        let strong_spam = checks
            .iter()
            .any(|c| c.check_type == CheckType::Spam && c.detected && c.score > self.config.spam_block_score);
        let action = if strong_spam {
            RecommendedAction::block()
        } else {
            severity.action()
        };

        let confidence = (detected as f64 * 0.3 + indicators as f64 * 0.1).min(1.0);

        AnomalyVerdict {
            anomalous: detected > 0,
            severity,
            action,
            confidence,
            checks,
        }
    }

    fn record(&self, verdict: &AnomalyVerdict) {
        if verdict.anomalous {
            info!(
                "anomaly detected: severity {:?}, action {:?}",
                verdict.severity, verdict.action.action
            );
        } else {
            debug!("no anomaly detected");
        }

        let mut stats = self.stats.lock();
        stats.total_checked += 1;
        *stats.by_severity.entry(verdict.severity).or_insert(0) += 1;
        if verdict.anomalous {
            stats.anomalies_detected += 1;
        }
        for check in verdict.checks.iter().filter(|c| c.detected) {
            *stats.by_check.entry(check.check_type).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(AnomalyConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_message() {
        let detector = detector();
        let verdict = detector.detect("Hi, where can I find my invoices?", &MessageContext::default());

        assert!(!verdict.anomalous);
        assert_eq!(verdict.severity, Severity::None);
        assert_eq!(verdict.action.action, ActionKind::Allow);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.checks.len(), 5);
    }

    #[test]
    fn test_strong_spam_blocks() {
        let detector = detector();
        let verdict = detector.detect(
            "BUY NOW!!! http://a.co http://b.co http://c.co $$$",
            &MessageContext::default(),
        );

        assert!(verdict.anomalous);
        assert_eq!(verdict.severity, Severity::Critical);
        assert_eq!(verdict.action.action, ActionKind::Block);
        assert!(verdict.action.automated);
        assert!(verdict.check(CheckType::Spam).unwrap().detected);
    }

    #[test]
    fn test_fraud_above_threshold_is_high_severity() {
        let detector = detector();
        // Phishing wording plus a sensitive keyword: 0.7, above the fraud threshold.
        let verdict = detector.detect(
            "please confirm your identity and password",
            &MessageContext::default(),
        );
        let fraud = verdict.check(CheckType::Fraud).unwrap();
        assert!(fraud.detected);
        assert!((fraud.score - 0.7).abs() < 1e-9);
        assert_eq!(verdict.severity, Severity::High);
    }

    #[test]
    fn test_medium_severity_needs_a_human() {
        let detector = detector();
        // Two sensitive keywords: 0.6.
        let mild = detector.detect(
            "send me your password and some bitcoin",
            &MessageContext::default(),
        );
        assert_eq!(mild.severity, Severity::Medium);
        assert_eq!(mild.action.action, ActionKind::FlagForReview);
        assert!(!mild.action.automated);
    }

    #[test]
    fn test_bot_burst_through_detector() {
        let detector = detector();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        let mut verdict = None;
        for i in 0..5 {
            let context = MessageContext::for_user(
                "bot-1",
                start + chrono::Duration::milliseconds(i * 200),
            );
            verdict = Some(detector.detect(&format!("message {i}"), &context));
        }

        let verdict = verdict.unwrap();
        assert!(verdict.check(CheckType::Bot).unwrap().detected);
        assert!(verdict.anomalous);
    }

    #[test]
    fn test_confidence_formula() {
        let detector = detector();
        let verdict = detector.detect(
            "BUY NOW!!! http://a.co http://b.co http://c.co $$$",
            &MessageContext::default(),
        );
        // 1 detected check, 4 indicators
        assert!((verdict.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stats() {
        let detector = detector();
        detector.detect("hello", &MessageContext::default());
        detector.detect("BUY NOW!!! $$$ click here", &MessageContext::default());

        let stats = detector.stats();
        assert_eq!(stats.total_checked, 2);
        assert_eq!(stats.anomalies_detected, 1);
        assert_eq!(stats.by_check.get(&CheckType::Spam), Some(&1));
        assert!((stats.anomaly_rate() - 0.5).abs() < 1e-9);

        detector.reset_stats();
        assert_eq!(detector.stats().total_checked, 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = AnomalyConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(AnomalyDetector::new(config).is_err());

        let config = AnomalyConfig {
            spam_threshold: 1.5,
            ..Default::default()
        };
        assert!(AnomalyDetector::new(config).is_err());
    }
}
