//! Request and response types of the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ml::MessageContext;
use crate::ml::RunningMean;
use crate::ml::anomaly::{AnomalyStats, AnomalyVerdict};
use crate::ml::churn::ChurnStats;
use crate::ml::clustering::ClusteringStats;
use crate::ml::intent_classifier::{IntentResult, IntentStats};
use crate::ml::recommendation::RecommendationStats;
use crate::ml::sentiment::{SentimentResult, SentimentStats};

/// Settled result of one scorer.
///
/// A failing scorer never discards the results of the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreOutcome<T> {
    Scored(T),
    /// Scorer error or panic, rendered as text.
    Failed(String),
}

impl<T> ScoreOutcome<T> {
    pub fn is_scored(&self) -> bool {
        matches!(self, ScoreOutcome::Scored(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ScoreOutcome::Scored(value) => Some(value),
            ScoreOutcome::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ScoreOutcome::Scored(value) => Some(value),
            ScoreOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            ScoreOutcome::Scored(_) => None,
            ScoreOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// One message of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMessage {
    pub message: String,
    #[serde(default)]
    pub context: MessageContext,
}

impl ScoredMessage {
    pub fn new<S: Into<String>>(message: S, context: MessageContext) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }
}

/// Combined sentiment, intent and anomaly scores for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAnalysis {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub sentiment: ScoreOutcome<SentimentResult>,
    pub intent: ScoreOutcome<IntentResult>,
    pub anomaly: ScoreOutcome<AnomalyVerdict>,
    /// Wall-clock time from dispatch until all three scorers settled.
    pub processing_time_ms: f64,
}

impl MessageAnalysis {
    /// Number of scorers that failed.
    pub fn failures(&self) -> usize {
        [
            self.sentiment.is_scored(),
            self.intent.is_scored(),
            self.anomaly.is_scored(),
        ]
        .iter()
        .filter(|scored| !**scored)
        .count()
    }
}

/// Pipeline-level counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PipelineStats {
    pub messages_analyzed: u64,
    pub failed_scores: u64,
    pub processing_time_ms: RunningMean,
}

/// Snapshot of every component's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub generated_at: DateTime<Utc>,
    pub messages_analyzed: u64,
    /// Individual scorer failures across all analyzed messages.
    pub failed_scores: u64,
    pub average_processing_ms: f64,
    pub sentiment: SentimentStats,
    pub intent: IntentStats,
    pub anomaly: AnomalyStats,
    pub churn: ChurnStats,
    pub recommendation: RecommendationStats,
    pub clustering: ClusteringStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_outcome_accessors() {
        let scored: ScoreOutcome<u32> = ScoreOutcome::Scored(7);
        assert!(scored.is_scored());
        assert_eq!(scored.value(), Some(&7));
        assert_eq!(scored.failure(), None);

        let failed: ScoreOutcome<u32> = ScoreOutcome::Failed("boom".to_string());
        assert!(!failed.is_scored());
        assert_eq!(failed.failure(), Some("boom"));
        assert_eq!(failed.into_value(), None);
    }

    #[test]
    fn test_score_outcome_json() {
        let failed: ScoreOutcome<u32> = ScoreOutcome::Failed("boom".to_string());
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"failed":"boom"}"#
        );
        let scored: ScoreOutcome<u32> = serde_json::from_str(r#"{"scored":3}"#).unwrap();
        assert_eq!(scored, ScoreOutcome::Scored(3));
    }

    #[test]
    fn test_scored_message_context_defaults() {
        let message: ScoredMessage = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(message.message, "hi");
        assert!(message.context.user_id.is_none());
        assert!(!message.context.ip_mismatch);
    }
}
