//! Heuristic scoring components for chatbot conversations.
//!
//! Per-message scorers ([`sentiment`], [`intent_classifier`], [`anomaly`]) are
//! orchestrated by [`pipeline::MLPipeline`]; [`churn`], [`recommendation`]
//! and [`clustering`] are invoked independently for dashboard and batch work.
//!
//! Everything here is deterministic rule and weight scoring. The intent
//! classifier's naive Bayes model and the clusterer's TF-IDF model are fitted
//! in-process on the data they are given; there are no pretrained weights.

pub mod anomaly;
pub mod churn;
pub mod clustering;
pub mod intent_classifier;
pub mod pipeline;
pub mod recommendation;
pub mod sentiment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied context accompanying an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    /// Sender identifier. Per-user checks are skipped without one.
    #[serde(default)]
    pub user_id: Option<String>,
    /// When the message was sent. Missing timestamps resolve to "now".
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Sentiment already computed by the caller, used by the abuse check.
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    /// Request IP differs from the account's usual IP.
    #[serde(default)]
    pub ip_mismatch: bool,
    /// Messages sent by this user in the last 24 hours.
    #[serde(default)]
    pub messages_last_24h: Option<u32>,
    /// Coarse location (country or city) of the request.
    #[serde(default)]
    pub location: Option<String>,
}

impl Default for MessageContext {
    fn default() -> Self {
        Self {
            user_id: None,
            timestamp: Utc::now(),
            sentiment_score: None,
            ip_mismatch: false,
            messages_last_24h: None,
            location: None,
        }
    }
}

impl MessageContext {
    /// Context for a known user at the given time.
    pub fn for_user<S: Into<String>>(user_id: S, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            timestamp,
            ..Default::default()
        }
    }
}

/// Incrementally updated arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    /// Fold a new observation into the mean.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// Current mean (0.0 before any observation).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Number of observations folded in.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
