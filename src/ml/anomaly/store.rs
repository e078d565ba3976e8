//! Per-user state used by the behavioral checks.
//!
//! The detector never owns this state directly: it goes through a
//! [`UserStateStore`], so deployments can back it with something shared
//! across processes. [`InMemoryUserStore`] is the default.

use std::collections::{BTreeSet, HashMap, VecDeque};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// One remembered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

/// What one message tells us about a user's activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityObservation {
    /// Hour of day, 0..=23.
    pub hour: u32,
    pub daily_messages: Option<f64>,
    pub location: Option<String>,
}

/// Learned per-user baseline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBaseline {
    pub active_hours: BTreeSet<u32>,
    /// Exponential moving average of messages per day.
    pub avg_daily_messages: f64,
    pub locations: BTreeSet<String>,
}

impl UserBaseline {
    /// Baseline seeded from a first observation.
    pub fn from_observation(observation: &ActivityObservation) -> Self {
        let mut baseline = Self {
            avg_daily_messages: observation.daily_messages.unwrap_or(0.0),
            ..Default::default()
        };
        baseline.active_hours.insert(observation.hour);
        if let Some(location) = &observation.location {
            baseline.locations.insert(location.clone());
        }
        baseline
    }

    /// Fold an observation in. The volume average moves by `alpha` towards
    /// the observed value.
    pub fn observe(&mut self, observation: &ActivityObservation, alpha: f64) {
        self.active_hours.insert(observation.hour);
        if let Some(volume) = observation.daily_messages {
            self.avg_daily_messages = (1.0 - alpha) * self.avg_daily_messages + alpha * volume;
        }
        if let Some(location) = &observation.location {
            self.locations.insert(location.clone());
        }
    }
}

/// Storage for message history and activity baselines, keyed by user id.
pub trait UserStateStore: Send + Sync {
    /// Messages remembered for the user, oldest first.
    fn history(&self, user_id: &str) -> Vec<HistoryEntry>;

    /// Append a message to the user's history.
    fn append(&self, user_id: &str, entry: HistoryEntry);

    /// Drop the oldest entries until at most `max_len` remain.
    fn prune(&self, user_id: &str, max_len: usize);

    /// Current baseline, if the user has been seen.
    fn baseline(&self, user_id: &str) -> Option<UserBaseline>;

    /// Fold `observation` into the user's baseline and return the baseline
    /// as it was before, or `None` on first contact (in which case a new
    /// baseline is created from the observation).
    ///
    /// Implementations must perform the read and the update atomically.
    fn record_activity(
        &self,
        user_id: &str,
        observation: &ActivityObservation,
        alpha: f64,
    ) -> Option<UserBaseline>;

    /// Forget everything.
    fn clear(&self);
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    histories: RwLock<HashMap<String, VecDeque<HistoryEntry>>>,
    baselines: Mutex<HashMap<String, UserBaseline>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with remembered history.
    pub fn user_count(&self) -> usize {
        self.histories.read().len()
    }
}

impl UserStateStore for InMemoryUserStore {
    fn history(&self, user_id: &str) -> Vec<HistoryEntry> {
        self.histories
            .read()
            .get(user_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn append(&self, user_id: &str, entry: HistoryEntry) {
        self.histories
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push_back(entry);
    }

    fn prune(&self, user_id: &str, max_len: usize) {
        if let Some(entries) = self.histories.write().get_mut(user_id) {
            while entries.len() > max_len {
                entries.pop_front();
            }
        }
    }

    fn baseline(&self, user_id: &str) -> Option<UserBaseline> {
        self.baselines.lock().get(user_id).cloned()
    }

    fn record_activity(
        &self,
        user_id: &str,
        observation: &ActivityObservation,
        alpha: f64,
    ) -> Option<UserBaseline> {
        let mut baselines = self.baselines.lock();
        match baselines.get_mut(user_id) {
            Some(baseline) => {
                let previous = baseline.clone();
                baseline.observe(observation, alpha);
                Some(previous)
            }
            None => {
                baselines.insert(
                    user_id.to_string(),
                    UserBaseline::from_observation(observation),
                );
                None
            }
        }
    }

    fn clear(&self) {
        self.histories.write().clear();
        self.baselines.lock().clear();
    }
}
