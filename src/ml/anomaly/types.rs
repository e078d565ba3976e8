//! Result types for anomaly detection.

use serde::{Deserialize, Serialize};

/// The five independent anomaly checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    Spam,
    Bot,
    Fraud,
    Abuse,
    UnusualPattern,
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyCheckResult {
    pub check_type: CheckType,
    pub detected: bool,
    /// Score in `[0, 1]`.
    pub score: f64,
    pub indicators: Vec<String>,
}

impl AnomalyCheckResult {
    /// A check that did not run or found nothing.
    pub fn clear(check_type: CheckType) -> Self {
        Self {
            check_type,
            detected: false,
            score: 0.0,
            indicators: Vec::new(),
        }
    }

    /// Build a result from a raw score: clamps, then compares against the
    /// check's threshold (strictly greater).
    pub(crate) fn from_raw(
        check_type: CheckType,
        raw_score: f64,
        threshold: f64,
        indicators: Vec<String>,
    ) -> Self {
        let score = crate::ml::clamp_unit(raw_score);
        Self {
            check_type,
            detected: score > threshold,
            score,
            indicators,
        }
    }
}

/// Aggregate severity, a monotonic function of the highest check score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Map the maximum check score to a severity tier.
    pub fn from_score(max_score: f64) -> Self {
        if max_score > 0.8 {
            Severity::Critical
        } else if max_score > 0.6 {
            Severity::High
        } else if max_score > 0.4 {
            Severity::Medium
        } else if max_score > 0.2 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    /// Fixed action for this severity.
    pub fn action(&self) -> RecommendedAction {
        match self {
            Severity::None => RecommendedAction::new(ActionKind::Allow, "No action needed", true),
            Severity::Low => RecommendedAction::new(
                ActionKind::Monitor,
                "Log the conversation and keep monitoring",
                true,
            ),
            Severity::Medium => RecommendedAction::new(
                ActionKind::FlagForReview,
                "Flag the conversation for human review",
                false,
            ),
            Severity::High => RecommendedAction::new(
                ActionKind::Restrict,
                "Rate-limit the sender and require verification",
                true,
            ),
            Severity::Critical => RecommendedAction::block(),
        }
    }
}

/// What the caller should do with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Allow,
    Monitor,
    FlagForReview,
    Restrict,
    Block,
}

/// A recommended action with a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub action: ActionKind,
    pub description: String,
    /// Whether the platform may apply the action without a human.
    pub automated: bool,
}

impl RecommendedAction {
    fn new(action: ActionKind, description: &str, automated: bool) -> Self {
        Self {
            action,
            description: description.to_string(),
            automated,
        }
    }

    /// The block action, also used for the strong-spam override.
    pub fn block() -> Self {
        Self::new(
            ActionKind::Block,
            "Block the message and suspend the session",
            true,
        )
    }
}

/// Aggregated verdict over all five checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyVerdict {
    /// True when any check detected an anomaly.
    pub anomalous: bool,
    pub severity: Severity,
    pub action: RecommendedAction,
    /// `min(detected × 0.3 + indicators × 0.1, 1)`.
    pub confidence: f64,
    pub checks: Vec<AnomalyCheckResult>,
}

impl AnomalyVerdict {
    /// Look up one check's result.
    pub fn check(&self, check_type: CheckType) -> Option<&AnomalyCheckResult> {
        self.checks.iter().find(|c| c.check_type == check_type)
    }
}
