//! Churn risk prediction from caller-supplied activity data.
//!
//! Thirteen features are derived from [`UserActivity`]; seven of them feed a
//! weighted risk score in `[0, 100]`. Risk factors come from separate
//! threshold rules and are reported alongside the score, so a user can carry a
//! factor while still scoring low.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatscoreError, Result};
use crate::ml::{RunningMean, clamp_unit};

/// Raw activity data for one user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserActivity {
    /// Missing means "active now".
    pub last_activity_date: Option<DateTime<Utc>>,
    pub sessions_last_30_days: Option<u32>,
    pub messages_last_30_days: Option<u32>,
    pub messages_previous_30_days: Option<u32>,
    pub avg_session_minutes: Option<f64>,
    /// Overrides the engagement score derived from sessions and messages.
    pub engagement_score: Option<f64>,
    pub support_tickets: Option<u32>,
    pub unresolved_tickets: Option<u32>,
    pub plan_downgraded: Option<bool>,
    pub subscription_months: Option<u32>,
    pub monthly_value: Option<f64>,
    /// Survey score in `[0, 1]`.
    pub satisfaction_score: Option<f64>,
    pub failed_payments: Option<u32>,
}

/// Normalized signals derived from [`UserActivity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnFeatures {
    pub days_since_last_activity: f64,
    pub sessions_last_30_days: u32,
    pub messages_last_30_days: u32,
    pub messages_previous_30_days: u32,
    pub avg_session_minutes: f64,
    /// `[0, 1]`
    pub engagement_score: f64,
    pub support_tickets: u32,
    pub unresolved_tickets: u32,
    pub plan_downgraded: bool,
    pub subscription_months: u32,
    pub monthly_value: f64,
    /// `[0, 1]`
    pub satisfaction_score: f64,
    pub failed_payments: u32,
}

impl ChurnFeatures {
    /// Derive features, measuring recency against `now`.
    pub fn extract(activity: &UserActivity, now: DateTime<Utc>) -> Self {
        let days_since_last_activity = activity
            .last_activity_date
            .map(|last| (now - last).num_seconds() as f64 / 86_400.0)
            .unwrap_or(0.0)
            .max(0.0);

        let sessions = activity.sessions_last_30_days.unwrap_or(0);
        let messages = activity.messages_last_30_days.unwrap_or(0);
        let avg_session_minutes = activity.avg_session_minutes.unwrap_or(0.0).max(0.0);

        let engagement_score = clamp_unit(activity.engagement_score.unwrap_or_else(|| {
            (sessions as f64 / 20.0).min(1.0) * 0.5
                + (messages as f64 / 100.0).min(1.0) * 0.3
                + (avg_session_minutes / 15.0).min(1.0) * 0.2
        }));

        Self {
            days_since_last_activity,
            sessions_last_30_days: sessions,
            messages_last_30_days: messages,
            messages_previous_30_days: activity.messages_previous_30_days.unwrap_or(0),
            avg_session_minutes,
            engagement_score,
            support_tickets: activity.support_tickets.unwrap_or(0),
            unresolved_tickets: activity.unresolved_tickets.unwrap_or(0),
            plan_downgraded: activity.plan_downgraded.unwrap_or(false),
            subscription_months: activity.subscription_months.unwrap_or(0),
            monthly_value: activity.monthly_value.unwrap_or(0.0).max(0.0),
            satisfaction_score: clamp_unit(activity.satisfaction_score.unwrap_or(0.7)),
            failed_payments: activity.failed_payments.unwrap_or(0),
        }
    }
}

/// Weights of the seven risk components. Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChurnWeights {
    pub recency: f64,
    pub engagement: f64,
    pub support: f64,
    pub downgrade: f64,
    pub volume: f64,
    pub satisfaction: f64,
    pub payment: f64,
}

impl Default for ChurnWeights {
    fn default() -> Self {
        Self {
            recency: 0.25,
            engagement: 0.20,
            support: 0.15,
            downgrade: 0.15,
            volume: 0.10,
            satisfaction: 0.10,
            payment: 0.05,
        }
    }
}

impl ChurnWeights {
    fn as_array(&self) -> [f64; 7] {
        [
            self.recency,
            self.engagement,
            self.support,
            self.downgrade,
            self.volume,
            self.satisfaction,
            self.payment,
        ]
    }
}

/// Configuration for churn prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChurnConfig {
    pub weights: ChurnWeights,
    /// Inactivity at which recency risk saturates.
    pub recency_horizon_days: f64,
    /// Scores below this are low risk.
    pub medium_risk_score: f64,
    /// Scores at or above this are high risk.
    pub high_risk_score: f64,
    pub inactive_days: f64,
    pub low_engagement: f64,
    pub support_ticket_limit: u32,
    pub low_satisfaction: f64,
    /// Months of future revenue at zero risk.
    pub lifetime_horizon_months: f64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            weights: ChurnWeights::default(),
            recency_horizon_days: 30.0,
            medium_risk_score: 30.0,
            high_risk_score: 60.0,
            inactive_days: 7.0,
            low_engagement: 0.3,
            support_ticket_limit: 3,
            low_satisfaction: 0.5,
            lifetime_horizon_months: 24.0,
        }
    }
}

impl ChurnConfig {
    /// Weights must be non-negative and sum to 1.
    pub fn validate(&self) -> Result<()> {
        let weights = self.weights.as_array();
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ChatscoreError::invalid_config(
                "churn weights must be non-negative",
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ChatscoreError::invalid_config(format!(
                "churn weights must sum to 1.0, got {sum}"
            )));
        }
        if self.medium_risk_score > self.high_risk_score {
            return Err(ChatscoreError::invalid_config(
                "mediumRiskScore must not exceed highRiskScore",
            ));
        }
        if self.recency_horizon_days <= 0.0 {
            return Err(ChatscoreError::invalid_config(
                "recencyHorizonDays must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub factor: String,
    pub severity: FactorSeverity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionStrategy {
    pub priority: String,
    pub actions: Vec<String>,
    pub offer: Option<String>,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeToChurn {
    pub label: String,
    pub min_days: u32,
    /// `None` means open-ended.
    pub max_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeValue {
    /// Revenue already earned.
    pub current: f64,
    /// Expected future revenue, discounted by risk.
    pub projected: f64,
    pub total: f64,
}

/// Per-component risks, each in `[0, 100]` before weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub recency: f64,
    pub engagement: f64,
    pub support: f64,
    pub downgrade: f64,
    pub volume: f64,
    pub satisfaction: f64,
    pub payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnResult {
    pub user_id: String,
    /// `[0, 100]`
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub retention_strategy: RetentionStrategy,
    pub time_to_churn: TimeToChurn,
    pub lifetime_value: LifetimeValue,
    pub breakdown: RiskBreakdown,
    pub features: ChurnFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnStats {
    pub total_predictions: u64,
    pub by_level: BTreeMap<RiskLevel, u64>,
    pub average_risk: RunningMean,
}

/// Weighted churn risk model.
#[derive(Debug)]
pub struct ChurnPredictor {
    config: ChurnConfig,
    stats: Mutex<ChurnStats>,
}

impl ChurnPredictor {
    pub fn new(config: ChurnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: Mutex::new(ChurnStats::default()),
        })
    }

    /// Predict churn risk as of now.
    pub fn predict(&self, user_id: &str, activity: &UserActivity) -> ChurnResult {
        self.predict_at(user_id, activity, Utc::now())
    }

    /// Predict churn risk as of `now`. Identical inputs give identical results.
    pub fn predict_at(
        &self,
        user_id: &str,
        activity: &UserActivity,
        now: DateTime<Utc>,
    ) -> ChurnResult {
        let features = ChurnFeatures::extract(activity, now);
        let breakdown = self.breakdown(&features);
        let risk_score = self.weighted_score(&breakdown);
        let risk_level = self.risk_level(risk_score);
        let risk_factors = self.risk_factors(&features);

        debug!(
            "churn for {user_id}: score {risk_score:.1} ({risk_level:?}), {} factors",
            risk_factors.len()
        );
        self.record(risk_level, risk_score);

        ChurnResult {
            user_id: user_id.to_string(),
            risk_score,
            risk_level,
            risk_factors,
            retention_strategy: retention_strategy(risk_level),
            time_to_churn: time_to_churn(risk_score),
            lifetime_value: self.lifetime_value(&features, risk_score),
            breakdown,
            features,
        }
    }

    pub fn stats(&self) -> ChurnStats {
        self.stats.lock().clone()
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = ChurnStats::default();
    }

    fn breakdown(&self, f: &ChurnFeatures) -> RiskBreakdown {
        let volume = if f.messages_previous_30_days > 0 {
            let previous = f.messages_previous_30_days as f64;
            ((previous - f.messages_last_30_days as f64) / previous).max(0.0) * 100.0
        } else if f.messages_last_30_days == 0 {
            100.0
        } else {
            0.0
        };

        RiskBreakdown {
            recency: (f.days_since_last_activity / self.config.recency_horizon_days).min(1.0)
                * 100.0,
            engagement: (1.0 - f.engagement_score) * 100.0,
            support: ((f.support_tickets as f64 / 5.0).min(1.0) * 0.7
                + (f.unresolved_tickets as f64 / 3.0).min(1.0) * 0.3)
                * 100.0,
            downgrade: if f.plan_downgraded { 100.0 } else { 0.0 },
            volume,
            satisfaction: (1.0 - f.satisfaction_score) * 100.0,
            payment: (f.failed_payments as f64 / 3.0).min(1.0) * 100.0,
        }
    }

    fn weighted_score(&self, b: &RiskBreakdown) -> f64 {
        let risks = [
            b.recency,
            b.engagement,
            b.support,
            b.downgrade,
            b.volume,
            b.satisfaction,
            b.payment,
        ];
        let score: f64 = risks
            .iter()
            .zip(self.config.weights.as_array())
            .map(|(risk, weight)| risk * weight)
            .sum();
        score.clamp(0.0, 100.0)
    }

    fn risk_level(&self, score: f64) -> RiskLevel {
        if score < self.config.medium_risk_score {
            RiskLevel::Low
        } else if score < self.config.high_risk_score {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    fn risk_factors(&self, f: &ChurnFeatures) -> Vec<RiskFactor> {
        let mut factors = Vec::new();
        let mut push = |factor: &str, severity: FactorSeverity, description: String| {
            factors.push(RiskFactor {
                factor: factor.to_string(),
                severity,
                description,
            });
        };

        if f.days_since_last_activity > self.config.inactive_days {
            let severity = if f.days_since_last_activity > 30.0 {
                FactorSeverity::High
            } else {
                FactorSeverity::Medium
            };
            push(
                "inactive",
                severity,
                format!(
                    "No activity for {:.0} days",
                    f.days_since_last_activity.floor()
                ),
            );
        }
        if f.engagement_score < self.config.low_engagement {
            push(
                "low_engagement",
                FactorSeverity::Medium,
                format!("Engagement score is {:.2}", f.engagement_score),
            );
        }
        if f.support_tickets > self.config.support_ticket_limit {
            push(
                "support_issues",
                FactorSeverity::Medium,
                format!("{} support tickets opened", f.support_tickets),
            );
        }
        if f.plan_downgraded {
            push(
                "recent_downgrade",
                FactorSeverity::High,
                "Plan was recently downgraded".to_string(),
            );
        }
        if f.messages_previous_30_days > 0
            && (f.messages_last_30_days as f64) < f.messages_previous_30_days as f64 * 0.5
        {
            push(
                "declining_usage",
                FactorSeverity::Medium,
                format!(
                    "Messages dropped from {} to {}",
                    f.messages_previous_30_days, f.messages_last_30_days
                ),
            );
        }
        if f.satisfaction_score < self.config.low_satisfaction {
            push(
                "low_satisfaction",
                FactorSeverity::High,
                format!("Satisfaction score is {:.2}", f.satisfaction_score),
            );
        }
        if f.failed_payments > 0 {
            push(
                "payment_issues",
                FactorSeverity::High,
                format!("{} failed payments", f.failed_payments),
            );
        }

        factors
    }

    fn lifetime_value(&self, f: &ChurnFeatures, risk_score: f64) -> LifetimeValue {
        let current = f.monthly_value * f.subscription_months as f64;
        let projected =
            f.monthly_value * self.config.lifetime_horizon_months * (1.0 - risk_score / 100.0);
        LifetimeValue {
            current,
            projected,
            total: current + projected,
        }
    }

    fn record(&self, level: RiskLevel, score: f64) {
        let mut stats = self.stats.lock();
        stats.total_predictions += 1;
        *stats.by_level.entry(level).or_insert(0) += 1;
        stats.average_risk.push(score);
    }
}

fn retention_strategy(level: RiskLevel) -> RetentionStrategy {
    let (priority, actions, offer, channel): (&str, &[&str], Option<&str>, &str) = match level {
        RiskLevel::High => (
            "urgent",
            &[
                "Assign a customer success manager",
                "Schedule a personal check-in call",
                "Review open support tickets",
            ],
            Some("20% discount for 3 months"),
            "phone",
        ),
        RiskLevel::Medium => (
            "elevated",
            &[
                "Send a feature highlights email",
                "Offer a guided onboarding session",
            ],
            Some("One month of a premium feature"),
            "email",
        ),
        RiskLevel::Low => (
            "routine",
            &["Include in the monthly newsletter", "Ask for a product review"],
            None,
            "in_app",
        ),
    };

    RetentionStrategy {
        priority: priority.to_string(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
        offer: offer.map(str::to_string),
        channel: channel.to_string(),
    }
}

fn time_to_churn(score: f64) -> TimeToChurn {
    let (label, min_days, max_days) = if score >= 80.0 {
        ("0-30 days", 0, Some(30))
    } else if score >= 60.0 {
        ("30-60 days", 30, Some(60))
    } else if score >= 40.0 {
        ("60-90 days", 60, Some(90))
    } else if score >= 20.0 {
        ("90-180 days", 90, Some(180))
    } else {
        ("180+ days", 180, None)
    };
    TimeToChurn {
        label: label.to_string(),
        min_days,
        max_days,
    }
}
