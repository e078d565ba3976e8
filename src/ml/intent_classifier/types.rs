//! Common types for intent classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ml::sentiment::UrgencyLevel;

/// The fixed set of chat intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    ProductInquiry,
    Purchase,
    Support,
    Complaint,
    Pricing,
    Goodbye,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Intent; 7] = [
        Intent::Greeting,
        Intent::ProductInquiry,
        Intent::Purchase,
        Intent::Support,
        Intent::Complaint,
        Intent::Pricing,
        Intent::Goodbye,
    ];

    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::ProductInquiry => "product_inquiry",
            Intent::Purchase => "purchase",
            Intent::Support => "support",
            Intent::Complaint => "complaint",
            Intent::Pricing => "pricing",
            Intent::Goodbye => "goodbye",
        }
    }

    /// Next step the bot should take for this intent.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            Intent::Greeting => "send_welcome_message",
            Intent::ProductInquiry => "show_product_catalog",
            Intent::Purchase => "start_checkout",
            Intent::Support => "open_support_ticket",
            Intent::Complaint => "escalate_to_human",
            Intent::Pricing => "show_pricing_plans",
            Intent::Goodbye => "close_conversation",
        }
    }

    /// How quickly a message with this intent needs attention.
    pub fn urgency(&self) -> UrgencyLevel {
        match self {
            Intent::Complaint => UrgencyLevel::High,
            Intent::Purchase | Intent::Support => UrgencyLevel::Medium,
            Intent::Greeting | Intent::ProductInquiry | Intent::Pricing | Intent::Goodbye => {
                UrgencyLevel::Low
            }
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training sample for intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSample {
    /// Sample text.
    pub text: String,
    /// Intent label.
    pub intent: Intent,
}

/// One ranked entry of a probability distribution over intents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentProbability {
    pub intent: Intent,
    pub probability: f64,
}

/// Raw output of a single intent model.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentPrediction {
    pub intent: Intent,
    pub confidence: f64,
    /// Ranked best-first; may be empty for models without a distribution.
    pub ranked: Vec<IntentProbability>,
}

/// Which method decided the final intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMethod {
    NaiveBayes,
    Keyword,
}

/// Final classification returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    pub intent: Intent,
    /// Max of the model and keyword confidences, in `[0, 1]`.
    pub confidence: f64,
    /// Top 3 model probabilities, best first.
    pub probabilities: Vec<IntentProbability>,
    pub suggested_action: String,
    pub urgency_level: UrgencyLevel,
    pub method: DecisionMethod,
}
