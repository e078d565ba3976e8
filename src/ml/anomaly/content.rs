//! Content checks: spam, fraud and abuse.
//!
//! These look only at the message text (and, for fraud and abuse, a couple of
//! context flags). They hold no state.

use std::sync::LazyLock;

use regex::Regex;

use crate::ml::MessageContext;
use crate::ml::anomaly::types::{AnomalyCheckResult, CheckType};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in anomaly pattern should be valid")
}

/// Named spam patterns, each worth 0.3.
static SPAM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "urgent_call_to_action",
            compile(r"(?i)\b(buy now|click here|act now|order now|limited time|subscribe now)\b"),
        ),
        (
            "money_promise",
            compile(r"(?i)\b(free money|make money|earn \$?\d+|get rich|cash prize|you (have )?won)\b"),
        ),
        ("currency_symbols", compile(r"[$€£]{2,}|[$€£]\s?\d{3,}")),
        ("repeated_punctuation", compile(r"[!?]{3,}")),
        (
            "url_shortener",
            compile(r"(?i)\b(bit\.ly|tinyurl\.com|goo\.gl|ow\.ly|is\.gd)/"),
        ),
        (
            "contact_harvesting",
            compile(r"(?i)\b(whatsapp|telegram|dm me|text me at|call me at)\b"),
        ),
    ]
});

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bhttps?://\S+|\bwww\.\S+"));

static FRAUD_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(credit card|social security|ssn|bank account|routing number|password|wire transfer|western union|gift card|bitcoin)\b",
    )
});

static PHISHING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(verify|confirm|update|validate)\s+(your\s+)?(account|identity|payment|billing|password)\b|\baccount\s+(has\s+been\s+)?(suspended|locked|compromised)\b",
    )
});

static PROFANITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(fuck\w*|shit\w*|bitch\w*|bastard\w*|asshole\w*|dickhead|crap|idiot\w*|moron\w*|stupid)\b")
});

static THREAT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bkill\b",
        r"(?i)\bhurt you\b",
        r"(?i)\bdestroy you\b",
        r"(?i)\bfind where you live\b",
        r"(?i)\bbeat you\b",
        r"(?i)\bbomb\b",
        r"(?i)\bshoot\b",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

const PATTERN_WEIGHT: f64 = 0.3;
const EXTRA_LINK_WEIGHT: f64 = 0.2;
const FREE_LINKS: usize = 2;
const EXCLAMATION_LIMIT: usize = 3;
const EXCLAMATION_WEIGHT: f64 = 0.2;
const CAPS_RATIO: f64 = 0.7;
const CAPS_MIN_LEN: usize = 10;
const CAPS_WEIGHT: f64 = 0.3;
const FRAUD_KEYWORD_WEIGHT: f64 = 0.3;
const PHISHING_WEIGHT: f64 = 0.4;
const IP_MISMATCH_WEIGHT: f64 = 0.5;
const PROFANITY_WEIGHT: f64 = 0.3;
const THREAT_WEIGHT: f64 = 0.5;
const HOSTILE_SENTIMENT: f64 = -0.8;
const HOSTILE_SENTIMENT_WEIGHT: f64 = 0.3;

/// Spam: marketing patterns, link stuffing, shouting.
pub fn check_spam(message: &str, threshold: f64) -> AnomalyCheckResult {
    let mut score = 0.0;
    let mut indicators = Vec::new();

    for (name, pattern) in SPAM_PATTERNS.iter() {
        if pattern.is_match(message) {
            score += PATTERN_WEIGHT;
            indicators.push((*name).to_string());
        }
    }

    let links = LINK_PATTERN.find_iter(message).count();
    if links > FREE_LINKS {
        score += (links - FREE_LINKS) as f64 * EXTRA_LINK_WEIGHT;
        indicators.push(format!("excessive_links:{links}"));
    }

    let exclamations = message.matches('!').count();
    if exclamations > EXCLAMATION_LIMIT {
        score += EXCLAMATION_WEIGHT;
        indicators.push("excessive_exclamation".to_string());
    }

    if message.chars().count() > CAPS_MIN_LEN && caps_ratio(message) > CAPS_RATIO {
        score += CAPS_WEIGHT;
        indicators.push("excessive_caps".to_string());
    }

    AnomalyCheckResult::from_raw(CheckType::Spam, score, threshold, indicators)
}

/// Fraud: requests for credentials or payment details, phishing phrasing,
/// and a client IP that does not match the session.
pub fn check_fraud(message: &str, context: &MessageContext, threshold: f64) -> AnomalyCheckResult {
    let mut score = 0.0;
    let mut indicators: Vec<String> = Vec::new();

    for found in FRAUD_KEYWORDS.find_iter(message) {
        let keyword = format!("sensitive_keyword:{}", found.as_str().to_lowercase());
        if !indicators.contains(&keyword) {
            score += FRAUD_KEYWORD_WEIGHT;
            indicators.push(keyword);
        }
    }

    if PHISHING_PATTERN.is_match(message) {
        score += PHISHING_WEIGHT;
        indicators.push("phishing_language".to_string());
    }

    if context.ip_mismatch {
        score += IP_MISMATCH_WEIGHT;
        indicators.push("ip_mismatch".to_string());
    }

    AnomalyCheckResult::from_raw(CheckType::Fraud, score, threshold, indicators)
}

/// Abuse: profanity, threats, and strongly hostile sentiment.
pub fn check_abuse(message: &str, context: &MessageContext, threshold: f64) -> AnomalyCheckResult {
    let mut score = 0.0;
    let mut indicators = Vec::new();

    if PROFANITY_PATTERN.is_match(message) {
        score += PROFANITY_WEIGHT;
        indicators.push("profanity".to_string());
    }

    let threats = THREAT_PATTERNS
        .iter()
        .filter(|pattern| pattern.is_match(message))
        .count();
    if threats > 0 {
        score += threats as f64 * THREAT_WEIGHT;
        indicators.push(format!("threats:{threats}"));
    }

    if context
        .sentiment_score
        .is_some_and(|sentiment| sentiment < HOSTILE_SENTIMENT)
    {
        score += HOSTILE_SENTIMENT_WEIGHT;
        indicators.push("hostile_sentiment".to_string());
    }

    AnomalyCheckResult::from_raw(CheckType::Abuse, score, threshold, indicators)
}

/// Share of alphabetic characters that are uppercase.
fn caps_ratio(message: &str) -> f64 {
    let (letters, upper) = message
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });
    if letters == 0 {
        0.0
    } else {
        upper as f64 / letters as f64
    }
}
