//! Word lists backing the sentiment scorer.
//!
//! Polarity weights follow the AFINN convention (integers in `-5..=5`).

use std::collections::HashMap;
use std::sync::LazyLock;

use super::{Emotion, UrgencyLevel};

const POLARITY: &[(&str, i32)] = &[
    // positive
    ("amazing", 4),
    ("appreciate", 2),
    ("awesome", 4),
    ("beautiful", 3),
    ("best", 3),
    ("better", 2),
    ("brilliant", 4),
    ("cool", 1),
    ("delighted", 3),
    ("easy", 1),
    ("enjoy", 2),
    ("excellent", 3),
    ("excited", 3),
    ("fantastic", 4),
    ("fast", 1),
    ("fine", 2),
    ("glad", 3),
    ("good", 3),
    ("great", 3),
    ("happy", 3),
    ("helpful", 2),
    ("impressed", 3),
    ("like", 2),
    ("love", 3),
    ("lovely", 3),
    ("nice", 3),
    ("perfect", 3),
    ("pleased", 3),
    ("recommend", 2),
    ("satisfied", 2),
    ("smooth", 2),
    ("solved", 2),
    ("super", 3),
    ("thank", 2),
    ("thanks", 2),
    ("useful", 2),
    ("wonderful", 4),
    ("works", 1),
    ("wow", 4),
    // negative
    ("angry", -3),
    ("annoyed", -2),
    ("annoying", -2),
    ("awful", -3),
    ("bad", -3),
    ("broken", -1),
    ("bug", -2),
    ("cancel", -1),
    ("confused", -2),
    ("crap", -3),
    ("damn", -4),
    ("disappointed", -2),
    ("disappointing", -2),
    ("disgusting", -3),
    ("dissatisfied", -2),
    ("error", -2),
    ("fail", -2),
    ("failed", -2),
    ("fraud", -4),
    ("frustrated", -2),
    ("frustrating", -2),
    ("furious", -3),
    ("garbage", -3),
    ("hate", -3),
    ("horrible", -3),
    ("issue", -1),
    ("lost", -3),
    ("mad", -3),
    ("mess", -2),
    ("nightmare", -3),
    ("pathetic", -2),
    ("poor", -2),
    ("problem", -2),
    ("refund", -1),
    ("rude", -2),
    ("sad", -2),
    ("scam", -4),
    ("slow", -2),
    ("stupid", -2),
    ("terrible", -3),
    ("ugly", -3),
    ("unacceptable", -3),
    ("unhappy", -2),
    ("useless", -2),
    ("waste", -1),
    ("worse", -3),
    ("worst", -3),
    ("wrong", -2),
];

/// Words that flip the polarity of the lexicon word right after them.
pub(crate) const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "isn't",
    "isnt", "wasn't", "wasnt", "can't", "cant", "won't", "wont", "aren't", "arent",
];

/// Word → polarity weight.
pub(crate) static POLARITY_LEXICON: LazyLock<HashMap<&'static str, i32>> =
    LazyLock::new(|| POLARITY.iter().copied().collect());

/// Keyword lists per emotion category.
pub(crate) fn emotion_keywords(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &[
            "happy", "glad", "love", "great", "awesome", "excited", "delighted", "wonderful",
            "joy", "thrilled",
        ],
        Emotion::Anger => &[
            "angry", "hate", "furious", "mad", "rage", "outraged", "livid", "worst", "pissed",
            "unacceptable",
        ],
        Emotion::Sadness => &[
            "sad", "unhappy", "disappointed", "depressed", "miserable", "sorry", "lonely",
            "heartbroken", "upset",
        ],
        Emotion::Fear => &[
            "afraid", "scared", "worried", "anxious", "nervous", "panic", "terrified", "fear",
            "concerned",
        ],
        Emotion::Surprise => &[
            "surprised", "wow", "unexpected", "shocked", "amazed", "astonished", "unbelievable",
            "suddenly",
        ],
        Emotion::Frustration => &[
            "frustrated", "frustrating", "annoyed", "annoying", "stuck", "again", "still",
            "useless", "ridiculous", "tired",
        ],
    }
}

/// Urgency tiers in priority order; the first tier with a hit wins.
pub(crate) const URGENCY_TIERS: &[(UrgencyLevel, &[&str])] = &[
    (
        UrgencyLevel::High,
        &[
            "urgent",
            "emergency",
            "asap",
            "immediately",
            "critical",
            "right now",
            "down",
            "outage",
        ],
    ),
    (
        UrgencyLevel::Medium,
        &["soon", "important", "quickly", "today", "need help", "waiting"],
    ),
    (
        UrgencyLevel::Low,
        &[
            "whenever",
            "no rush",
            "eventually",
            "when you can",
            "sometime",
            "just wondering",
        ],
    ),
];
