//! Behavioral checks: bot-like messaging and deviations from a user's
//! learned activity baseline. Both need a user id and go through the
//! [`UserStateStore`].

use std::sync::LazyLock;

use chrono::Timelike;

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::ml::MessageContext;
use crate::ml::anomaly::AnomalyConfig;
use crate::ml::anomaly::store::{ActivityObservation, HistoryEntry, UserStateStore};
use crate::ml::anomaly::types::{AnomalyCheckResult, CheckType};

const REPEAT_WEIGHT: f64 = 0.4;
const RAPID_FIRE_WEIGHT: f64 = 0.5;
const RANDOM_TEXT_WEIGHT: f64 = 0.3;
const REGULAR_TIMING_WEIGHT: f64 = 0.4;
const UNUSUAL_HOUR_WEIGHT: f64 = 0.3;
const VOLUME_SPIKE_WEIGHT: f64 = 0.4;
const NEW_LOCATION_WEIGHT: f64 = 0.4;

/// Splits on whitespace only, so symbol-laden words stay whole.
static WORD_SHAPES: LazyLock<RegexTokenizer> =
    LazyLock::new(|| RegexTokenizer::whitespace().expect("valid whitespace pattern"));

/// Record the message in the user's history, then look for repetition,
/// bursts, gibberish and machine-regular timing.
pub fn check_bot(
    message: &str,
    context: &MessageContext,
    store: &dyn UserStateStore,
    config: &AnomalyConfig,
) -> AnomalyCheckResult {
    let Some(user_id) = context.user_id.as_deref() else {
        return AnomalyCheckResult::clear(CheckType::Bot);
    };

    let now_ms = context.timestamp.timestamp_millis();
    store.append(
        user_id,
        HistoryEntry {
            message: message.to_string(),
            timestamp_ms: now_ms,
        },
    );
    store.prune(user_id, config.history_capacity);
    let history = store.history(user_id);

    let mut score = 0.0;
    let mut indicators = Vec::new();

    let repeats = history.iter().filter(|entry| entry.message == message).count();
    if repeats >= config.repeat_count {
        score += REPEAT_WEIGHT;
        indicators.push(format!("repeated_message:{repeats}"));
    }

    let window = config.rapid_fire_window_ms as i64;
    let recent = history
        .iter()
        .filter(|entry| {
            let age = now_ms - entry.timestamp_ms;
            (0..window).contains(&age)
        })
        .count();
    if recent >= config.rapid_fire_count {
        score += RAPID_FIRE_WEIGHT;
        indicators.push(format!("rapid_fire:{recent}"));
    }

    if random_word_ratio(message) > config.random_text_ratio {
        score += RANDOM_TEXT_WEIGHT;
        indicators.push("random_text".to_string());
    }

    if let Some(variance) = interval_variance(&history, config.timing_window) {
        if variance < config.timing_variance_threshold {
            score += REGULAR_TIMING_WEIGHT;
            indicators.push("regular_timing".to_string());
        }
    }

    AnomalyCheckResult::from_raw(CheckType::Bot, score, config.bot_threshold, indicators)
}

/// Compare this message's hour, volume and location with the user's
/// baseline, then fold them into it. The first message from a user only
/// creates the baseline.
pub fn check_unusual_pattern(
    context: &MessageContext,
    store: &dyn UserStateStore,
    config: &AnomalyConfig,
) -> AnomalyCheckResult {
    let Some(user_id) = context.user_id.as_deref() else {
        return AnomalyCheckResult::clear(CheckType::UnusualPattern);
    };

    let observation = ActivityObservation {
        hour: context.timestamp.hour(),
        daily_messages: context.messages_last_24h.map(f64::from),
        location: context.location.clone(),
    };

    let Some(baseline) = store.record_activity(user_id, &observation, config.baseline_alpha)
    else {
        return AnomalyCheckResult::clear(CheckType::UnusualPattern);
    };

    let mut score = 0.0;
    let mut indicators = Vec::new();

    if !baseline.active_hours.contains(&observation.hour) {
        score += UNUSUAL_HOUR_WEIGHT;
        indicators.push(format!("unusual_hour:{}", observation.hour));
    }

    if let Some(volume) = observation.daily_messages {
        if baseline.avg_daily_messages > 0.0
            && volume > baseline.avg_daily_messages * config.volume_spike_multiplier
        {
            score += VOLUME_SPIKE_WEIGHT;
            indicators.push("volume_spike".to_string());
        }
    }

    if let Some(location) = &observation.location {
        if !baseline.locations.is_empty() && !baseline.locations.contains(location) {
            score += NEW_LOCATION_WEIGHT;
            indicators.push(format!("new_location:{location}"));
        }
    }

    AnomalyCheckResult::from_raw(
        CheckType::UnusualPattern,
        score,
        config.unusual_threshold,
        indicators,
    )
}

/// Share of whitespace-separated words that look machine generated: digits
/// mixed with symbols, or a character repeated four or more times in a row.
fn random_word_ratio(message: &str) -> f64 {
    let Ok(tokens) = WORD_SHAPES.tokenize(message) else {
        return 0.0;
    };
    let words: Vec<String> = tokens.map(|token| token.text).collect();
    if words.is_empty() {
        return 0.0;
    }
    let random = words.iter().filter(|word| looks_random(word)).count();
    random as f64 / words.len() as f64
}

fn looks_random(word: &str) -> bool {
    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let has_symbol = word.chars().any(|c| !c.is_alphanumeric());
    if has_digit && has_symbol {
        return true;
    }

    let mut run = 0;
    let mut previous = None;
    for c in word.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 1;
            previous = Some(c);
        }
    }
    false
}

/// Population variance of the gaps between the last `window` timestamps,
/// or `None` when there are fewer than `window` entries.
fn interval_variance(history: &[HistoryEntry], window: usize) -> Option<f64> {
    if window < 2 || history.len() < window {
        return None;
    }
    let tail = &history[history.len() - window..];
    let gaps: Vec<f64> = tail
        .windows(2)
        .map(|pair| (pair[1].timestamp_ms - pair[0].timestamp_ms) as f64)
        .collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps.iter().map(|gap| (gap - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    Some(variance)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ml::anomaly::store::InMemoryUserStore;

    fn context_at(user: &str, ms: i64) -> MessageContext {
        MessageContext::for_user(user, Utc.timestamp_millis_opt(ms).unwrap())
    }

    #[test]
    fn test_rapid_regular_messages_look_like_a_bot() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let start = 1_700_000_000_000;

        let mut last = AnomalyCheckResult::clear(CheckType::Bot);
        for i in 0..5 {
            let message = format!("question number {i}");
            last = check_bot(&message, &context_at("u1", start + i * 200), &store, &config);
        }

        assert!(last.detected);
        assert!(last.indicators.iter().any(|i| i.starts_with("rapid_fire")));
        assert!(last.indicators.contains(&"regular_timing".to_string()));
    }

    #[test]
    fn test_no_user_skips_behavioral_checks() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let context = MessageContext::default();

        assert_eq!(
            check_bot("hello", &context, &store, &config),
            AnomalyCheckResult::clear(CheckType::Bot)
        );
        assert_eq!(
            check_unusual_pattern(&context, &store, &config),
            AnomalyCheckResult::clear(CheckType::UnusualPattern)
        );
    }

    #[test]
    fn test_repeated_message() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let start = 1_700_000_000_000;

        let mut last = AnomalyCheckResult::clear(CheckType::Bot);
        for i in 0..3 {
            // Spaced out and irregular so only repetition fires.
            last = check_bot("same thing", &context_at("u1", start + i * i * 60_000), &store, &config);
        }
        assert!(last.indicators.contains(&"repeated_message:3".to_string()));
        assert!(!last.detected);
    }

    #[test]
    fn test_history_is_bounded() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        for i in 0..130 {
            check_bot("msg", &context_at("u1", i * 10_000), &store, &config);
        }
        assert_eq!(store.history("u1").len(), config.history_capacity);
    }

    #[test]
    fn test_random_words() {
        assert!(looks_random("x7$k2"));
        assert!(looks_random("aaaaargh"));
        assert!(!looks_random("hello"));
        assert!(!looks_random("2024"));
        assert_eq!(random_word_ratio(""), 0.0);
        assert!((random_word_ratio("hello zzzz") - 0.5).abs() < 1e-9);
        // Symbols do not split a word.
        assert!((random_word_ratio("my p4$$w0rd") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_irregular_burst_is_flagged_but_not_detected() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let start = 1_700_000_000_000;
        let texts = ["hi", "are you there", "hello", "anyone", "answer me"];

        let mut last = AnomalyCheckResult::clear(CheckType::Bot);
        for (text, offset) in texts.iter().zip([0, 40, 500, 620, 900]) {
            last = check_bot(text, &context_at("u1", start + offset), &store, &config);
        }

        assert_eq!(last.indicators, vec!["rapid_fire:5".to_string()]);
        assert!((last.score - 0.5).abs() < 1e-9);
        assert!(!last.detected);
    }

    #[test]
    fn test_interval_variance() {
        let entries: Vec<HistoryEntry> = [0, 100, 200, 300, 400]
            .into_iter()
            .map(|ts| HistoryEntry {
                message: String::new(),
                timestamp_ms: ts,
            })
            .collect();
        assert_eq!(interval_variance(&entries, 5), Some(0.0));
        assert_eq!(interval_variance(&entries[..4], 5), None);
    }

    #[test]
    fn test_unusual_pattern_against_baseline() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 2, 3, 0, 0).unwrap();

        let mut first = MessageContext::for_user("u1", noon);
        first.messages_last_24h = Some(10);
        first.location = Some("Berlin".to_string());
        let created = check_unusual_pattern(&first, &store, &config);
        assert!(!created.detected);
        assert!(created.indicators.is_empty());

        let mut odd = MessageContext::for_user("u1", night);
        odd.messages_last_24h = Some(50);
        odd.location = Some("Lagos".to_string());
        let result = check_unusual_pattern(&odd, &store, &config);

        assert!(result.detected);
        assert_eq!(result.indicators.len(), 3);
        assert!((result.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_check_needs_positive_baseline() {
        let store = InMemoryUserStore::new();
        let config = AnomalyConfig::default();
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        check_unusual_pattern(&MessageContext::for_user("u1", noon), &store, &config);

        let mut spike = MessageContext::for_user("u1", noon);
        spike.messages_last_24h = Some(500);
        let result = check_unusual_pattern(&spike, &store, &config);
        assert!(result.indicators.is_empty());
    }
}
