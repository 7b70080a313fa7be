//! # Weighted Sentiment Lexicon
//! Static word tables built once at first use. Words are tiered by impact
//! (1.0 / 0.7 / 0.4) so the scorer can produce graded rather than binary
//! scores. Read-only after construction; lookups are lock-free.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Which polarity table a word came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// High impact weight tier.
pub const WEIGHT_HIGH: f64 = 1.0;
/// Medium impact weight tier.
pub const WEIGHT_MEDIUM: f64 = 0.7;
/// Low impact weight tier.
pub const WEIGHT_LOW: f64 = 0.4;

const HIGH_POSITIVE: &[&str] = &[
    "excellent",
    "outstanding",
    "amazing",
    "fantastic",
    "wonderful",
    "brilliant",
    "superb",
    "magnificent",
    "extraordinary",
    "exceptional",
    "remarkable",
    "incredible",
];

const MEDIUM_POSITIVE: &[&str] = &[
    "good",
    "great",
    "nice",
    "positive",
    "happy",
    "pleased",
    "satisfied",
    "success",
    "win",
    "gain",
    "improve",
    "better",
    "best",
    "love",
    "like",
    "surge",
    "strong",
    "growth",
    "rally",
    "recover",
];

const LOW_POSITIVE: &[&str] = &[
    "okay", "fine", "decent", "adequate", "acceptable", "fair", "reasonable",
];

const HIGH_NEGATIVE: &[&str] = &[
    "terrible",
    "awful",
    "horrible",
    "disgusting",
    "hate",
    "despise",
    "disaster",
    "catastrophe",
    "crisis",
    "failure",
    "worst",
    "pathetic",
    "explosion",
];

const MEDIUM_NEGATIVE: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "sad",
    "angry",
    "disappointed",
    "upset",
    "problem",
    "issue",
    "concern",
    "worry",
    "decline",
    "drop",
    "lose",
    "injures",
    "injured",
];

const LOW_NEGATIVE: &[&str] = &[
    "meh", "bland", "boring", "dull", "mediocre", "subpar", "lacking",
];

const INTENSIFIERS: &[&str] = &[
    "very",
    "extremely",
    "incredibly",
    "absolutely",
    "completely",
    "totally",
    "really",
    "quite",
    "highly",
    "tremendously",
    "enormously",
    "exceptionally",
];

// Tokenization strips apostrophes, so contractions appear bare ("dont").
const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "nowhere", "dont",
    "doesnt", "didnt", "wont", "wouldnt", "cant", "couldnt",
];

static POSITIVE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut m = HashMap::new();
    load_tier(&mut m, HIGH_POSITIVE, WEIGHT_HIGH);
    load_tier(&mut m, MEDIUM_POSITIVE, WEIGHT_MEDIUM);
    load_tier(&mut m, LOW_POSITIVE, WEIGHT_LOW);
    m
});

static NEGATIVE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut m = HashMap::new();
    load_tier(&mut m, HIGH_NEGATIVE, WEIGHT_HIGH);
    load_tier(&mut m, MEDIUM_NEGATIVE, WEIGHT_MEDIUM);
    load_tier(&mut m, LOW_NEGATIVE, WEIGHT_LOW);
    m
});

static INTENSIFIER_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| INTENSIFIERS.iter().copied().collect());

static NEGATOR_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NEGATORS.iter().copied().collect());

fn load_tier(map: &mut HashMap<&'static str, f64>, words: &[&'static str], weight: f64) {
    for w in words {
        map.insert(*w, weight);
    }
}

/// Look up a word's polarity weight. `None` means zero contribution.
pub fn weight(word: &str) -> Option<(Polarity, f64)> {
    if let Some(&w) = POSITIVE.get(word) {
        return Some((Polarity::Positive, w));
    }
    if let Some(&w) = NEGATIVE.get(word) {
        return Some((Polarity::Negative, w));
    }
    None
}

pub fn is_intensifier(word: &str) -> bool {
    INTENSIFIER_SET.contains(word)
}

pub fn is_negator(word: &str) -> bool {
    NEGATOR_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_resolve_to_expected_weights() {
        assert_eq!(weight("excellent"), Some((Polarity::Positive, WEIGHT_HIGH)));
        assert_eq!(weight("good"), Some((Polarity::Positive, WEIGHT_MEDIUM)));
        assert_eq!(weight("okay"), Some((Polarity::Positive, WEIGHT_LOW)));
        assert_eq!(weight("terrible"), Some((Polarity::Negative, WEIGHT_HIGH)));
        assert_eq!(weight("bad"), Some((Polarity::Negative, WEIGHT_MEDIUM)));
        assert_eq!(weight("meh"), Some((Polarity::Negative, WEIGHT_LOW)));
        assert_eq!(weight("zebra"), None);
    }

    #[test]
    fn polarity_tables_are_disjoint() {
        for w in POSITIVE.keys() {
            assert!(!NEGATIVE.contains_key(w), "word in both tables: {w}");
        }
    }

    #[test]
    fn modifier_sets_match() {
        assert!(is_intensifier("very"));
        assert!(is_negator("not"));
        assert!(!is_intensifier("good"));
        assert!(!is_negator("good"));
    }
}
