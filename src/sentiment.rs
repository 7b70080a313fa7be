//! # Sentiment Scorer
//! Pure lexicon-based polarity scoring. No I/O, no hidden state; the same
//! input always yields the same result.
//!
//! The per-term multipliers and the neutrality margin are empirically chosen
//! constants; changing them silently changes classification outcomes, so they
//! are named here rather than derived.

use serde::{Deserialize, Serialize};

use crate::lexicon::{self, Polarity};
use crate::preprocess;

/// Multiplier applied when the preceding token is an intensifier ("very good").
pub const INTENSIFIER_BOOST: f64 = 1.5;
/// Multiplier applied when the preceding token is a negator ("not good"):
/// the negated word subtracts from its own polarity.
pub const NEGATOR_FLIP: f64 = -0.5;
/// Minimum score separation for a non-neutral label (dead-zone against noise).
pub const NEUTRAL_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// Placeholder assigned at persist time, before scoring has run.
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Signed net polarity in `[-1.0, 1.0]`.
    pub score: f64,
    /// Relative dominance in `[0.0, 1.0]`; not a calibrated probability.
    pub confidence: f64,
}

impl SentimentResult {
    /// Result for empty input and for items whose scoring was skipped or failed.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: 0.5,
        }
    }

    /// Pre-scoring placeholder so fetched items can be persisted immediately.
    pub fn processing() -> Self {
        Self {
            label: SentimentLabel::Processing,
            score: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::neutral();
        }

        let tokens = preprocess::tokenize(&preprocess::clean(text));
        if tokens.is_empty() {
            // Text reduced to nothing (e.g. a bare URL); zero denominator below.
            return SentimentResult::neutral();
        }

        let positive = self.polarity_score(&tokens, Polarity::Positive);
        let negative = self.polarity_score(&tokens, Polarity::Negative);
        let neutral = 1.0 - (positive - negative).abs();

        let label = if positive - negative > NEUTRAL_MARGIN {
            SentimentLabel::Positive
        } else if negative - positive > NEUTRAL_MARGIN {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        let total = positive + negative + neutral;
        let confidence = if total > 0.0 {
            (positive.max(negative).max(neutral) / total).clamp(0.0, 1.0)
        } else {
            0.5
        };

        SentimentResult {
            label,
            score: (positive - negative).clamp(-1.0, 1.0),
            confidence,
        }
    }

    /// Length-normalized sum of lexicon weights for one polarity, with a
    /// one-token lookback for intensifiers and negators.
    fn polarity_score(&self, tokens: &[String], polarity: Polarity) -> f64 {
        let mut score = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some((pol, mut word_score)) = lexicon::weight(token) else {
                continue;
            };
            if pol != polarity {
                continue;
            }

            if i > 0 && lexicon::is_intensifier(&tokens[i - 1]) {
                word_score *= INTENSIFIER_BOOST;
            }
            if i > 0 && lexicon::is_negator(&tokens[i - 1]) {
                word_score *= NEGATOR_FLIP;
            }

            score += word_score;
        }

        (score / tokens.len() as f64).min(1.0)
    }
}
