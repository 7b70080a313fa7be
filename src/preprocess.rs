//! # Text Preprocessing
//! Normalization ahead of lexicon lookup: strip URL/mention/hashtag noise,
//! decode HTML entities, lowercase, collapse whitespace, tokenize.
//! Deterministic and side-effect free.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw text for scoring.
pub fn clean(text: &str) -> String {
    let mut out = RE_URL.replace_all(text, " ").to_string();
    out = RE_MENTION.replace_all(&out, " ").to_string();
    out = RE_HASHTAG.replace_all(&out, " ").to_string();

    out = html_escape::decode_html_entities(&out).to_string();
    out = out.to_lowercase();

    out = RE_WS.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Split normalized text into scoring tokens. Per-token punctuation is
/// stripped; empty and single-character tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|w| w.chars().count() > 1)
        .collect()
}
