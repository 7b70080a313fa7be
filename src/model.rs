//! # Data Model
//! `RawItem` is what the fetcher returns; `NewsItem` is the persisted,
//! scorable record. Item identity for dedup is `(url, source_key)`. The three
//! sentiment fields are always set together, never partially.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::{SentimentLabel, SentimentResult};

/// Untyped record as produced by an external news source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    /// ISO-8601 timestamp as supplied by the source, if any.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

/// One ingested, scorable news record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    /// Partition key for ingestion, e.g. a country code.
    pub source_key: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    pub created_at: DateTime<Utc>,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub sentiment_confidence: f64,
}

impl NewsItem {
    /// Build a persistable item from a raw fetch record. An unparseable or
    /// missing timestamp falls back to "now" so the item counts as recent.
    /// Sentiment starts as the `Processing` placeholder so the item can be
    /// saved before scoring runs.
    pub fn from_raw(raw: RawItem, source_key: &str) -> Self {
        let published_at = raw
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let mut item = Self {
            id: None,
            title: raw.title,
            description: raw.description,
            url: raw.url,
            source_key: source_key.to_lowercase(),
            published_at,
            source_name: raw.source_name.unwrap_or_else(|| "Unknown".to_string()),
            created_at: Utc::now(),
            sentiment_label: SentimentLabel::Processing,
            sentiment_score: 0.0,
            sentiment_confidence: 0.0,
        };
        item.set_sentiment(&SentimentResult::processing());
        item
    }

    /// Set all three sentiment fields from one result.
    pub fn set_sentiment(&mut self, result: &SentimentResult) {
        self.sentiment_label = result.label;
        self.sentiment_score = result.score;
        self.sentiment_confidence = result.confidence;
    }

    /// Text handed to the scorer: title, plus description when present.
    pub fn analysis_text(&self) -> String {
        let mut text = self.title.clone();
        if let Some(desc) = &self.description {
            if !desc.trim().is_empty() {
                text.push(' ');
                text.push_str(desc);
            }
        }
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn raw(title: &str, url: &str) -> RawItem {
        RawItem {
            title: title.to_string(),
            description: None,
            url: url.to_string(),
            published_at: Some("2026-08-25T10:00:00Z".to_string()),
            source_name: Some("Wire".to_string()),
        }
    }

    #[test]
    fn from_raw_parses_timestamp_and_sets_placeholder() {
        let item = NewsItem::from_raw(raw("Title", "https://x.test/1"), "US");
        assert_eq!(item.source_key, "us");
        assert_eq!(item.published_at.to_rfc3339(), "2026-08-25T10:00:00+00:00");
        assert_eq!(item.sentiment_label, SentimentLabel::Processing);
        assert_eq!(item.sentiment_confidence, 0.0);
    }

    #[test]
    fn missing_timestamp_falls_back_to_now() {
        let mut r = raw("Title", "https://x.test/2");
        r.published_at = None;
        let item = NewsItem::from_raw(r, "us");
        assert!(Utc::now() - item.published_at < Duration::seconds(5));
    }

    #[test]
    fn analysis_text_joins_title_and_description() {
        let mut item = NewsItem::from_raw(raw("Stocks surge", "https://x.test/3"), "us");
        assert_eq!(item.analysis_text(), "Stocks surge");
        item.description = Some("strong earnings".to_string());
        assert_eq!(item.analysis_text(), "Stocks surge strong earnings");
        item.description = Some("   ".to_string());
        assert_eq!(item.analysis_text(), "Stocks surge");
    }

    #[test]
    fn set_sentiment_updates_all_fields_together() {
        let mut item = NewsItem::from_raw(raw("Title", "https://x.test/4"), "us");
        item.set_sentiment(&SentimentResult::neutral());
        assert_eq!(item.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(item.sentiment_score, 0.0);
        assert_eq!(item.sentiment_confidence, 0.5);
    }
}
