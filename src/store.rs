//! # Durable Store Seam
//! The pipeline only sees this trait; schema and query mechanics live behind
//! it. `MemoryStore` is the reference implementation used by tests and the
//! default binary.
//!
//! `save_batch` is idempotent on `(url, source_key)`: an unseen identity
//! inserts a new row, a known identity overwrites that row's sentiment fields
//! in place, and only newly inserted rows are returned. That one call backs
//! both the provisional (placeholder) save and the post-scoring save, so
//! concurrent reprocessing can at worst duplicate scoring work, never rows.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::NewsItem;

#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a batch. Returns only the newly inserted items (with ids).
    async fn save_batch(&self, items: Vec<NewsItem>) -> Result<Vec<NewsItem>>;

    async fn exists_by_url_and_key(&self, url: &str, source_key: &str) -> Result<bool>;

    /// Items for a key published at or after `since`, newest first.
    async fn find_recent_by_key(
        &self,
        source_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>>;

    /// All items for a key, newest first.
    async fn find_by_key(&self, source_key: &str) -> Result<Vec<NewsItem>>;

    /// Items whose scoring never completed or landed below the confidence
    /// threshold; feeds reprocessing.
    async fn find_low_confidence(
        &self,
        source_key: &str,
        threshold: f64,
    ) -> Result<Vec<NewsItem>>;

    /// Retention sweep. Returns the number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// In-memory store keyed by `(url, source_key)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: HashMap<(String, String), NewsItem>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_batch(&self, items: Vec<NewsItem>) -> Result<Vec<NewsItem>> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let mut inserted = Vec::new();

        for mut item in items {
            let key = (item.url.clone(), item.source_key.clone());
            match inner.rows.get_mut(&key) {
                Some(existing) => {
                    existing.sentiment_label = item.sentiment_label;
                    existing.sentiment_score = item.sentiment_score;
                    existing.sentiment_confidence = item.sentiment_confidence;
                }
                None => {
                    inner.next_id += 1;
                    item.id = Some(inner.next_id);
                    inner.rows.insert(key, item.clone());
                    inserted.push(item);
                }
            }
        }

        Ok(inserted)
    }

    async fn exists_by_url_and_key(&self, url: &str, source_key: &str) -> Result<bool> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .rows
            .contains_key(&(url.to_string(), source_key.to_string())))
    }

    async fn find_recent_by_key(
        &self,
        source_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let items = inner
            .rows
            .values()
            .filter(|it| it.source_key == source_key && it.published_at >= since)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(items))
    }

    async fn find_by_key(&self, source_key: &str) -> Result<Vec<NewsItem>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let items = inner
            .rows
            .values()
            .filter(|it| it.source_key == source_key)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(items))
    }

    async fn find_low_confidence(
        &self,
        source_key: &str,
        threshold: f64,
    ) -> Result<Vec<NewsItem>> {
        use crate::sentiment::SentimentLabel;
        let inner = self.inner.lock().expect("store mutex poisoned");
        let items = inner
            .rows
            .values()
            .filter(|it| {
                it.source_key == source_key
                    && (it.sentiment_label == SentimentLabel::Processing
                        || it.sentiment_confidence < threshold)
            })
            .cloned()
            .collect();
        Ok(Self::sorted_desc(items))
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let before = inner.rows.len();
        inner.rows.retain(|_, it| it.published_at >= cutoff);
        Ok(before - inner.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawItem;
    use crate::sentiment::{SentimentLabel, SentimentResult};
    use chrono::Duration;

    fn item(url: &str, key: &str, published: DateTime<Utc>) -> NewsItem {
        let mut it = NewsItem::from_raw(
            RawItem {
                title: "t".into(),
                description: None,
                url: url.into(),
                published_at: None,
                source_name: None,
            },
            key,
        );
        it.published_at = published;
        it
    }

    #[tokio::test]
    async fn second_save_of_same_identity_inserts_nothing() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let first = store
            .save_batch(vec![item("https://x.test/a", "us", now)])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, Some(1));

        let second = store
            .save_batch(vec![item("https://x.test/a", "us", now)])
            .await
            .unwrap();
        assert!(second.is_empty());

        assert!(store
            .exists_by_url_and_key("https://x.test/a", "us")
            .await
            .unwrap());
        assert_eq!(store.find_by_key("us").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resave_overwrites_sentiment_fields() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut it = item("https://x.test/b", "us", now);
        store.save_batch(vec![it.clone()]).await.unwrap();

        it.set_sentiment(&SentimentResult {
            label: SentimentLabel::Positive,
            score: 0.4,
            confidence: 0.8,
        });
        store.save_batch(vec![it]).await.unwrap();

        let rows = store.find_by_key("us").await.unwrap();
        assert_eq!(rows[0].sentiment_label, SentimentLabel::Positive);
        assert_eq!(rows[0].sentiment_score, 0.4);
    }

    #[tokio::test]
    async fn retention_sweep_removes_old_rows() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .save_batch(vec![
                item("https://x.test/old", "us", now - Duration::hours(48)),
                item("https://x.test/new", "us", now - Duration::hours(1)),
            ])
            .await
            .unwrap();

        let removed = store.delete_older_than(now - Duration::hours(24)).await.unwrap();
        assert_eq!(removed, 1);

        let recent = store
            .find_recent_by_key("us", now - Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].url, "https://x.test/new");
    }

    #[tokio::test]
    async fn low_confidence_includes_processing_placeholders() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut scored = item("https://x.test/s", "us", now);
        scored.set_sentiment(&SentimentResult {
            label: SentimentLabel::Positive,
            score: 0.5,
            confidence: 0.9,
        });
        store
            .save_batch(vec![item("https://x.test/p", "us", now), scored])
            .await
            .unwrap();

        let needy = store.find_low_confidence("us", 0.3).await.unwrap();
        assert_eq!(needy.len(), 1);
        assert_eq!(needy[0].url, "https://x.test/p");
    }
}
