// tests/ingest_e2e.rs
//
// Full ingestion cycle over a canned fetcher and the in-memory store:
// fetch -> provisional persist -> cache refresh -> async scoring ->
// post-scoring cache refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use news_sentiment_pipeline::config::AppConfig;
use news_sentiment_pipeline::fetch::StaticFetcher;
use news_sentiment_pipeline::model::RawItem;
use news_sentiment_pipeline::store::{MemoryStore, Store};
use news_sentiment_pipeline::{App, SentimentLabel};

fn test_config() -> AppConfig {
    AppConfig {
        sources: vec!["us".to_string()],
        chunk_size: 20,
        chunk_pause_ms: 0,
        source_pause_ms: 0,
        ..AppConfig::default()
    }
}

fn raw(title: &str, idx: usize) -> RawItem {
    RawItem {
        title: title.to_string(),
        description: None,
        url: format!("https://news.test/{idx}"),
        published_at: Some(Utc::now().to_rfc3339()),
        source_name: Some("Wire".to_string()),
    }
}

/// 45 headlines: 15 of each expected polarity.
fn us_headlines() -> Vec<RawItem> {
    let mut items = Vec::new();
    for i in 0..15 {
        items.push(raw("Stocks surge on strong earnings", i));
        items.push(raw("Factory explosion injures workers", 100 + i));
        items.push(raw("City council meets Tuesday", 200 + i));
    }
    items
}

async fn wait_for(mut done: impl FnMut() -> bool) {
    for _ in 0..500 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within timeout");
}

#[tokio::test(flavor = "multi_thread")]
async fn one_cycle_scores_and_caches_all_items() {
    let fetcher = Arc::new(StaticFetcher::new().with_items("us", us_headlines()));
    let store = Arc::new(MemoryStore::new());
    let app = App::build(&test_config(), fetcher, store);

    app.scheduler.run_cycle().await;

    let stats = app.state.stats.snapshot();
    assert_eq!(stats.get("us_fetched"), Some(&45));
    assert_eq!(stats.get("us_saved"), Some(&45));
    assert!(stats.contains_key("us_time_ms"));

    // Scoring runs detached from the cycle; wait for it and for the
    // post-scoring cache refresh.
    wait_for(|| app.state.stats.get("us_completed") == Some(45)).await;
    wait_for(|| {
        let cached = app.state.cache.get("us");
        cached.len() == 45
            && cached
                .iter()
                .all(|it| it.sentiment_label != SentimentLabel::Processing)
    })
    .await;

    let cached = app.state.cache.get("us");
    for item in cached.iter() {
        let expected = match item.title.as_str() {
            "Stocks surge on strong earnings" => SentimentLabel::Positive,
            "Factory explosion injures workers" => SentimentLabel::Negative,
            "City council meets Tuesday" => SentimentLabel::Neutral,
            other => panic!("unexpected title {other}"),
        };
        assert_eq!(item.sentiment_label, expected, "title: {}", item.title);
        assert!((0.0..=1.0).contains(&item.sentiment_confidence));
        assert!((-1.0..=1.0).contains(&item.sentiment_score));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn second_cycle_saves_nothing_new_and_keeps_scores() {
    let fetcher = Arc::new(StaticFetcher::new().with_items("us", us_headlines()));
    let store = Arc::new(MemoryStore::new());
    let app = App::build(&test_config(), fetcher, store.clone());

    app.scheduler.run_cycle().await;
    wait_for(|| app.state.stats.get("us_completed") == Some(45)).await;
    wait_for(|| {
        app.state
            .cache
            .get("us")
            .iter()
            .all(|it| it.sentiment_label != SentimentLabel::Processing)
    })
    .await;

    let scored_before: std::collections::HashMap<String, (SentimentLabel, f64)> = store
        .find_by_key("us")
        .await
        .unwrap()
        .into_iter()
        .map(|it| (it.url.clone(), (it.sentiment_label, it.sentiment_score)))
        .collect();
    assert_eq!(scored_before.len(), 45);

    app.scheduler.run_cycle().await;
    let stats = app.state.stats.snapshot();
    assert_eq!(stats.get("us_fetched"), Some(&45));
    // Every (url, source_key) identity already exists.
    assert_eq!(stats.get("us_saved"), Some(&0));

    // Re-fetching known identities must not reset their stored sentiment:
    // the provisional placeholder is for new rows only.
    let rows = store.find_by_key("us").await.unwrap();
    assert_eq!(rows.len(), 45);
    for row in &rows {
        let (label, score) = scored_before[&row.url];
        assert_ne!(row.sentiment_label, SentimentLabel::Processing, "url: {}", row.url);
        assert_eq!(row.sentiment_label, label, "url: {}", row.url);
        assert_eq!(row.sentiment_score, score, "url: {}", row.url);
    }

    wait_for(|| app.state.cache.get("us").len() == 45).await;
    let cached = app.state.cache.get("us");
    assert!(cached
        .iter()
        .all(|it| it.sentiment_label != SentimentLabel::Processing));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_failure_skips_source_and_finishes_cycle() {
    struct FailingFetcher;
    #[async_trait::async_trait]
    impl news_sentiment_pipeline::fetch::Fetcher for FailingFetcher {
        async fn fetch_by_key(
            &self,
            source_key: &str,
        ) -> anyhow::Result<Vec<RawItem>> {
            if source_key == "gb" {
                anyhow::bail!("upstream unavailable");
            }
            Ok(us_headlines())
        }
    }

    let cfg = AppConfig {
        sources: vec!["gb".to_string(), "us".to_string()],
        ..test_config()
    };
    let app = App::build(&cfg, Arc::new(FailingFetcher), Arc::new(MemoryStore::new()));

    app.scheduler.run_cycle().await;

    let stats = app.state.stats.snapshot();
    assert_eq!(stats.get("gb_error"), Some(&1));
    // The failed source did not abort the cycle; "us" still ingested.
    assert_eq!(stats.get("us_saved"), Some(&45));
}

#[tokio::test(flavor = "multi_thread")]
async fn provisional_items_are_visible_before_scoring_lands() {
    // Cache policy: the refresh after the provisional save is reader-visible,
    // so a Processing label may be observed until scoring completes.
    let fetcher = Arc::new(StaticFetcher::new().with_items("us", us_headlines()));
    let store = Arc::new(MemoryStore::new());
    let app = App::build(&test_config(), fetcher, store.clone());

    app.scheduler.run_cycle().await;

    // Immediately after the cycle the cache already holds all 45 items,
    // whatever their current label.
    assert_eq!(app.state.cache.get("us").len(), 45);

    wait_for(|| {
        app.state
            .cache
            .get("us")
            .iter()
            .all(|it| it.sentiment_label != SentimentLabel::Processing)
    })
    .await;
}
