//! # Ingestion Scheduler
//! One driver task walks the configured sources in order on a fixed period
//! (and once at startup): fetch, filter to the retention window, persist
//! provisionally, refresh the cache, then hand the new items to the scoring
//! pipeline without waiting on it. Per-source failures are recorded and the
//! cycle moves on; a cycle always terminates.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::cache::NewsCache;
use crate::config::AppConfig;
use crate::fetch::Fetcher;
use crate::model::NewsItem;
use crate::pacing::Pacer;
use crate::pipeline::ScoringPipeline;
use crate::stats::StatsBoard;
use crate::store::Store;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_cycles_total", "Completed ingestion cycles.");
        describe_counter!("ingest_items_fetched_total", "Raw items returned by fetches.");
        describe_counter!("ingest_items_saved_total", "Items newly persisted.");
        describe_counter!("ingest_source_errors_total", "Per-source fetch/persist errors.");
        describe_gauge!("ingest_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

pub struct IngestionScheduler {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn Store>,
    cache: Arc<NewsCache>,
    stats: Arc<StatsBoard>,
    pipeline: Arc<ScoringPipeline>,
    sources: Vec<String>,
    retention: ChronoDuration,
    interval: Duration,
    initial_delay: Duration,
    source_pacer: Pacer,
}

impl IngestionScheduler {
    pub fn new(
        cfg: &AppConfig,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn Store>,
        cache: Arc<NewsCache>,
        stats: Arc<StatsBoard>,
        pipeline: Arc<ScoringPipeline>,
    ) -> Self {
        Self {
            fetcher,
            store,
            cache,
            stats,
            pipeline,
            sources: cfg.sources.clone(),
            retention: ChronoDuration::hours(cfg.retention_hours),
            interval: cfg.fetch_interval(),
            initial_delay: cfg.initial_delay(),
            source_pacer: Pacer::new(cfg.source_pause()),
        }
    }

    /// Start the periodic driver: one run after the initial delay, then one
    /// per interval. The task runs for the life of the process.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        ensure_metrics_described();
        tokio::spawn(async move {
            tokio::time::sleep(self.initial_delay).await;
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// Manual refresh, same code path as the schedule. Fire-and-forget.
    pub fn trigger_refresh(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            tracing::info!("manual refresh triggered");
            this.run_cycle().await;
        });
    }

    /// One full ingestion cycle over all configured sources. Individual
    /// source failures are recorded and skipped; the cycle always finishes.
    pub async fn run_cycle(&self) {
        ensure_metrics_described();
        let cutoff = Utc::now() - self.retention;
        match self.store.delete_older_than(cutoff).await {
            Ok(removed) if removed > 0 => {
                tracing::info!(removed, "retention sweep removed old items")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = ?e, "retention sweep failed"),
        }

        self.stats.reset();

        for source in &self.sources {
            if let Err(e) = self.ingest_source(source).await {
                self.stats.set(format!("{source}_error"), 1);
                counter!("ingest_source_errors_total").increment(1);
                tracing::warn!(source = %source, error = ?e, "source skipped this cycle");
            }
            self.source_pacer.pause().await;
        }

        counter!("ingest_cycles_total").increment(1);
        gauge!("ingest_last_cycle_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(sources = self.sources.len(), "ingestion cycle finished");
    }

    async fn ingest_source(&self, source_key: &str) -> Result<()> {
        let started = Instant::now();
        let cutoff = Utc::now() - self.retention;

        let raw = self
            .fetcher
            .fetch_by_key(source_key)
            .await
            .with_context(|| format!("fetching {source_key}"))?;
        self.stats
            .set(format!("{source_key}_fetched"), raw.len() as i64);
        counter!("ingest_items_fetched_total").increment(raw.len() as u64);

        // Placeholder sentiment is assigned in from_raw, so the fetch is
        // durable before any scoring runs. Items without a usable timestamp
        // default to "now" and therefore count as recent.
        let items: Vec<NewsItem> = raw
            .into_iter()
            .map(|r| NewsItem::from_raw(r, source_key))
            .filter(|it| it.published_at >= cutoff)
            .collect();

        // Known identities keep their stored sentiment; only genuinely new
        // items get the provisional save. Re-saving an existing row here
        // would reset it to Processing without ever re-dispatching scoring.
        let mut fresh = Vec::with_capacity(items.len());
        for item in items {
            let exists = self
                .store
                .exists_by_url_and_key(&item.url, &item.source_key)
                .await
                .with_context(|| format!("existence check for {source_key}"))?;
            if !exists {
                fresh.push(item);
            }
        }

        let saved = self
            .store
            .save_batch(fresh)
            .await
            .with_context(|| format!("saving provisional items for {source_key}"))?;
        self.stats
            .set(format!("{source_key}_saved"), saved.len() as i64);
        counter!("ingest_items_saved_total").increment(saved.len() as u64);

        // First refresh: provisional items become visible to readers with
        // their Processing placeholder; the post-scoring refresh below
        // replaces them once real values land.
        self.refresh_cache(source_key).await;

        if !saved.is_empty() {
            let handle = self.pipeline.process_source_async(saved, source_key).await;
            let this = SchedulerRefresh {
                store: self.store.clone(),
                cache: self.cache.clone(),
                retention: self.retention,
                source_key: source_key.to_string(),
            };
            // Continuation on the scoring handle; its failures are logged
            // and never reach the scheduler loop.
            tokio::spawn(async move {
                handle.join().await;
                this.refresh().await;
            });
        }

        self.stats.set(
            format!("{source_key}_time_ms"),
            started.elapsed().as_millis() as i64,
        );
        tracing::info!(source = %source_key, elapsed_ms = started.elapsed().as_millis() as u64, "source ingested");
        Ok(())
    }

    async fn refresh_cache(&self, source_key: &str) {
        let since = Utc::now() - self.retention;
        match self.store.find_recent_by_key(source_key, since).await {
            Ok(items) => self.cache.replace(source_key, items),
            // Keep the previous snapshot; readers see stale data, not errors.
            Err(e) => tracing::warn!(source = %source_key, error = ?e, "cache refresh failed"),
        }
    }
}

/// Cache refresh continuation detached from the scheduler's driver task.
struct SchedulerRefresh {
    store: Arc<dyn Store>,
    cache: Arc<NewsCache>,
    retention: ChronoDuration,
    source_key: String,
}

impl SchedulerRefresh {
    async fn refresh(&self) {
        let since = Utc::now() - self.retention;
        match self.store.find_recent_by_key(&self.source_key, since).await {
            Ok(items) => self.cache.replace(&self.source_key, items),
            Err(e) => {
                tracing::warn!(source = %self.source_key, error = ?e, "post-scoring cache refresh failed")
            }
        }
    }
}
