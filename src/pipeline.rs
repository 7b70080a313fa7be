//! # Async Scoring Pipeline
//! Takes one source's freshly persisted items, scores them in fixed-size
//! chunks, and writes each chunk back as it completes. The caller gets a
//! handle immediately; the run itself happens on the scoring pool. A run
//! always drains to completion or to its own error; chunk persistence
//! failures are absorbed per chunk so one bad write never abandons the rest
//! of the source.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;

use crate::batch::BatchAnalyzer;
use crate::model::NewsItem;
use crate::pacing::Pacer;
use crate::pool::{TaskHandle, WorkerPool};
use crate::sentiment::SentimentResult;
use crate::stats::StatsBoard;
use crate::store::Store;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_chunks_total", "Chunks scored and persisted.");
        describe_counter!(
            "scoring_chunk_errors_total",
            "Chunks that failed to persist."
        );
        describe_histogram!("scoring_source_ms", "Per-source scoring time in milliseconds.");
    });
}

pub struct ScoringPipeline {
    batch: Arc<BatchAnalyzer>,
    store: Arc<dyn Store>,
    stats: Arc<StatsBoard>,
    scoring_pool: WorkerPool,
    reprocess_pool: WorkerPool,
    chunk_size: usize,
    chunk_pacer: Pacer,
    low_confidence_threshold: f64,
}

impl ScoringPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        batch: Arc<BatchAnalyzer>,
        store: Arc<dyn Store>,
        stats: Arc<StatsBoard>,
        scoring_pool: WorkerPool,
        reprocess_pool: WorkerPool,
        chunk_size: usize,
        chunk_pacer: Pacer,
        low_confidence_threshold: f64,
    ) -> Self {
        Self {
            batch,
            store,
            stats,
            scoring_pool,
            reprocess_pool,
            chunk_size: chunk_size.max(1),
            chunk_pacer,
            low_confidence_threshold,
        }
    }

    /// Score and persist `items` for one source. Non-blocking: returns a
    /// completion handle while the run proceeds on the scoring pool. Other
    /// sources' runs are unaffected by this one's outcome.
    pub async fn process_source_async(
        self: &Arc<Self>,
        items: Vec<NewsItem>,
        source_key: &str,
    ) -> TaskHandle<()> {
        ensure_metrics_described();
        self.stats
            .set(format!("{source_key}_processing"), items.len() as i64);

        let this = self.clone();
        let key = source_key.to_string();
        self.scoring_pool
            .submit(async move { this.run_source(items, &key).await })
            .await
    }

    /// Re-score items whose sentiment never landed (still `Processing`) or
    /// landed with low confidence. Runs on the reprocess pool so it cannot
    /// starve scheduled ingestion.
    pub async fn reprocess_source(self: &Arc<Self>, source_key: &str) -> TaskHandle<()> {
        let this = self.clone();
        let key = source_key.to_string();
        self.reprocess_pool
            .submit(async move {
                match this
                    .store
                    .find_low_confidence(&key, this.low_confidence_threshold)
                    .await
                {
                    Ok(items) if items.is_empty() => {
                        tracing::info!(source = %key, "no items need reprocessing");
                    }
                    Ok(items) => {
                        this.stats
                            .set(format!("{key}_processing"), items.len() as i64);
                        this.run_source(items, &key).await;
                    }
                    Err(e) => {
                        tracing::warn!(source = %key, error = ?e, "reprocess lookup failed");
                    }
                }
            })
            .await
    }

    async fn run_source(&self, mut items: Vec<NewsItem>, source_key: &str) {
        let started = Instant::now();
        let total = items.len();
        let total_chunks = total.div_ceil(self.chunk_size);

        tracing::info!(source = %source_key, items = total, chunks = total_chunks, "scoring source");

        match self.score_chunks(&mut items, source_key, total_chunks).await {
            Ok(()) => {
                let elapsed = started.elapsed().as_millis() as i64;
                self.stats
                    .set(format!("{source_key}_completed"), total as i64);
                self.stats.set(format!("{source_key}_scoring_ms"), elapsed);
                histogram!("scoring_source_ms").record(elapsed as f64);
                tracing::info!(source = %source_key, items = total, elapsed_ms = elapsed, "scoring completed");
            }
            Err(e) => {
                // This source's run stops here; sources already dispatched
                // elsewhere are unaffected.
                self.stats.set(format!("{source_key}_scoring_error"), 1);
                tracing::error!(source = %source_key, error = ?e, "scoring run failed");
            }
        }
    }

    async fn score_chunks(
        &self,
        items: &mut [NewsItem],
        source_key: &str,
        total_chunks: usize,
    ) -> Result<()> {
        for (idx, chunk) in items.chunks_mut(self.chunk_size).enumerate() {
            if let Err(e) = self.score_chunk(chunk, source_key).await {
                // Chunks are independent units of work; keep going.
                counter!("scoring_chunk_errors_total").increment(1);
                tracing::warn!(
                    source = %source_key,
                    chunk = idx + 1,
                    chunks = total_chunks,
                    error = ?e,
                    "chunk failed"
                );
            } else {
                counter!("scoring_chunks_total").increment(1);
                tracing::debug!(
                    source = %source_key,
                    chunk = idx + 1,
                    chunks = total_chunks,
                    "chunk persisted"
                );
            }
            self.chunk_pacer.pause().await;
        }
        Ok(())
    }

    async fn score_chunk(&self, chunk: &mut [NewsItem], source_key: &str) -> Result<()> {
        let texts: Vec<String> = chunk.iter().map(NewsItem::analysis_text).collect();
        let results = self.batch.analyze_many(&texts).await;

        for (item, text) in chunk.iter_mut().zip(&texts) {
            match results.get(text) {
                Some(result) => item.set_sentiment(result),
                None => item.set_sentiment(&SentimentResult::neutral()),
            }
        }

        self.store
            .save_batch(chunk.to_vec())
            .await
            .with_context(|| format!("persisting scored chunk for {source_key}"))?;
        Ok(())
    }
}
