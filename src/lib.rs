// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod lexicon;
pub mod metrics;
pub mod model;
pub mod pacing;
pub mod pipeline;
pub mod pool;
pub mod preprocess;
pub mod scheduler;
pub mod sentiment;
pub mod stats;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::model::{NewsItem, RawItem};
pub use crate::sentiment::{SentimentAnalyzer, SentimentLabel, SentimentResult};

use std::sync::Arc;

use crate::batch::BatchAnalyzer;
use crate::cache::NewsCache;
use crate::config::AppConfig;
use crate::fetch::Fetcher;
use crate::pacing::Pacer;
use crate::pipeline::ScoringPipeline;
use crate::pool::WorkerPool;
use crate::scheduler::IngestionScheduler;
use crate::stats::StatsBoard;
use crate::store::Store;

/// Fully wired pipeline components over an arbitrary fetcher and store.
/// The binary and the end-to-end tests build the same graph through this.
pub struct App {
    pub state: AppState,
    pub scheduler: Arc<IngestionScheduler>,
}

impl App {
    pub fn build(cfg: &AppConfig, fetcher: Arc<dyn Fetcher>, store: Arc<dyn Store>) -> Self {
        let analyzer = Arc::new(SentimentAnalyzer::new());
        let cache = Arc::new(NewsCache::new());
        let stats = Arc::new(StatsBoard::new());

        let scoring_pool = WorkerPool::new(cfg.scoring_workers, "scoring");
        let reprocess_pool = WorkerPool::new(cfg.reprocess_workers, "reprocess");
        let batch = Arc::new(BatchAnalyzer::new(analyzer.clone(), scoring_pool.clone()));

        let pipeline = Arc::new(ScoringPipeline::new(
            batch,
            store.clone(),
            stats.clone(),
            scoring_pool,
            reprocess_pool,
            cfg.chunk_size,
            Pacer::new(cfg.chunk_pause()),
            cfg.low_confidence_threshold,
        ));

        let scheduler = Arc::new(IngestionScheduler::new(
            cfg,
            fetcher,
            store.clone(),
            cache.clone(),
            stats.clone(),
            pipeline.clone(),
        ));

        let state = AppState {
            analyzer,
            cache,
            stats,
            store,
            scheduler: scheduler.clone(),
            pipeline,
        };

        Self { state, scheduler }
    }
}
