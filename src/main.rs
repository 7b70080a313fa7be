//! Binary entrypoint: wires the fetcher, store, scoring pipeline, and
//! scheduler, then serves the query API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_sentiment_pipeline::config::AppConfig;
use news_sentiment_pipeline::fetch::{Fetcher, NewsApiFetcher, StaticFetcher};
use news_sentiment_pipeline::metrics::Metrics;
use news_sentiment_pipeline::store::MemoryStore;
use news_sentiment_pipeline::App;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_sentiment_pipeline=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load().context("loading configuration")?;
    let metrics = Metrics::init(cfg.fetch_interval_secs);

    // Without an API key there is nothing to fetch from the wire; fall back
    // to the canned fetcher so a local run still exercises the pipeline.
    let fetcher: Arc<dyn Fetcher> = match std::env::var("NEWSAPI_KEY") {
        Ok(key) if !key.trim().is_empty() => Arc::new(NewsApiFetcher::new(
            cfg.newsapi_url.clone(),
            key,
            cfg.newsapi_page_size,
        )),
        _ => {
            tracing::warn!("NEWSAPI_KEY not set; using the canned fetcher");
            Arc::new(StaticFetcher::new())
        }
    };
    let store = Arc::new(MemoryStore::new());

    let app = App::build(&cfg, fetcher, store);

    // The scheduler loop failing to start is the one fatal error class;
    // everything inside a cycle is absorbed and logged.
    let _driver = app.scheduler.clone().spawn();

    let router = news_sentiment_pipeline::create_router(app.state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "serving query API");
    axum::serve(listener, router).await.context("serving API")?;

    Ok(())
}
