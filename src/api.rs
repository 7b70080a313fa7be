//! # Query Surface
//! Thin Axum router over the cache, stats board, store, and scorer. All
//! mutation endpoints are fire-and-forget and reuse the same code paths as
//! the scheduled cycle.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower_http::cors::CorsLayer;

use crate::cache::NewsCache;
use crate::model::NewsItem;
use crate::pipeline::ScoringPipeline;
use crate::scheduler::IngestionScheduler;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel, SentimentResult};
use crate::stats::StatsBoard;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SentimentAnalyzer>,
    pub cache: Arc<NewsCache>,
    pub stats: Arc<StatsBoard>,
    pub store: Arc<dyn Store>,
    pub scheduler: Arc<IngestionScheduler>,
    pub pipeline: Arc<ScoringPipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/analyze", post(analyze))
        .route("/api/news", get(news))
        .route("/api/news/cached", get(cached))
        .route("/api/news/countries", get(countries))
        .route("/api/news/sentiments", get(sentiment_counts))
        .route("/api/news/stats", get(processing_stats))
        .route("/api/news/last-updated", get(last_updated))
        .route("/api/news/refresh", post(refresh))
        .route("/api/news/reprocess", post(reprocess))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Json<SentimentResult> {
    Json(state.analyzer.analyze(&body.text))
}

#[derive(Deserialize)]
struct NewsQuery {
    country: Option<String>,
    sentiment: Option<String>,
}

fn country_of(q: &NewsQuery) -> String {
    q.country
        .as_deref()
        .unwrap_or("us")
        .trim()
        .to_lowercase()
}

fn parse_label(s: &str) -> Option<SentimentLabel> {
    match s.to_uppercase().as_str() {
        "POSITIVE" => Some(SentimentLabel::Positive),
        "NEGATIVE" => Some(SentimentLabel::Negative),
        "NEUTRAL" => Some(SentimentLabel::Neutral),
        "PROCESSING" => Some(SentimentLabel::Processing),
        _ => None,
    }
}

async fn news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Json<Vec<NewsItem>> {
    let country = country_of(&q);
    let items = match state.store.find_by_key(&country).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(source = %country, error = ?e, "news lookup failed");
            Vec::new()
        }
    };

    let filtered = match q.sentiment.as_deref().and_then(parse_label) {
        Some(label) => items
            .into_iter()
            .filter(|it| it.sentiment_label == label)
            .collect(),
        None => items,
    };
    Json(filtered)
}

async fn cached(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Json<Vec<NewsItem>> {
    let country = country_of(&q);
    Json(state.cache.get(&country).as_ref().clone())
}

async fn countries(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.cache.keys())
}

async fn sentiment_counts(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Json<HashMap<String, usize>> {
    let country = country_of(&q);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in state.cache.get(&country).iter() {
        let key = serde_json::to_value(item.sentiment_label)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    Json(counts)
}

async fn processing_stats(State(state): State<AppState>) -> Json<HashMap<String, i64>> {
    Json(state.stats.snapshot())
}

#[derive(Serialize)]
struct LastUpdated {
    last_updated: String,
}

async fn last_updated(State(state): State<AppState>) -> Json<LastUpdated> {
    Json(LastUpdated {
        last_updated: state.cache.last_updated().to_rfc3339(),
    })
}

async fn refresh(State(state): State<AppState>) -> &'static str {
    state.scheduler.trigger_refresh();
    "refresh triggered"
}

async fn reprocess(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> String {
    let country = country_of(&q);
    let pipeline = state.pipeline.clone();
    let key = country.clone();
    tokio::spawn(async move {
        pipeline.reprocess_source(&key).await;
    });
    format!("reprocessing triggered for {country}")
}
