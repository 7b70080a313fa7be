//! # News Source Seam
//! The scheduler consumes news through the `Fetcher` trait. `NewsApiFetcher`
//! talks to a NewsAPI-style `top-headlines` endpoint; `StaticFetcher` serves
//! canned headlines per key for tests and keyless local runs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::model::RawItem;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the current raw items for one source key (e.g. a country code).
    /// An empty result is valid; failures surface as errors, never panics.
    async fn fetch_by_key(&self, source_key: &str) -> Result<Vec<RawItem>>;
}

// --- NewsAPI-style HTTP client -------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    source: Option<ApiSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewsApiFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl NewsApiFetcher {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, page_size: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size,
        }
    }
}

#[async_trait]
impl Fetcher for NewsApiFetcher {
    async fn fetch_by_key(&self, source_key: &str) -> Result<Vec<RawItem>> {
        let page_size = self.page_size.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("country", source_key),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("requesting headlines for {source_key}"))?
            .error_for_status()
            .with_context(|| format!("headlines request for {source_key} rejected"))?;

        let body: ApiResponse = resp
            .json()
            .await
            .with_context(|| format!("decoding headlines for {source_key}"))?;

        // Records without a title or url carry nothing scorable or dedupable.
        let items = body
            .articles
            .into_iter()
            .filter_map(|a| {
                Some(RawItem {
                    title: a.title?,
                    description: a.description,
                    url: a.url?,
                    published_at: a.published_at,
                    source_name: a.source.and_then(|s| s.name),
                })
            })
            .collect();

        Ok(items)
    }
}

// --- Canned fetcher -------------------------------------------------------

/// Fixed raw items per source key. Unknown keys return an empty list.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    by_key: HashMap<String, Vec<RawItem>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, source_key: &str, items: Vec<RawItem>) -> Self {
        self.by_key.insert(source_key.to_string(), items);
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_by_key(&self, source_key: &str) -> Result<Vec<RawItem>> {
        Ok(self.by_key.get(source_key).cloned().unwrap_or_default())
    }
}
