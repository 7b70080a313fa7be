//! # Pipeline Configuration
//! Defaults cover a local run; every knob can be overridden from the
//! environment, and `PIPELINE_CONFIG_PATH` may point at a TOML file that is
//! applied before the env overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source keys polled each cycle, in order.
    pub sources: Vec<String>,
    pub fetch_interval_secs: u64,
    pub initial_delay_secs: u64,
    pub retention_hours: i64,
    pub chunk_size: usize,
    pub chunk_pause_ms: u64,
    pub source_pause_ms: u64,
    pub scoring_workers: usize,
    pub reprocess_workers: usize,
    pub low_confidence_threshold: f64,
    pub newsapi_url: String,
    pub newsapi_page_size: usize,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: ["us", "gb", "ca", "au", "in", "de", "fr"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fetch_interval_secs: 900,
            initial_delay_secs: 5,
            retention_hours: 24,
            chunk_size: 20,
            chunk_pause_ms: 100,
            source_pause_ms: 1000,
            scoring_workers: 4,
            reprocess_workers: 2,
            low_confidence_threshold: 0.3,
            newsapi_url: "https://newsapi.org/v2/top-headlines".to_string(),
            newsapi_page_size: 50,
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the optional TOML file, then env.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PIPELINE_SOURCES") {
            let sources: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !sources.is_empty() {
                self.sources = sources;
            }
        }
        read_env("PIPELINE_FETCH_INTERVAL_SECS", &mut self.fetch_interval_secs);
        read_env("PIPELINE_INITIAL_DELAY_SECS", &mut self.initial_delay_secs);
        read_env("PIPELINE_RETENTION_HOURS", &mut self.retention_hours);
        read_env("PIPELINE_CHUNK_SIZE", &mut self.chunk_size);
        read_env("PIPELINE_CHUNK_PAUSE_MS", &mut self.chunk_pause_ms);
        read_env("PIPELINE_SOURCE_PAUSE_MS", &mut self.source_pause_ms);
        if let Ok(v) = std::env::var("PIPELINE_BIND_ADDR") {
            self.bind_addr = v;
        }
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn chunk_pause(&self) -> Duration {
        Duration::from_millis(self.chunk_pause_ms)
    }

    pub fn source_pause(&self) -> Duration {
        Duration::from_millis(self.source_pause_ms)
    }
}

fn read_env<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(v) = std::env::var(name) {
        if let Ok(parsed) = v.parse() {
            *target = parsed;
        }
    }
}
