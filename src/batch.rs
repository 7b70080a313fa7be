//! # Batch Analyzer
//! Fans distinct texts out across the bounded scoring pool and collects a
//! map keyed by the literal text. Identical texts inside a batch (shared
//! headlines are common across outlets) are scored once.
//!
//! Results are memoized in a content-addressed table keyed by the exact
//! input text, with one writer per key: the first caller computes, and
//! concurrent requests for the same text await the in-flight cell instead of
//! recomputing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::pool::WorkerPool;
use crate::sentiment::{SentimentAnalyzer, SentimentResult};

/// Memo table cap; the table is dropped wholesale when it grows past this.
const MEMO_CAP: usize = 10_000;

pub struct BatchAnalyzer {
    analyzer: Arc<SentimentAnalyzer>,
    pool: WorkerPool,
    memo: Mutex<HashMap<String, Arc<OnceCell<SentimentResult>>>>,
}

impl BatchAnalyzer {
    pub fn new(analyzer: Arc<SentimentAnalyzer>, pool: WorkerPool) -> Self {
        Self {
            analyzer,
            pool,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Score every distinct text in `texts`. The returned map has exactly one
    /// entry per distinct input text.
    pub async fn analyze_many(&self, texts: &[String]) -> HashMap<String, SentimentResult> {
        let distinct: HashSet<&String> = texts.iter().collect();
        let mut handles = Vec::with_capacity(distinct.len());

        for text in distinct {
            let cell = self.memo_cell(text);
            let analyzer = self.analyzer.clone();
            let text = text.clone();

            let handle = self
                .pool
                .submit(async move {
                    let result = *cell
                        .get_or_init(|| async { analyzer.analyze(&text) })
                        .await;
                    (text, result)
                })
                .await;
            handles.push(handle);
        }

        let mut out = HashMap::new();
        for handle in handles {
            if let Some((text, result)) = handle.join().await {
                out.insert(text, result);
            }
        }

        // Completeness: a lost task (panic) must not leave a hole; the
        // affected text is scored directly on this task instead.
        for text in texts {
            if !out.contains_key(text) {
                out.insert(text.clone(), self.analyzer.analyze(text));
            }
        }

        out
    }

    fn memo_cell(&self, text: &str) -> Arc<OnceCell<SentimentResult>> {
        let mut memo = self.memo.lock().expect("memo mutex poisoned");
        if memo.len() > MEMO_CAP {
            memo.clear();
        }
        memo.entry(text.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;

    fn batch() -> BatchAnalyzer {
        BatchAnalyzer::new(
            Arc::new(SentimentAnalyzer::new()),
            WorkerPool::new(4, "scoring-test"),
        )
    }

    #[tokio::test]
    async fn duplicate_texts_collapse_to_one_entry() {
        let b = batch();
        let texts = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let out = b.analyze_many(&texts).await;
        assert_eq!(out.len(), 2);
        assert!(out.contains_key("a"));
        assert!(out.contains_key("b"));
    }

    #[tokio::test]
    async fn every_input_text_has_an_entry() {
        let b = batch();
        let texts: Vec<String> = (0..50).map(|i| format!("headline number {i}")).collect();
        let out = b.analyze_many(&texts).await;
        for t in &texts {
            assert!(out.contains_key(t), "missing entry for {t}");
        }
    }

    #[tokio::test]
    async fn results_match_direct_analysis() {
        let b = batch();
        let texts = vec![
            "Stocks surge on strong earnings".to_string(),
            "Factory explosion injures workers".to_string(),
        ];
        let out = b.analyze_many(&texts).await;
        assert_eq!(out[&texts[0]].label, SentimentLabel::Positive);
        assert_eq!(out[&texts[1]].label, SentimentLabel::Negative);

        let direct = SentimentAnalyzer::new().analyze(&texts[0]);
        assert_eq!(out[&texts[0]], direct);
    }

    #[tokio::test]
    async fn memoized_result_is_reused() {
        let b = batch();
        let texts = vec!["repeatable headline".to_string()];
        let first = b.analyze_many(&texts).await;
        let second = b.analyze_many(&texts).await;
        assert_eq!(first[&texts[0]], second[&texts[0]]);
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_map() {
        let b = batch();
        assert!(b.analyze_many(&[]).await.is_empty());
    }
}
