//! In-memory implementations of the three external ports, instrumented with
//! call counters so tests can assert on oracle spend and store writes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use mizan_core::embedding::EmbeddingProvider;
use mizan_core::entry::{KnowledgeEntry, Region, ScoredEntry, Stability};
use mizan_core::error::{MizanError, Result};
use mizan_core::oracle::{GenerationRequest, StructuredGenerator};
use mizan_core::store::KnowledgeStore;

// ── Embedding ──────────────────────────────────────────────────────────────

/// Deterministic embedding: the vector depends on the input text, so
/// different content always gets a different embedding.
pub struct MockEmbedding {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn embedding_for(text: &str) -> Vec<f32> {
    let n = text.chars().count() as f32;
    vec![n, n + 1.0, n + 2.0, n + 3.0]
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MizanError::Embedding("mock embedding down".into()));
        }
        Ok(embedding_for(text))
    }

    fn dimension(&self) -> u64 {
        4
    }
}

// ── Store ──────────────────────────────────────────────────────────────────

/// In-memory store honoring the `KnowledgeStore` contract: region-filtered,
/// score-thresholded, limit-capped search over preset candidates.
pub struct MockStore {
    pub entries: Mutex<Vec<(KnowledgeEntry, f32)>>,
    pub fail_search: bool,
    pub search_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub replace_calls: AtomicUsize,
    pub touch_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_search: false,
            search_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            replace_calls: AtomicUsize::new(0),
            touch_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::new()
        }
    }

    /// Seed a retrieval candidate with a fixed similarity score.
    pub fn seed(&self, entry: KnowledgeEntry, score: f32) {
        self.entries.lock().unwrap().push((entry, score));
    }

    pub fn get(&self, id: Uuid) -> Option<KnowledgeEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(e, _)| e.id == id)
            .map(|(e, _)| e.clone())
    }

    pub fn writes(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
            + self.replace_calls.load(Ordering::SeqCst)
            + self.touch_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for MockStore {
    async fn insert(&self, entry: &KnowledgeEntry) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().push((entry.clone(), 1.0));
        Ok(())
    }

    async fn search(
        &self,
        _query: Vec<f32>,
        region: Region,
        min_score: f32,
        limit: u64,
    ) -> Result<Vec<ScoredEntry>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(MizanError::Store("mock store down".into()));
        }

        let mut results: Vec<ScoredEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, score)| e.region == region && *score >= min_score)
            .map(|(e, score)| ScoredEntry {
                entry: e.clone(),
                score: *score,
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn replace_content(&self, entry: &KnowledgeEntry) -> Result<()> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        if let Some((existing, _)) = entries.iter_mut().find(|(e, _)| e.id == entry.id) {
            *existing = entry.clone();
        }
        Ok(())
    }

    async fn touch_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> Result<()> {
        self.touch_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        if let Some((existing, _)) = entries.iter_mut().find(|(e, _)| e.id == id) {
            existing.last_verified_at = verified_at;
        }
        Ok(())
    }

    async fn entry_count(&self) -> Result<u64> {
        Ok(self.entries.lock().unwrap().len() as u64)
    }
}

// ── Oracle ─────────────────────────────────────────────────────────────────

pub struct MockOracle {
    pub responses: Mutex<VecDeque<serde_json::Value>>,
    pub fail: bool,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl MockOracle {
    pub fn returning(responses: Vec<serde_json::Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fail: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fail: true,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(response: serde_json::Value, delay: Duration) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([response])),
            fail: false,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredGenerator for MockOracle {
    async fn generate(&self, _request: &GenerationRequest) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(MizanError::Oracle("mock oracle down".into()));
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MizanError::Oracle("mock oracle exhausted".into()))
    }
}

// ── Fixtures ───────────────────────────────────────────────────────────────

pub fn entry_aged_days(
    content: &str,
    region: Region,
    stability: Stability,
    age_days: i64,
) -> KnowledgeEntry {
    KnowledgeEntry {
        id: Uuid::new_v4(),
        content: content.to_string(),
        source_ref: None,
        region,
        stability,
        last_verified_at: Utc::now() - chrono::Duration::days(age_days),
        embedding: embedding_for(content),
    }
}
