use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Jurisdiction a cached legal text belongs to. Closed set, immutable after
/// creation; West Bank and Gaza operate under different bodies of law.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Westbank,
    Gaza,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Westbank => "westbank",
            Region::Gaza => "gaza",
        }
    }
}

/// How likely a piece of statutory text is to change over time. Assigned once
/// by the extraction oracle at harvest time and never re-classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    High,
    Medium,
    Low,
}

impl Stability {
    /// Maximum age before a cached entry must be revalidated. Medium and low
    /// share the short bucket.
    pub fn ttl(&self) -> Duration {
        match self {
            Stability::High => Duration::days(180),
            Stability::Medium | Stability::Low => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::High => "high",
            Stability::Medium => "medium",
            Stability::Low => "low",
        }
    }

    /// Parse an oracle-reported stability class. Unknown strings fall back to
    /// the shortest TTL.
    pub fn parse(s: &str) -> Stability {
        match s.to_lowercase().as_str() {
            "high" => Stability::High,
            "medium" => Stability::Medium,
            "low" => Stability::Low,
            other => {
                tracing::warn!(stability = %other, "Unknown stability class, defaulting to low");
                Stability::Low
            }
        }
    }
}

/// One cached unit of statutory or regulatory text with its retrieval
/// embedding and freshness metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub content: String,
    pub source_ref: Option<String>,
    pub region: Region,
    pub stability: Stability,
    pub last_verified_at: DateTime<Utc>,
    pub embedding: Vec<f32>,
}

impl KnowledgeEntry {
    pub fn new(
        content: String,
        source_ref: Option<String>,
        region: Region,
        stability: Stability,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source_ref,
            region,
            stability,
            last_verified_at: Utc::now(),
            embedding,
        }
    }

    /// An entry is stale once its age reaches the TTL for its stability
    /// class; exactly at the boundary counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.last_verified_at >= self.stability.ttl()
    }
}

/// A retrieval candidate together with its cosine similarity score.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: f32,
}
