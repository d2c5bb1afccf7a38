use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct,
    SearchPointsBuilder, SetPayloadPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
    VectorsOutput,
};
use qdrant_client::Qdrant;
use uuid::Uuid;

use mizan_core::config::AppConfig;
use mizan_core::entry::{KnowledgeEntry, Region, ScoredEntry, Stability};
use mizan_core::error::{MizanError, Result};
use mizan_core::store::KnowledgeStore;

const COLLECTION_NAME: &str = "legal_knowledge";

/// Timeout for all qdrant operations (seconds).
const QDRANT_TIMEOUT_SECS: u64 = 5;

/// Vector-backed knowledge store on qdrant. One collection holds both
/// regions; every query filters on the `region` payload field.
pub struct QdrantKnowledgeStore {
    client: Qdrant,
    dimension: u64,
}

/// Wrap any async operation with a timeout, converting timeout to MizanError::Store.
async fn timed<T, F: Future<Output = T>>(op: F) -> std::result::Result<T, MizanError> {
    tokio::time::timeout(std::time::Duration::from_secs(QDRANT_TIMEOUT_SECS), op)
        .await
        .map_err(|_| {
            tracing::warn!("qdrant operation timed out after {}s", QDRANT_TIMEOUT_SECS);
            MizanError::Store(format!(
                "qdrant operation timed out after {}s",
                QDRANT_TIMEOUT_SECS
            ))
        })
}

fn entry_to_payload(entry: &KnowledgeEntry) -> HashMap<String, Value> {
    let mut payload = HashMap::new();

    payload.insert("id".to_string(), entry.id.to_string().into());
    payload.insert("content".to_string(), entry.content.clone().into());
    payload.insert("region".to_string(), entry.region.as_str().into());
    payload.insert("stability".to_string(), entry.stability.as_str().into());
    payload.insert(
        "last_verified_at".to_string(),
        entry.last_verified_at.to_rfc3339().into(),
    );
    if let Some(ref source_ref) = entry.source_ref {
        payload.insert("source_ref".to_string(), source_ref.clone().into());
    }

    payload
}

fn get_string_value(payload: &HashMap<String, Value>, key: &str) -> Result<String> {
    let value = payload
        .get(key)
        .ok_or_else(|| MizanError::Store(format!("Missing payload field: {key}")))?;
    match &value.kind {
        Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => Ok(s.clone()),
        _ => Err(MizanError::Store(format!(
            "Invalid type for payload field: {key}"
        ))),
    }
}

fn parse_region(s: &str) -> Result<Region> {
    match s {
        "westbank" => Ok(Region::Westbank),
        "gaza" => Ok(Region::Gaza),
        other => Err(MizanError::Store(format!("Unknown region tag: {other}"))),
    }
}

fn point_vector(vectors: Option<VectorsOutput>) -> Vec<f32> {
    match vectors.and_then(|v| v.vectors_options) {
        Some(VectorsOptions::Vector(v)) => v.data,
        _ => Vec::new(),
    }
}

fn payload_to_entry(
    payload: &HashMap<String, Value>,
    embedding: Vec<f32>,
) -> Result<KnowledgeEntry> {
    let id_str = get_string_value(payload, "id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| MizanError::Store(format!("Invalid entry UUID: {e}")))?;

    let content = get_string_value(payload, "content")?;
    let region = parse_region(&get_string_value(payload, "region")?)?;
    let stability = Stability::parse(&get_string_value(payload, "stability")?);
    let source_ref = get_string_value(payload, "source_ref").ok();

    let verified_str = get_string_value(payload, "last_verified_at")?;
    let last_verified_at = DateTime::parse_from_rfc3339(&verified_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MizanError::Store(format!("Invalid last_verified_at timestamp: {e}")))?;

    Ok(KnowledgeEntry {
        id,
        content,
        source_ref,
        region,
        stability,
        last_verified_at,
        embedding,
    })
}

impl QdrantKnowledgeStore {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.qdrant_url)
            .build()
            .map_err(|e| MizanError::Store(format!("Failed to create qdrant client: {e}")))?;

        tracing::info!(url = %config.qdrant_url, "Created qdrant client");

        Ok(Self {
            client,
            dimension: config.embedding_dimension,
        })
    }

    /// Create the knowledge collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        let exists = timed(self.client.collection_exists(COLLECTION_NAME))
            .await?
            .map_err(|e| MizanError::Store(format!("Failed to check collection: {e}")))?;

        if !exists {
            timed(
                self.client.create_collection(
                    CreateCollectionBuilder::new(COLLECTION_NAME).vectors_config(
                        VectorParamsBuilder::new(self.dimension, Distance::Cosine),
                    ),
                ),
            )
            .await?
            .map_err(|e| MizanError::Store(format!("Failed to create collection: {e}")))?;

            tracing::info!(
                collection = COLLECTION_NAME,
                dimension = self.dimension,
                "Created qdrant collection"
            );
        }

        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        timed(self.client.collection_exists(COLLECTION_NAME))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false)
    }

    async fn upsert_entry(&self, entry: &KnowledgeEntry) -> Result<()> {
        if entry.embedding.len() as u64 != self.dimension {
            return Err(MizanError::Store(format!(
                "Invalid embedding dimension: expected {}, got {}",
                self.dimension,
                entry.embedding.len()
            )));
        }

        let point = PointStruct::new(
            entry.id.to_string(),
            entry.embedding.clone(),
            entry_to_payload(entry),
        );

        timed(
            self.client
                .upsert_points(UpsertPointsBuilder::new(COLLECTION_NAME, vec![point])),
        )
        .await?
        .map_err(|e| MizanError::Store(format!("Failed to upsert entry {}: {e}", entry.id)))?;

        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for QdrantKnowledgeStore {
    async fn insert(&self, entry: &KnowledgeEntry) -> Result<()> {
        self.upsert_entry(entry).await?;

        tracing::debug!(
            entry_id = %entry.id,
            region = entry.region.as_str(),
            stability = entry.stability.as_str(),
            content_len = entry.content.len(),
            "Inserted knowledge entry"
        );

        Ok(())
    }

    async fn search(
        &self,
        query: Vec<f32>,
        region: Region,
        min_score: f32,
        limit: u64,
    ) -> Result<Vec<ScoredEntry>> {
        let filter = Filter::must([Condition::matches(
            "region",
            region.as_str().to_string(),
        )]);

        let search_result = timed(
            self.client.search_points(
                SearchPointsBuilder::new(COLLECTION_NAME, query, limit)
                    .filter(filter)
                    .score_threshold(min_score)
                    .with_payload(true)
                    .with_vectors(true),
            ),
        )
        .await?
        .map_err(|e| MizanError::Store(format!("Failed to search entries: {e}")))?;

        let mut entries = Vec::with_capacity(search_result.result.len());
        for scored_point in search_result.result {
            let score = scored_point.score;
            let vector = point_vector(scored_point.vectors);
            match payload_to_entry(&scored_point.payload, vector) {
                Ok(entry) => entries.push(ScoredEntry { entry, score }),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed entry payload");
                }
            }
        }

        tracing::debug!(
            region = region.as_str(),
            results = entries.len(),
            "Similarity search completed"
        );

        Ok(entries)
    }

    async fn replace_content(&self, entry: &KnowledgeEntry) -> Result<()> {
        self.upsert_entry(entry).await?;

        tracing::debug!(
            entry_id = %entry.id,
            content_len = entry.content.len(),
            "Replaced entry content"
        );

        Ok(())
    }

    async fn touch_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> Result<()> {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(
            "last_verified_at".to_string(),
            verified_at.to_rfc3339().into(),
        );

        timed(
            self.client.set_payload(
                SetPayloadPointsBuilder::new(COLLECTION_NAME, payload)
                    .points_selector(vec![PointId::from(id.to_string())]),
            ),
        )
        .await?
        .map_err(|e| MizanError::Store(format!("Failed to refresh entry {id}: {e}")))?;

        tracing::debug!(entry_id = %id, "Refreshed verification timestamp");

        Ok(())
    }

    async fn entry_count(&self) -> Result<u64> {
        let response = timed(
            self.client
                .count(CountPointsBuilder::new(COLLECTION_NAME).exact(true)),
        )
        .await?
        .map_err(|e| MizanError::Store(format!("Failed to count entries: {e}")))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}
