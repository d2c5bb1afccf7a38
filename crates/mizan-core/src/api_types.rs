use serde::{Deserialize, Serialize};

use crate::entry::Region;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub qdrant_connected: bool,
    pub entry_count: u64,
}

// --- Context retrieval ---

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextRequest {
    pub query: String,
    pub region: Region,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    /// Formatted context block to prepend to the model prompt; empty when no
    /// relevant cached text exists.
    pub context: String,
}

// --- Harvesting ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestRequest {
    pub answer: String,
    pub region: Region,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestResponse {
    pub inserted: usize,
}
