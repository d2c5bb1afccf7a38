use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use mizan_core::embedding::EmbeddingProvider;
use mizan_core::entry::KnowledgeEntry;
use mizan_core::error::Result;
use mizan_core::oracle::{GenerationRequest, StructuredGenerator};
use mizan_core::store::KnowledgeStore;

const VERIFY_MAX_TOKENS: u32 = 2048;

/// Revalidates cached statutory text against a search-augmented model.
///
/// Fail-open by construction: `verify` cannot error, and on any oracle,
/// embedding or store failure the caller gets the input entry back unchanged.
/// A per-entry claim set keeps concurrent readers from duplicating oracle
/// calls: whoever claims first verifies inline, everyone else serves the
/// last-known-good content.
pub struct Verifier {
    oracle: Arc<dyn StructuredGenerator>,
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
    in_flight: Mutex<HashSet<Uuid>>,
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    status: String,
    #[serde(default)]
    new_text: Option<String>,
}

/// Oracle verdict after tolerant parsing. Anything that does not clearly say
/// "this text was superseded, here is the new text" counts as still valid.
#[derive(Debug, PartialEq)]
enum Outcome {
    Valid,
    Modified(String),
}

fn parse_outcome(value: &serde_json::Value) -> Outcome {
    let raw: RawOutcome = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable verification outcome, assuming valid");
            return Outcome::Valid;
        }
    };

    if raw.status.eq_ignore_ascii_case("MODIFIED") {
        match raw.new_text {
            Some(text) if !text.trim().is_empty() => return Outcome::Modified(text),
            _ => {
                tracing::warn!("MODIFIED verdict without replacement text, assuming valid");
            }
        }
    }

    Outcome::Valid
}

fn build_system_prompt() -> String {
    "You are a legal currency checker for Palestinian law. Given a cached \
     statutory text and its jurisdiction, use web search to determine whether \
     the text is still in force or has been amended or superseded.\n\
     \n\
     Return ONLY valid JSON (no markdown fences, no commentary) matching this \
     exact schema:\n\
     \n\
     {\"status\": \"VALID\" | \"MODIFIED\", \"new_text\": \"the current \
     authoritative text, only when status is MODIFIED\"}\n\
     \n\
     Rules:\n\
     - VALID means the cached text still matches the law in force.\n\
     - MODIFIED means it was amended or superseded; new_text MUST carry the \
     full current text in Arabic.\n\
     - When you cannot establish a change with confidence, return VALID.\n\
     - Output ONLY the JSON object."
        .to_string()
}

fn build_user_prompt(entry: &KnowledgeEntry) -> String {
    format!(
        "Jurisdiction: {}\n\nCached statutory text:\n{}",
        entry.region.as_str(),
        entry.content
    )
}

impl Verifier {
    pub fn new(
        oracle: Arc<dyn StructuredGenerator>,
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            oracle,
            embedding,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Revalidate one suspected-stale entry, returning its current form.
    /// Never fails; the worst case is getting the input back unchanged.
    pub async fn verify(&self, entry: &KnowledgeEntry) -> KnowledgeEntry {
        if !self.claim(entry.id).await {
            tracing::debug!(entry_id = %entry.id, "Verification already in flight, serving cached content");
            return entry.clone();
        }

        let result = self.run_verification(entry).await;
        self.release(entry.id).await;

        match result {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(entry_id = %entry.id, error = %e, "Verification failed, serving stale content");
                entry.clone()
            }
        }
    }

    async fn claim(&self, id: Uuid) -> bool {
        self.in_flight.lock().await.insert(id)
    }

    async fn release(&self, id: Uuid) {
        self.in_flight.lock().await.remove(&id);
    }

    async fn run_verification(&self, entry: &KnowledgeEntry) -> Result<KnowledgeEntry> {
        tracing::info!(
            entry_id = %entry.id,
            region = entry.region.as_str(),
            stability = entry.stability.as_str(),
            "Verifying stale entry"
        );

        let request = GenerationRequest {
            system: build_system_prompt(),
            prompt: build_user_prompt(entry),
            max_tokens: VERIFY_MAX_TOKENS,
            web_search: true,
        };

        let value = self.oracle.generate(&request).await?;

        match parse_outcome(&value) {
            Outcome::Modified(new_text) => {
                // Embedding is computed before the write so content and
                // vector land in the store together.
                let new_embedding = self.embedding.embed(&new_text).await?;

                let mut updated = entry.clone();
                updated.content = new_text;
                updated.embedding = new_embedding;
                updated.last_verified_at = Utc::now();

                self.store.replace_content(&updated).await?;

                tracing::info!(
                    entry_id = %entry.id,
                    content_len = updated.content.len(),
                    "Entry superseded, content replaced"
                );

                Ok(updated)
            }
            Outcome::Valid => {
                let now = Utc::now();
                self.store.touch_verified(entry.id, now).await?;

                let mut refreshed = entry.clone();
                refreshed.last_verified_at = now;

                tracing::info!(entry_id = %entry.id, "Entry confirmed valid");

                Ok(refreshed)
            }
        }
    }
}
