use std::sync::Arc;

use chrono::Utc;

use mizan_core::embedding::EmbeddingProvider;
use mizan_core::entry::{KnowledgeEntry, Region};
use mizan_core::policy::{SIMILARITY_THRESHOLD, TOP_K};
use mizan_core::store::KnowledgeStore;

use crate::verify::Verifier;

/// Header prepended to the assembled context block ("Relevant legal texts:").
const CONTEXT_HEADER: &str = "نصوص قانونية ذات صلة:";

/// Answers "what statutory text is relevant to this query" from the cache,
/// revalidating entries that have outlived their stability TTL along the way.
///
/// Every failure path degrades to the empty string; a cache miss must never
/// block or error the conversational turn it serves.
pub struct RetrievalCoordinator {
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
    verifier: Arc<Verifier>,
}

fn format_context(entries: &[KnowledgeEntry]) -> String {
    let mut out = String::from(CONTEXT_HEADER);
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, entry.content));
    }
    out
}

impl RetrievalCoordinator {
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
        verifier: Arc<Verifier>,
    ) -> Self {
        Self {
            embedding,
            store,
            verifier,
        }
    }

    /// Assemble the context block for a query, or the empty string when
    /// nothing relevant is cached or a dependency is down.
    pub async fn get_context(&self, query: &str, region: Region) -> String {
        let vector = match self.embedding.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding failed, treating as cache miss");
                return String::new();
            }
        };

        let candidates = match self
            .store
            .search(vector, region, SIMILARITY_THRESHOLD, TOP_K)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge store unavailable, treating as cache miss");
                return String::new();
            }
        };

        if candidates.is_empty() {
            tracing::debug!(region = region.as_str(), "No entries above similarity threshold");
            return String::new();
        }

        let now = Utc::now();
        let mut entries = Vec::with_capacity(candidates.len());

        for scored in candidates {
            let entry = if scored.entry.is_stale(now) {
                // Revalidation runs inline; the refreshed (or, on failure,
                // unchanged) content goes into this turn's context.
                self.verifier.verify(&scored.entry).await
            } else {
                scored.entry
            };
            entries.push(entry);
        }

        tracing::info!(
            region = region.as_str(),
            entries = entries.len(),
            "Assembled legal context"
        );

        format_context(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mizan_core::entry::Stability;

    fn entry(content: &str) -> KnowledgeEntry {
        KnowledgeEntry::new(
            content.to_string(),
            None,
            Region::Westbank,
            Stability::High,
            vec![0.0; 4],
        )
    }

    #[test]
    fn format_context_numbers_entries() {
        let entries = vec![entry("النص الأول"), entry("النص الثاني")];
        let out = format_context(&entries);
        assert!(out.starts_with(CONTEXT_HEADER));
        assert!(out.contains("\n1. النص الأول"));
        assert!(out.contains("\n2. النص الثاني"));
    }

    #[test]
    fn format_context_single_entry() {
        let out = format_context(&[entry("المادة 3")]);
        assert_eq!(out, format!("{CONTEXT_HEADER}\n1. المادة 3"));
    }
}
