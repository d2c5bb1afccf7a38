use std::sync::Arc;

use serde::Deserialize;

use mizan_core::embedding::EmbeddingProvider;
use mizan_core::entry::{KnowledgeEntry, Region, Stability};
use mizan_core::oracle::{GenerationRequest, StructuredGenerator};
use mizan_core::policy::{has_legal_markers, MIN_SNIPPET_CHARS};
use mizan_core::store::KnowledgeStore;

const EXTRACT_MAX_TOKENS: u32 = 4096;

/// Mines completed answers for citable statutory snippets and feeds them
/// back into the knowledge base. Purely side-effecting enrichment: nothing
/// here may surface a failure to the conversational flow.
pub struct HarvestingAgent {
    oracle: Arc<dyn StructuredGenerator>,
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
}

// ── Extraction oracle output schema ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ExtractionOutput {
    #[serde(default)]
    articles: Vec<ExtractedArticle>,
}

#[derive(Debug, Deserialize)]
struct ExtractedArticle {
    text: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    stability: Option<String>,
}

fn build_system_prompt() -> String {
    "You are a legal citation extractor for Palestinian law. Given an answer \
     written by a legal assistant, extract every verbatim statutory or \
     regulatory text it quotes (article texts, decree-law provisions).\n\
     \n\
     Return ONLY valid JSON (no markdown fences, no commentary) matching this \
     exact schema:\n\
     \n\
     {\n\
       \"articles\": [\n\
         {\n\
           \"text\": \"the quoted statutory text, verbatim, in Arabic\",\n\
           \"source\": \"law name and number, when stated\",\n\
           \"stability\": \"high | medium | low\"\n\
         }\n\
       ]\n\
     }\n\
     \n\
     Rules:\n\
     - Extract only text clearly presented as the wording of a law, not the \
     assistant's own explanation.\n\
     - stability reflects how likely the provision is to change: high for \
     settled codes (civil, penal), medium for procedural rules, low for \
     fees, rates and transitional provisions.\n\
     - If nothing is quoted, return {\"articles\": []}.\n\
     - Output ONLY the JSON object."
        .to_string()
}

fn parse_articles(value: &serde_json::Value) -> Vec<ExtractedArticle> {
    match serde_json::from_value::<ExtractionOutput>(value.clone()) {
        Ok(output) => output.articles,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable extraction output, harvesting nothing");
            Vec::new()
        }
    }
}

impl HarvestingAgent {
    pub fn new(
        oracle: Arc<dyn StructuredGenerator>,
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            oracle,
            embedding,
            store,
        }
    }

    /// Harvest citable snippets from a completed answer. Returns the number
    /// of entries inserted; callers are free to ignore it.
    pub async fn harvest(&self, answer: &str, region: Region) -> usize {
        // Cheap gate before any oracle spend: answers without a legal
        // citation marker carry nothing worth extracting.
        if !has_legal_markers(answer) {
            tracing::debug!(region = region.as_str(), "No legal markers in answer, skipping harvest");
            return 0;
        }

        let request = GenerationRequest {
            system: build_system_prompt(),
            prompt: answer.to_string(),
            max_tokens: EXTRACT_MAX_TOKENS,
            web_search: false,
        };

        let value = match self.oracle.generate(&request).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Extraction oracle failed, harvesting nothing");
                return 0;
            }
        };

        let articles = parse_articles(&value);
        let mut inserted = 0;

        for article in articles {
            if article.text.chars().count() < MIN_SNIPPET_CHARS {
                tracing::debug!(
                    text_len = article.text.chars().count(),
                    "Dropping snippet below minimum length"
                );
                continue;
            }

            let embedding = match self.embedding.embed(&article.text).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "Embedding failed, dropping snippet");
                    continue;
                }
            };

            let stability = article
                .stability
                .as_deref()
                .map(Stability::parse)
                .unwrap_or(Stability::Low);

            let entry =
                KnowledgeEntry::new(article.text, article.source, region, stability, embedding);

            match self.store.insert(&entry).await {
                Ok(()) => inserted += 1,
                Err(e) => {
                    tracing::warn!(entry_id = %entry.id, error = %e, "Failed to insert harvested entry");
                }
            }
        }

        tracing::info!(
            region = region.as_str(),
            inserted,
            "Harvest complete"
        );

        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_articles_full_schema() {
        let value = json!({
            "articles": [
                {
                    "text": "المادة 10: يعاقب كل من...",
                    "source": "قانون العقوبات رقم 16 لسنة 1960",
                    "stability": "high"
                },
                {
                    "text": "رسم التسجيل مقداره عشرة دنانير",
                    "stability": "low"
                }
            ]
        });

        let articles = parse_articles(&value);
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0].source.as_deref(),
            Some("قانون العقوبات رقم 16 لسنة 1960")
        );
        assert!(articles[1].source.is_none());
    }

    #[test]
    fn parse_articles_empty() {
        assert!(parse_articles(&json!({"articles": []})).is_empty());
    }

    #[test]
    fn parse_articles_missing_key_defaults_empty() {
        assert!(parse_articles(&json!({})).is_empty());
    }

    #[test]
    fn parse_articles_malformed_harvests_nothing() {
        assert!(parse_articles(&json!("not an object")).is_empty());
        assert!(parse_articles(&json!({"articles": "oops"})).is_empty());
    }

    #[test]
    fn missing_stability_is_tolerated() {
        let value = json!({"articles": [{"text": "نص"}]});
        let articles = parse_articles(&value);
        assert_eq!(articles.len(), 1);
        assert!(articles[0].stability.is_none());
    }
}
