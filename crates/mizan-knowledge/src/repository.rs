use std::sync::Arc;

use mizan_core::embedding::EmbeddingProvider;
use mizan_core::entry::Region;
use mizan_core::oracle::StructuredGenerator;
use mizan_core::store::KnowledgeStore;

use crate::harvest::HarvestingAgent;
use crate::retrieval::RetrievalCoordinator;
use crate::verify::Verifier;

/// The two operations the rest of the application calls. Clients are
/// constructed once at startup and injected; the facade owns the wiring
/// between coordinator, verifier and harvester.
pub struct LegalKnowledgeRepository {
    coordinator: RetrievalCoordinator,
    harvester: HarvestingAgent,
}

impl LegalKnowledgeRepository {
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
        verification_oracle: Arc<dyn StructuredGenerator>,
        extraction_oracle: Arc<dyn StructuredGenerator>,
    ) -> Self {
        let verifier = Arc::new(Verifier::new(
            verification_oracle,
            embedding.clone(),
            store.clone(),
        ));
        let coordinator = RetrievalCoordinator::new(embedding.clone(), store.clone(), verifier);
        let harvester = HarvestingAgent::new(extraction_oracle, embedding, store);

        Self {
            coordinator,
            harvester,
        }
    }

    /// Context block for the next model prompt, or `""` on any cache miss.
    pub async fn get_context(&self, query: &str, region: Region) -> String {
        self.coordinator.get_context(query, region).await
    }

    /// Mine a completed answer for citable legal text. Returns the number of
    /// entries inserted; failures never propagate.
    pub async fn harvest(&self, answer: &str, region: Region) -> usize {
        self.harvester.harvest(answer, region).await
    }
}
