use std::sync::Arc;

use mizan_knowledge::LegalKnowledgeRepository;
use mizan_store::QdrantKnowledgeStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<QdrantKnowledgeStore>,
    pub repository: Arc<LegalKnowledgeRepository>,
}
