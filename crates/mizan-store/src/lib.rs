pub mod qdrant;

pub use qdrant::QdrantKnowledgeStore;
