pub mod harvest;
pub mod repository;
pub mod retrieval;
pub mod verify;

pub use harvest::HarvestingAgent;
pub use repository::LegalKnowledgeRepository;
pub use retrieval::RetrievalCoordinator;
pub use verify::Verifier;
