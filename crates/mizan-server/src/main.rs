use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mizan=info".parse().unwrap()))
        .init();

    let config = mizan_core::AppConfig::from_env();

    let store = Arc::new(
        mizan_store::QdrantKnowledgeStore::new(&config).expect("Failed to create qdrant client"),
    );
    if let Err(e) = store.ensure_collection().await {
        tracing::warn!(error = %e, "Could not initialize qdrant collection, running in degraded mode");
    }

    let embedding = Arc::new(mizan_embedding::OpenAiEmbeddingProvider::new(&config));
    let verification_oracle = Arc::new(mizan_oracle::AnthropicGenerator::new(
        config.anthropic_api_key.clone(),
        config.verification_model.clone(),
    ));
    let extraction_oracle = Arc::new(mizan_oracle::AnthropicGenerator::new(
        config.anthropic_api_key.clone(),
        config.extraction_model.clone(),
    ));

    let repository = Arc::new(mizan_knowledge::LegalKnowledgeRepository::new(
        embedding,
        store.clone() as Arc<dyn mizan_core::store::KnowledgeStore>,
        verification_oracle,
        extraction_oracle,
    ));

    let state = AppState { store, repository };

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("MIZAN knowledge server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
