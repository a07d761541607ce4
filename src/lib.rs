// CAG Server - upload PDFs once, ask an LLM about them repeatedly

pub mod config;
pub mod models;
pub mod types;
pub mod store;     // In-memory document records and per-identifier locks
pub mod documents; // Upload staging and PDF text extraction
pub mod llm;
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
