//! API Routes
//!
//! - `/api/v1/...` - document upload, update, query, delete and listing
//! - `/api/health` - Health check

pub mod documents;
pub mod health;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Room for multipart boundaries and part headers on top of the file itself
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = state.config.upload.max_file_size as usize + MULTIPART_OVERHEAD;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .nest("/api/v1", documents::router(state.clone()))
        .merge(health::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &allowed_origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::documents::LopdfExtractor;
    use crate::llm::QueryService;
    use crate::store::DocumentStore;
    use crate::types::AppResult;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Unused;

    #[async_trait]
    impl QueryService for Unused {
        async fn answer(&self, _context: &str, _query: &str) -> AppResult<String> {
            unreachable!("health checks never query the LLM")
        }
    }

    #[tokio::test]
    async fn test_health_reports_document_count() {
        let store = DocumentStore::new();
        store
            .create(uuid::Uuid::new_v4(), "alice".into(), "text".into())
            .await
            .unwrap();

        let state = AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            store,
            extractor: Arc::new(LopdfExtractor),
            query_service: Arc::new(Unused),
        };

        let response = create_router(state)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["documents"], 1);
    }
}
