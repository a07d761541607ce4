use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::documents::TextExtractor;
use crate::llm::QueryService;
use crate::store::{DocumentStore, DocumentSummary};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    pub extractor: Arc<dyn TextExtractor>,
    pub query_service: Arc<dyn QueryService>,
}

// API Request/Response types

#[derive(Debug, serde::Deserialize, Validate)]
pub struct UploadParams {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: String,
}

#[derive(Debug, serde::Deserialize, Validate)]
pub struct QueryParams {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    pub username: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct QueryResponse {
    pub uuid: Uuid,
    #[serde(rename = "username")]
    pub owner: String,
    pub query: String,
    pub llm_response: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentInfo {
    pub uuid: Uuid,
    #[serde(rename = "username")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "file_count")]
    pub part_count: u32,
}

impl From<DocumentSummary> for DocumentInfo {
    fn from(summary: DocumentSummary) -> Self {
        Self {
            uuid: summary.id,
            owner: summary.owner,
            created_at: summary.created_at,
            part_count: summary.part_count,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentInfo>,
    pub total: usize,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub documents: usize,
}
