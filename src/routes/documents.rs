//! Document endpoints
//!
//! - `POST /upload/{id}?username=` - create a record from a PDF
//! - `PUT /update/{id}` - append text from another PDF
//! - `GET /query/{id}?query=&username=` - ask the LLM about the stored text
//! - `DELETE /data/{id}` - remove a record
//! - `GET /list_uuids` - enumerate records

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::QueryRejection,
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::documents::{has_text, StagePurpose, StagedUpload};
use crate::models::{
    AppState, DocumentInfo, DocumentListResponse, MessageResponse, QueryParams, QueryResponse,
    UploadParams,
};
use crate::store;
use crate::types::{AppError, AppResult};

/// Multipart form field carrying the PDF
pub const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload/{id}", post(upload_document))
        .route("/update/{id}", put(update_document))
        .route("/query/{id}", get(query_document))
        .route("/data/{id}", delete(delete_document))
        .route("/list_uuids", get(list_documents))
        .with_state(state)
}

#[tracing::instrument(skip_all, fields(document_id = %raw_id))]
async fn upload_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    params: Result<Query<UploadParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let id = parse_id(&raw_id)?;
    let Query(params) = params.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    params.validate().map_err(validation_error)?;

    let mut multipart = multipart.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    // The PDF part may follow any number of other form fields
    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(other) => debug!(field = other.name().unwrap_or("<unnamed>"), "Skipping form field"),
            None => return Err(AppError::InvalidRequest("No file uploaded".to_string())),
        }
    };
    ensure_pdf(&field)?;
    info!(filename = field.file_name().unwrap_or("<unnamed>"), "Upload request received");

    let _lock = state.store.locks().lock(id).await;
    if state.store.contains(&id).await {
        return Err(store::already_exists(&id));
    }

    let staged = StagedUpload::from_field(
        &state.config.upload.dir,
        &id,
        StagePurpose::Create,
        field,
        state.config.upload.max_file_size,
    )
    .await?;
    debug!(bytes = staged.size(), "Staged upload");
    let text = state.extractor.extract(staged.path()).await?;
    drop(staged);

    if !has_text(&text) {
        return Err(AppError::Unprocessable(
            "PDF contains no extractable text.".to_string(),
        ));
    }

    state.store.create(id, params.username, text).await?;
    info!("Stored extracted text");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "File uploaded and text extracted successfully".to_string(),
            uuid: Some(id),
        }),
    ))
}

#[tracing::instrument(skip_all, fields(document_id = %raw_id))]
async fn update_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&raw_id)?;
    let mut multipart = multipart.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    // The PDF part may follow any number of other form fields
    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(other) => debug!(field = other.name().unwrap_or("<unnamed>"), "Skipping form field"),
            None => return Err(AppError::InvalidRequest("No file uploaded".to_string())),
        }
    };
    ensure_pdf(&field)?;
    info!(filename = field.file_name().unwrap_or("<unnamed>"), "Update request received");

    let _lock = state.store.locks().lock(id).await;
    if !state.store.contains(&id).await {
        return Err(store::missing_for_update(&id));
    }

    let staged = StagedUpload::from_field(
        &state.config.upload.dir,
        &id,
        StagePurpose::Append(Uuid::new_v4()),
        field,
        state.config.upload.max_file_size,
    )
    .await?;
    debug!(bytes = staged.size(), "Staged upload");
    let text = state.extractor.extract(staged.path()).await?;
    drop(staged);

    if !has_text(&text) {
        return Err(AppError::Unprocessable(
            "PDF contains no extractable text.".to_string(),
        ));
    }

    let record = state.store.append(&id, &text).await?;
    info!(part_count = record.part_count, "Appended extracted text");

    Ok(Json(MessageResponse {
        message: "Data appended successfully".to_string(),
        uuid: Some(id),
    }))
}

#[tracing::instrument(skip_all, fields(document_id = %raw_id))]
async fn query_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> AppResult<Json<QueryResponse>> {
    let id = parse_id(&raw_id)?;
    let Query(params) = params.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    params.validate().map_err(validation_error)?;

    let record = state.store.get(&id).await.ok_or_else(|| store::not_found(&id))?;

    // An empty username means no ownership check
    if let Some(username) = params.username.as_deref().filter(|u| !u.is_empty()) {
        if username != record.owner {
            return Err(AppError::Forbidden(
                "Access denied. This document belongs to another user.".to_string(),
            ));
        }
    }

    let answer = state.query_service.answer(&record.content, &params.query).await?;

    Ok(Json(QueryResponse {
        uuid: id,
        owner: record.owner,
        query: params.query,
        llm_response: answer,
    }))
}

#[tracing::instrument(skip_all, fields(document_id = %raw_id))]
async fn delete_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&raw_id)?;
    info!("Deleting data");

    let _lock = state.store.locks().lock(id).await;
    state.store.remove(&id).await.ok_or_else(|| store::not_found(&id))?;

    Ok(Json(MessageResponse {
        message: format!("Data for UUID {} deleted successfully.", id),
        uuid: None,
    }))
}

async fn list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let documents: Vec<DocumentInfo> = state
        .store
        .list()
        .await
        .into_iter()
        .map(DocumentInfo::from)
        .collect();

    Json(DocumentListResponse {
        total: documents.len(),
        documents,
    })
}

/// Accepts only the canonical hyphenated form
fn parse_id(raw: &str) -> AppResult<Uuid> {
    let invalid = || AppError::InvalidRequest(format!("Invalid UUID: {}", raw));
    if raw.len() != 36 {
        return Err(invalid());
    }
    Uuid::parse_str(raw).map_err(|_| invalid())
}

fn validation_error(errors: ValidationErrors) -> AppError {
    AppError::InvalidRequest(errors.to_string())
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::InvalidRequest(format!("Failed to read multipart: {}", e.body_text()))
}

fn ensure_pdf(field: &Field<'_>) -> AppResult<()> {
    let is_pdf = field
        .content_type()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map(|m| m.essence_str() == mime::APPLICATION_PDF.essence_str())
        .unwrap_or(false);

    if is_pdf {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(
            "Invalid file type. Only PDF files are accepted.".to_string(),
        ))
    }
}
