//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::chat::UploadedFile;
use crate::web::core_error_response;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        train_handler,
        ask_handler,
        history_handler,
        documents_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            TrainResponse,
            AskRequest,
            AskResponse,
            HistoryEntry,
            DocumentsResponse,
        )
    ),
    tags(
        (name = "Document Chat API", description = "API endpoints for document question answering.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after a successful train call.
#[derive(Serialize, ToSchema)]
pub struct TrainResponse {
    pub files: usize,
    pub segments: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

/// One question/answer exchange from the user's history.
#[derive(Serialize, ToSchema)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct DocumentsResponse {
    pub filenames: Vec<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Train the document index from uploaded files.
///
/// Accepts a multipart/form-data request; every file part is ingested.
/// A successful call replaces the previously trained index entirely.
#[utoipa::path(
    post,
    path = "/train",
    request_body(content_type = "multipart/form-data", description = "The documents to upload."),
    responses(
        (status = 200, description = "Training complete", body = TrainResponse),
        (status = 400, description = "Empty upload, unsupported format, or extraction failure"),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "Embedding provider failure")
    )
)]
pub async fn train_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let filename = field.file_name().unwrap_or("untitled").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        files.push(UploadedFile { filename, bytes });
    }

    let report = app_state
        .chat
        .train(&files)
        .await
        .map_err(|e| core_error_response(&e))?;

    Ok(Json(TrainResponse {
        files: report.files,
        segments: report.segments,
    }))
}

/// Ask a question about the trained documents.
///
/// Fails until at least one successful train call has happened in this
/// process lifetime. Each successful answer appends one history record
/// for the calling user.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer composed", body = AskResponse),
        (status = 400, description = "No documents trained yet"),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "Model provider failure")
    )
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let answer = app_state
        .chat
        .ask(user_id, &req.question)
        .await
        .map_err(|e| core_error_response(&e))?;

    Ok(Json(AskResponse { answer }))
}

/// Fetch the calling user's question/answer history, most recent first.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "History for the calling user", body = [HistoryEntry]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = app_state
        .chat
        .history(user_id)
        .await
        .map_err(|e| core_error_response(&e))?;

    let entries: Vec<HistoryEntry> = records
        .into_iter()
        .map(|r| HistoryEntry {
            question: r.question,
            answer: r.answer,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(entries))
}

/// List the filenames behind the currently trained index.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Trained document filenames", body = DocumentsResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn documents_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filenames = app_state.chat.trained_filenames().await;
    Ok(Json(DocumentsResponse { filenames }))
}
