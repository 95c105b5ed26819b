// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File transfer API endpoints.
//!
//! Upload, listing, download, and deletion of blobs within a session.
//! Every operation composes the storage components in the same order:
//! blob store, then ledger, then activity log. The metadata payload is
//! parsed only to validate its shape; the ledger stores it as an opaque
//! single-line JSON string.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{FileMetadata, SessionId},
    state::AppState,
    storage::{ActivityLog, FileStore, MetadataLedger, SessionAllocator},
};

/// Multipart upload form shape (for API documentation).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// JSON-encoded [`FileMetadata`].
    metadata: String,
    /// The blob bytes.
    #[schema(value_type = String, format = Binary)]
    file: String,
}

/// Response after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Message indicating success.
    pub message: String,
    /// Generated identifier for the stored blob.
    pub file_id: String,
    /// Echo of the client-supplied checksum.
    pub checksum: String,
}

/// One listed file: its ID and the metadata recorded at upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileEntry {
    /// Identifier of the stored blob.
    pub file_id: String,
    /// Metadata payload as recorded in the session ledger.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

/// Response listing a session's files in upload order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    /// Ledger entries in upload order.
    pub files: Vec<FileEntry>,
    /// Total count of entries.
    pub total: usize,
}

/// Response after deleting a file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponse {
    /// Message indicating success.
    pub message: String,
    /// The ID of the deleted file.
    pub file_id: String,
    /// How many ledger entries were removed for the ID.
    pub entries_removed: usize,
}

/// Upload a blob into a session.
///
/// Expects a multipart form with a `metadata` field (JSON) and a `file`
/// field (bytes). The session directory is created if this token has
/// not uploaded before.
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/files",
    tag = "Files",
    params(
        ("session_id" = String, Path, description = "Session token")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_file(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut metadata_raw: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("metadata") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable metadata: {e}")))?;
                metadata_raw = Some(text);
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable file: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let metadata_raw =
        metadata_raw.ok_or_else(|| ApiError::bad_request("metadata is required"))?;
    let file_bytes = file_bytes.ok_or_else(|| ApiError::bad_request("file is required"))?;

    let metadata: FileMetadata = serde_json::from_str(&metadata_raw)
        .map_err(|e| ApiError::bad_request(format!("invalid metadata: {e}")))?;

    let session_id = SessionId::from(session_id);
    let storage = state.storage();

    SessionAllocator::new(storage).ensure(&session_id)?;
    let file_id = FileStore::new(storage).put(&session_id, &file_bytes)?;

    // Re-serialize compactly so the ledger entry is exactly one line.
    let payload = serde_json::to_string(&metadata)
        .map_err(|e| ApiError::internal(format!("metadata re-serialization failed: {e}")))?;
    MetadataLedger::new(storage).append(&session_id, &file_id, &payload)?;

    if let Err(e) = ActivityLog::new(storage).record(
        &session_id,
        &format!(
            "Session '{session_id}' uploaded file '{}' ({}, {} bytes)",
            metadata.file_name, metadata.checksum, metadata.file_size
        ),
    ) {
        tracing::warn!(error = %e, session_id = %session_id, "failed to record upload");
    }

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file_id,
            checksum: metadata.checksum,
        }),
    ))
}

/// List a session's files in upload order.
///
/// The ledger is the source of truth: a session that never uploaded
/// lists as empty rather than erroring.
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/files",
    tag = "Files",
    params(
        ("session_id" = String, Path, description = "Session token")
    ),
    responses(
        (status = 200, description = "Ledger entries in upload order", body = FileListResponse)
    )
)]
pub async fn list_files(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FileListResponse>, ApiError> {
    let session_id = SessionId::from(session_id);
    let storage = state.storage();

    let entries = MetadataLedger::new(storage).list(&session_id)?;

    if let Err(e) = ActivityLog::new(storage).record(
        &session_id,
        &format!("Session '{session_id}' requested metadata listing"),
    ) {
        tracing::warn!(error = %e, session_id = %session_id, "failed to record listing");
    }

    let files: Vec<FileEntry> = entries
        .into_iter()
        .map(|entry| {
            let metadata = serde_json::from_str(&entry.payload)
                .unwrap_or(serde_json::Value::String(entry.payload));
            FileEntry {
                file_id: entry.file_id,
                metadata,
            }
        })
        .collect();

    let total = files.len();
    Ok(Json(FileListResponse { files, total }))
}

/// Download a blob.
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/files/{file_id}",
    tag = "Files",
    params(
        ("session_id" = String, Path, description = "Session token"),
        ("file_id" = String, Path, description = "Identifier of the stored blob")
    ),
    responses(
        (status = 200, description = "Blob bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    Path((session_id, file_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = SessionId::from(session_id);
    let storage = state.storage();

    let bytes = FileStore::new(storage).get(&session_id, &file_id)?;

    if let Err(e) = ActivityLog::new(storage).record(
        &session_id,
        &format!("Session '{session_id}' downloaded file '{file_id}'"),
    ) {
        tracing::warn!(error = %e, session_id = %session_id, "failed to record download");
    }

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_id}\""),
        ),
    ];
    Ok((headers, bytes))
}

/// Delete a blob and its ledger entries.
///
/// Blob removal and ledger removal are two separate steps, in that
/// order; a crash between them leaves a dangling ledger entry rather
/// than orphaned bytes.
#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}/files/{file_id}",
    tag = "Files",
    params(
        ("session_id" = String, Path, description = "Session token"),
        ("file_id" = String, Path, description = "Identifier of the stored blob")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    Path((session_id, file_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<DeleteFileResponse>, ApiError> {
    let session_id = SessionId::from(session_id);
    let storage = state.storage();

    FileStore::new(storage).delete(&session_id, &file_id)?;
    let entries_removed = MetadataLedger::new(storage).remove_by_key(&session_id, &file_id)?;

    if let Err(e) = ActivityLog::new(storage).record(
        &session_id,
        &format!("File '{file_id}' was deleted from session '{session_id}'"),
    ) {
        tracing::warn!(error = %e, session_id = %session_id, "failed to record deletion");
    }

    Ok(Json(DeleteFileResponse {
        message: "file deleted successfully".to_string(),
        file_id,
        entries_removed,
    }))
}
