// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{FileMetadata, SessionId},
    state::AppState,
};

pub mod files;
pub mod health;
pub mod logs;
pub mod sessions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{session_id}/files",
            get(files::list_files).post(files::upload_file),
        )
        .route(
            "/sessions/{session_id}/files/{file_id}",
            get(files::download_file).delete(files::delete_file),
        )
        .route("/sessions/{session_id}/log", get(logs::read_log));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::create_session,
        files::upload_file,
        files::list_files,
        files::download_file,
        files::delete_file,
        logs::read_log,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SessionId,
            FileMetadata,
            sessions::CreateSessionResponse,
            files::UploadForm,
            files::UploadResponse,
            files::FileEntry,
            files::FileListResponse,
            files::DeleteFileResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Sessions", description = "Session token allocation"),
        (name = "Files", description = "Blob upload, listing, download, and deletion"),
        (name = "Logs", description = "Per-session activity trail"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
