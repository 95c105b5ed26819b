// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session management API endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::SessionId,
    state::AppState,
    storage::{ActivityLog, SessionAllocator},
};

/// Response after creating a session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionResponse {
    /// The minted session token.
    pub session_id: SessionId,
}

/// Mint a new session token and reserve its storage directory.
#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let storage = state.storage();

    let session_id = SessionAllocator::new(storage).allocate()?;

    if let Err(e) = ActivityLog::new(storage).record(
        &session_id,
        &format!("Created session '{session_id}'"),
    ) {
        tracing::warn!(error = %e, session_id = %session_id, "failed to record session creation");
    }

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}
