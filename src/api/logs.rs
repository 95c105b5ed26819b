// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity log API endpoint.

use axum::extract::{Path, State};

use crate::{error::ApiError, models::SessionId, state::AppState, storage::ActivityLog};

/// Read a session's activity log as raw text.
///
/// A session with no recorded activity returns an empty body, not an
/// error. Reading the log is not itself a recorded event.
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/log",
    tag = "Logs",
    params(
        ("session_id" = String, Path, description = "Session token")
    ),
    responses(
        (status = 200, description = "Raw log text (possibly empty)", body = String, content_type = "text/plain")
    )
)]
pub async fn read_log(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<String, ApiError> {
    let session_id = SessionId::from(session_id);
    let content = ActivityLog::new(state.storage()).read(&session_id)?;
    Ok(content)
}
