// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-session activity log.
//!
//! A human-readable event trail, one line per recorded event, timestamped
//! at append time. Append-only: nothing in the relay rewrites or
//! truncates a log. Appends share the locking discipline of the ledger
//! but use the log file's own lock, so logging never contends with
//! ledger rewrites.

use chrono::Utc;

use crate::models::SessionId;

use super::{RelayStorage, StorageError, StorageResult};

/// Append-only event trail, one per session.
pub struct ActivityLog<'a> {
    storage: &'a RelayStorage,
}

impl<'a> ActivityLog<'a> {
    /// Create a new ActivityLog.
    pub fn new(storage: &'a RelayStorage) -> Self {
        Self { storage }
    }

    /// Append one timestamped event line, creating the log and its
    /// parent directories if absent.
    pub fn record(&self, session_id: &SessionId, message: &str) -> StorageResult<()> {
        let path = self.storage.paths().activity_file(session_id);
        let lock = self.storage.resource_lock(&path);
        let _guard = lock.lock().expect("activity log lock poisoned");

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        self.storage
            .append_line(&path, &format!("[{timestamp}] {message}"))
    }

    /// Read the full log content for a session.
    ///
    /// A session with no recorded activity reads as empty text, not an
    /// error.
    pub fn read(&self, session_id: &SessionId) -> StorageResult<String> {
        let path = self.storage.paths().activity_file(session_id);

        match self.storage.read_raw(&path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(StorageError::NotFound(_)) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }
}
