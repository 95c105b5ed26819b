// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the relay storage layout.

use std::path::{Path, PathBuf};

use crate::models::SessionId;

/// Base directory for all persistent relay storage.
pub const DATA_ROOT: &str = "./data";

/// Name of the per-session metadata ledger file.
pub const LEDGER_FILE: &str = "meta.txt";

/// Name of the per-session activity log file.
pub const ACTIVITY_FILE: &str = "write.log";

/// Storage path utilities for the relay filesystem.
///
/// All paths are derived purely from the session identifier; nothing here
/// touches the filesystem.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all relay data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Upload Paths ==========

    /// Directory containing all session upload directories.
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Directory for a specific session's files and ledger.
    pub fn session_dir(&self, session_id: &SessionId) -> PathBuf {
        self.uploads_dir().join(session_id.as_str())
    }

    /// Path to a stored blob, keyed by its file ID within the session.
    pub fn file_blob(&self, session_id: &SessionId, file_id: &str) -> PathBuf {
        self.session_dir(session_id).join(file_id)
    }

    /// Path to a session's metadata ledger.
    pub fn ledger_file(&self, session_id: &SessionId) -> PathBuf {
        self.session_dir(session_id).join(LEDGER_FILE)
    }

    // ========== Activity Log Paths ==========

    /// Directory containing all session activity logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Directory for a specific session's activity log.
    pub fn session_log_dir(&self, session_id: &SessionId) -> PathBuf {
        self.logs_dir().join(session_id.as_str())
    }

    /// Path to a session's activity log file.
    pub fn activity_file(&self, session_id: &SessionId) -> PathBuf {
        self.session_log_dir(session_id).join(ACTIVITY_FILE)
    }
}
