// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blob storage keyed by `(session, file_id)`.
//!
//! File identifiers are UUIDv4, so they never collide with an existing
//! blob in the session. Blobs are opaque: the relay neither verifies nor
//! computes checksums, it stores what the client uploaded.

use uuid::Uuid;

use crate::models::SessionId;

use super::{RelayStorage, StorageError, StorageResult};

/// Store for file blobs inside session directories.
pub struct FileStore<'a> {
    storage: &'a RelayStorage,
}

impl<'a> FileStore<'a> {
    /// Create a new FileStore.
    pub fn new(storage: &'a RelayStorage) -> Self {
        Self { storage }
    }

    /// Check if a blob exists.
    pub fn exists(&self, session_id: &SessionId, file_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().file_blob(session_id, file_id))
    }

    /// Store a blob and return its generated file ID.
    ///
    /// A failed write surfaces as an error before the caller can record
    /// success; no file ID is returned for a blob that was not fully
    /// written.
    pub fn put(&self, session_id: &SessionId, bytes: &[u8]) -> StorageResult<String> {
        let file_id = Uuid::new_v4().to_string();

        self.storage
            .create_dir(self.storage.paths().session_dir(session_id))?;
        self.storage
            .write_raw(self.storage.paths().file_blob(session_id, &file_id), bytes)?;

        Ok(file_id)
    }

    /// Read a blob's bytes.
    pub fn get(&self, session_id: &SessionId, file_id: &str) -> StorageResult<Vec<u8>> {
        let path = self.storage.paths().file_blob(session_id, file_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("file {file_id}")));
        }
        self.storage.read_raw(path)
    }

    /// Remove a blob's bytes.
    ///
    /// The ledger entry is removed by the caller as a separate step;
    /// the two are not transactional.
    pub fn delete(&self, session_id: &SessionId, file_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().file_blob(session_id, file_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("file {file_id}")));
        }
        self.storage.delete_file(path)
    }
}
