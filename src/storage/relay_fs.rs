// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem primitives shared by the relay storage components.
//!
//! All session state lives in plain files: blobs keyed by file ID, one
//! ledger file per session, one activity log per session. This module
//! owns the error taxonomy, the low-level read/write/append helpers, and
//! the per-resource lock registry that serializes the ledger's
//! read-modify-write rewrite and the activity log's appends.
//!
//! ## Locking
//!
//! Locks are scoped to the resource path: two sessions never contend,
//! while concurrent requests against the same ledger or log file are
//! serialized. The registry is shared across clones of [`RelayStorage`],
//! so every request-handling context sees the same locks.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::StoragePaths;

/// Error type for relay storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    /// Resource absent where one was required
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage not initialized
    #[error("storage not initialized")]
    NotInitialized,
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle to the relay filesystem.
///
/// Cheap to clone; clones share the lock registry.
#[derive(Debug, Clone)]
pub struct RelayStorage {
    paths: StoragePaths,
    initialized: bool,
    locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl RelayStorage {
    /// Create a new RelayStorage instance.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Check if storage is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize the relay storage directory structure.
    ///
    /// Creates the uploads and logs trees. Safe to call multiple times
    /// (idempotent).
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [self.paths.uploads_dir(), self.paths.logs_dir()];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Check that the storage root is writable.
    ///
    /// Performs a write-read-delete probe under the root.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::Io(io::Error::other(
                "health check data mismatch",
            )));
        }

        Ok(())
    }

    /// Lock handle for one on-disk resource.
    ///
    /// Callers hold the returned mutex across a full critical section
    /// (e.g. the ledger's read-filter-rewrite). The same path always
    /// yields the same mutex.
    pub fn resource_lock(&self, path: impl AsRef<Path>) -> Arc<Mutex<()>> {
        let mut registry = self.locks.lock().expect("lock registry poisoned");
        registry
            .entry(path.as_ref().to_path_buf())
            .or_default()
            .clone()
    }

    // ========== Raw File Operations ==========

    /// Read the full contents of a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Write raw bytes to a file, creating parent directories as needed.
    ///
    /// Any failure surfaces before success is reported; a partially
    /// written file is never confirmed to the caller.
    pub fn write_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Replace a file's contents atomically (write to temp, then rename).
    ///
    /// If the rewrite fails partway, the prior content stays intact.
    pub fn write_atomic(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Append one line to a file, creating it and its parents if absent.
    ///
    /// The line (with its trailing newline) is written as a single call,
    /// so a line is never split by a concurrent append.
    pub fn append_line(&self, path: impl AsRef<Path>, line: &str) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        file.write_all(format!("{line}\n").as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }

    /// Delete a file.
    pub fn delete_file(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// Create a directory (including parents).
    pub fn create_dir(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::create_dir_all(path.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, RelayStorage) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut storage = RelayStorage::new(paths);
        storage.initialize().expect("failed to initialize");
        (temp, storage)
    }

    #[test]
    fn initialize_creates_directories() {
        let (_temp, storage) = test_storage();

        assert!(storage.paths().uploads_dir().exists());
        assert!(storage.paths().logs_dir().exists());
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_temp, mut storage) = test_storage();
        storage.initialize().expect("second initialize fails");
        assert!(storage.is_initialized());
    }

    #[test]
    fn write_and_read_raw() {
        let (_temp, storage) = test_storage();
        let data = b"raw test data with\nnewlines\nand bytes: \x00\x01\x02";

        let path = storage.paths().uploads_dir().join("deep").join("blob");
        storage.write_raw(&path, data).unwrap();

        let read = storage.read_raw(&path).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let (_temp, storage) = test_storage();
        let result = storage.read_raw(storage.paths().uploads_dir().join("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn append_line_creates_and_grows_file() {
        let (_temp, storage) = test_storage();
        let path = storage.paths().logs_dir().join("s").join("write.log");

        storage.append_line(&path, "first").unwrap();
        storage.append_line(&path, "second").unwrap();

        let content = String::from_utf8(storage.read_raw(&path).unwrap()).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn write_atomic_replaces_content_without_leftover_temp() {
        let (_temp, storage) = test_storage();
        let path = storage.paths().uploads_dir().join("s").join("meta.txt");

        storage.write_raw(&path, b"old content\n").unwrap();
        storage.write_atomic(&path, b"new content\n").unwrap();

        assert_eq!(storage.read_raw(&path).unwrap(), b"new content\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn resource_lock_is_stable_per_path() {
        let (_temp, storage) = test_storage();
        let path = storage.paths().uploads_dir().join("s").join("meta.txt");

        let a = storage.resource_lock(&path);
        let b = storage.resource_lock(&path);
        assert!(Arc::ptr_eq(&a, &b));

        let other = storage.resource_lock(storage.paths().uploads_dir().join("t"));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[test]
    fn clones_share_the_lock_registry() {
        let (_temp, storage) = test_storage();
        let clone = storage.clone();
        let path = storage.paths().uploads_dir().join("s").join("meta.txt");

        let a = storage.resource_lock(&path);
        let b = clone.resource_lock(&path);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn health_check_works() {
        let (_temp, storage) = test_storage();
        storage.health_check().expect("health check should pass");
    }

    #[test]
    fn delete_file_removes_it() {
        let (_temp, storage) = test_storage();
        let path = storage.paths().uploads_dir().join("gone");

        storage.write_raw(&path, b"x").unwrap();
        assert!(storage.exists(&path));
        storage.delete_file(&path).unwrap();
        assert!(!storage.exists(&path));
    }

    #[test]
    fn uninitialized_storage_returns_error() {
        let temp = TempDir::new().unwrap();
        let storage = RelayStorage::new(StoragePaths::new(temp.path()));

        let result = storage.read_raw(temp.path().join("any"));
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
