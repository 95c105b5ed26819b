// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session allocation.
//!
//! A session is identified by a short human-memorable token and owns one
//! directory under the uploads tree. Tokens are drawn as two words from a
//! fixed pool plus a 16-bit hex suffix (~44M combinations), wide enough
//! that a collision silently merging two sessions is negligible while the
//! token stays readable over the phone.

use std::path::PathBuf;

use rand::Rng;

use crate::models::SessionId;

use super::{RelayStorage, StorageResult};

/// Word pool for session tokens.
const WORDS: [&str; 26] = [
    "apple", "brave", "candy", "delta", "eagle", "flame", "grape", "house", "ivory", "jelly",
    "knife", "lemon", "mango", "noble", "ocean", "pearl", "queen", "river", "stone", "tiger",
    "unity", "vivid", "whale", "xenon", "young", "zebra",
];

/// Allocator for session tokens and their storage directories.
pub struct SessionAllocator<'a> {
    storage: &'a RelayStorage,
}

impl<'a> SessionAllocator<'a> {
    /// Create a new SessionAllocator.
    pub fn new(storage: &'a RelayStorage) -> Self {
        Self { storage }
    }

    /// Mint a session token and reserve its storage directory.
    ///
    /// Directory creation is idempotent: a token that already owns a
    /// directory is not an error, and existing contents are untouched.
    pub fn allocate(&self) -> StorageResult<SessionId> {
        let mut rng = rand::thread_rng();
        let first = WORDS[rng.gen_range(0..WORDS.len())];
        let second = WORDS[rng.gen_range(0..WORDS.len())];
        let suffix: u16 = rng.gen();

        let session_id = SessionId::from(format!("{first}-{second}-{suffix:04x}"));
        self.ensure(&session_id)?;
        Ok(session_id)
    }

    /// Ensure a session's directory exists (parents included).
    ///
    /// Used on upload so the directory invariant holds for the lifetime
    /// of every use of the token.
    pub fn ensure(&self, session_id: &SessionId) -> StorageResult<()> {
        self.storage
            .create_dir(self.storage.paths().session_dir(session_id))
    }

    /// Resolve a session token to its storage directory.
    ///
    /// Pure derivation; does not check existence.
    pub fn resolve(&self, session_id: &SessionId) -> PathBuf {
        self.storage.paths().session_dir(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, RelayStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = RelayStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("failed to initialize");
        (temp, storage)
    }

    #[test]
    fn allocate_creates_resolvable_directory() {
        let (_temp, storage) = test_storage();
        let allocator = SessionAllocator::new(&storage);

        let session = allocator.allocate().unwrap();
        assert!(allocator.resolve(&session).exists());
    }

    #[test]
    fn token_has_word_word_suffix_shape() {
        let (_temp, storage) = test_storage();
        let allocator = SessionAllocator::new(&storage);

        let session = allocator.allocate().unwrap();
        let parts: Vec<&str> = session.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert!(WORDS.contains(&parts[0]));
        assert!(WORDS.contains(&parts[1]));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ensure_is_idempotent_and_preserves_contents() {
        let (_temp, storage) = test_storage();
        let allocator = SessionAllocator::new(&storage);
        let session = SessionId::from("mango");

        allocator.ensure(&session).unwrap();
        let blob = storage.paths().file_blob(&session, "f-1");
        storage.write_raw(&blob, b"payload").unwrap();

        allocator.ensure(&session).unwrap();
        assert_eq!(storage.read_raw(&blob).unwrap(), b"payload");
    }

    #[test]
    fn resolve_is_pure() {
        let (_temp, storage) = test_storage();
        let allocator = SessionAllocator::new(&storage);
        let session = SessionId::from("never-created");

        let path = allocator.resolve(&session);
        assert!(!path.exists());
        assert_eq!(path, storage.paths().session_dir(&session));
    }
}
