// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-session metadata ledger.
//!
//! The ledger is the sole source of truth for "list all files in a
//! session": one `"<file_id>: <payload>\n"` line per upload, in upload
//! order. It is never reconstructed from a directory listing.
//!
//! Appends and the filtered rewrite in [`MetadataLedger::remove_by_key`]
//! are serialized through the ledger file's resource lock. The rewrite
//! goes through a temp file and rename, so a failure partway leaves the
//! prior content intact.

use crate::models::SessionId;

use super::{RelayStorage, StorageError, StorageResult};

/// Separator between the file ID key and the opaque metadata payload.
const KEY_SEPARATOR: &str = ": ";

/// One ledger line: a file ID bound to its opaque metadata payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub file_id: String,
    pub payload: String,
}

/// Append-only metadata ledger, one per session.
pub struct MetadataLedger<'a> {
    storage: &'a RelayStorage,
}

impl<'a> MetadataLedger<'a> {
    /// Create a new MetadataLedger.
    pub fn new(storage: &'a RelayStorage) -> Self {
        Self { storage }
    }

    /// Append one entry, creating the ledger if absent.
    ///
    /// The line is written as a single append under the ledger's lock,
    /// so concurrent appends never interleave within a line.
    pub fn append(
        &self,
        session_id: &SessionId,
        file_id: &str,
        payload: &str,
    ) -> StorageResult<()> {
        let path = self.storage.paths().ledger_file(session_id);
        let lock = self.storage.resource_lock(&path);
        let _guard = lock.lock().expect("ledger lock poisoned");

        self.storage
            .append_line(&path, &format!("{file_id}{KEY_SEPARATOR}{payload}"))
    }

    /// Remove every entry whose key equals `file_id`.
    ///
    /// Read, filter, and rewrite happen as one critical section under the
    /// ledger's lock. Returns how many lines were removed; duplicate keys
    /// left by earlier inconsistent states are all removed and counted.
    pub fn remove_by_key(&self, session_id: &SessionId, file_id: &str) -> StorageResult<usize> {
        let path = self.storage.paths().ledger_file(session_id);
        let lock = self.storage.resource_lock(&path);
        let _guard = lock.lock().expect("ledger lock poisoned");

        let content = match self.storage.read_raw(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(StorageError::NotFound(_)) => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        let mut retained = String::with_capacity(content.len());
        for line in content.lines() {
            if entry_key(line) == Some(file_id) {
                removed += 1;
            } else if !line.is_empty() {
                retained.push_str(line);
                retained.push('\n');
            }
        }

        if removed > 0 {
            self.storage.write_atomic(&path, retained.as_bytes())?;
        }

        Ok(removed)
    }

    /// List all entries in append order.
    ///
    /// A session that has never had a ledger written lists as empty.
    pub fn list(&self, session_id: &SessionId) -> StorageResult<Vec<LedgerEntry>> {
        let path = self.storage.paths().ledger_file(session_id);

        let content = match self.storage.read_raw(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(StorageError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let entries = content
            .lines()
            .filter_map(|line| {
                line.split_once(KEY_SEPARATOR).map(|(id, payload)| LedgerEntry {
                    file_id: id.to_string(),
                    payload: payload.to_string(),
                })
            })
            .collect();

        Ok(entries)
    }
}

fn entry_key(line: &str) -> Option<&str> {
    line.split_once(KEY_SEPARATOR).map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, RelayStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = RelayStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("failed to initialize");
        (temp, storage)
    }

    #[test]
    fn list_of_unwritten_session_is_empty() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("silent");

        assert!(ledger.list(&session).unwrap().is_empty());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("mango");

        for i in 0..10 {
            ledger
                .append(&session, &format!("f-{i}"), &format!("{{\"n\":{i}}}"))
                .unwrap();
        }

        let entries = ledger.list(&session).unwrap();
        assert_eq!(entries.len(), 10);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.file_id, format!("f-{i}"));
            assert_eq!(entry.payload, format!("{{\"n\":{i}}}"));
        }
    }

    #[test]
    fn remove_by_key_keeps_other_entries_in_order() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("mango");

        ledger.append(&session, "f-1", "one").unwrap();
        ledger.append(&session, "f-2", "two").unwrap();
        ledger.append(&session, "f-3", "three").unwrap();

        assert_eq!(ledger.remove_by_key(&session, "f-2").unwrap(), 1);

        let entries = ledger.list(&session).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_id, "f-1");
        assert_eq!(entries[1].file_id, "f-3");
        assert_eq!(entries[1].payload, "three");
    }

    #[test]
    fn remove_by_key_counts_duplicates() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("mango");

        ledger.append(&session, "dup", "first").unwrap();
        ledger.append(&session, "f-2", "two").unwrap();
        ledger.append(&session, "dup", "second").unwrap();

        assert_eq!(ledger.remove_by_key(&session, "dup").unwrap(), 2);
        assert_eq!(ledger.list(&session).unwrap().len(), 1);
    }

    #[test]
    fn remove_by_key_on_absent_ledger_removes_nothing() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("silent");

        assert_eq!(ledger.remove_by_key(&session, "f-1").unwrap(), 0);
    }

    #[test]
    fn key_match_is_exact_not_prefix() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("mango");

        ledger.append(&session, "f-1", "one").unwrap();
        ledger.append(&session, "f-10", "ten").unwrap();

        assert_eq!(ledger.remove_by_key(&session, "f-1").unwrap(), 1);

        let entries = ledger.list(&session).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_id, "f-10");
    }

    #[test]
    fn payload_may_contain_the_separator() {
        let (_temp, storage) = test_storage();
        let ledger = MetadataLedger::new(&storage);
        let session = SessionId::from("mango");

        let payload = r#"{"fileName": "a: b.txt", "fileSize": 5}"#;
        ledger.append(&session, "f-1", payload).unwrap();

        let entries = ledger.list(&session).unwrap();
        assert_eq!(entries[0].payload, payload);
    }

    #[test]
    fn concurrent_appends_lose_no_lines_and_interleave_none() {
        let (_temp, storage) = test_storage();
        let storage = Arc::new(storage);
        let session = SessionId::from("busy");

        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let storage = Arc::clone(&storage);
                let session = session.clone();
                thread::spawn(move || {
                    let ledger = MetadataLedger::new(&storage);
                    for i in 0..PER_THREAD {
                        ledger
                            .append(&session, &format!("t{t}-{i}"), &format!("payload-{t}-{i}"))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let ledger = MetadataLedger::new(&storage);
        let entries = ledger.list(&session).unwrap();
        assert_eq!(entries.len(), THREADS * PER_THREAD);

        // Every line is fully one caller's entry.
        for entry in &entries {
            let (t, i) = entry
                .file_id
                .strip_prefix('t')
                .and_then(|rest| rest.split_once('-'))
                .expect("well-formed key");
            assert_eq!(entry.payload, format!("payload-{t}-{i}"));
        }

        // Within a thread, appends appear in the order they were accepted.
        for t in 0..THREADS {
            let ours: Vec<usize> = entries
                .iter()
                .filter(|e| e.file_id.starts_with(&format!("t{t}-")))
                .map(|e| e.file_id.split_once('-').unwrap().1.parse().unwrap())
                .collect();
            assert_eq!(ours, (0..PER_THREAD).collect::<Vec<_>>());
        }
    }
}
