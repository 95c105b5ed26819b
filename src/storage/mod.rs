// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relay Storage Module
//!
//! Session-scoped storage engine for the file relay. A session owns one
//! directory of uploaded blobs plus a metadata ledger, and a parallel
//! activity log. The HTTP layer composes the four components; nothing
//! else mutates ledger, log, or blob bytes directly.
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   uploads/{session_id}/
//!     {file_id}       # opaque blob bytes (UUIDv4 key)
//!     meta.txt        # ledger: one "<file_id>: <metadata>" line per upload
//!   logs/{session_id}/
//!     write.log       # activity log: one "[timestamp] <message>" line per event
//! ```
//!
//! ## Concurrency
//!
//! The ledger's read-modify-write rewrite and the activity log's appends
//! are the only shared mutable resources. Both are serialized through
//! per-resource locks handed out by [`RelayStorage::resource_lock`];
//! distinct sessions proceed fully in parallel. Blob bytes under
//! distinct file IDs are never shared and need no locking.

pub mod activity;
pub mod files;
pub mod ledger;
pub mod paths;
pub mod relay_fs;
pub mod sessions;

pub use activity::ActivityLog;
pub use files::FileStore;
pub use ledger::{LedgerEntry, MetadataLedger};
pub use paths::StoragePaths;
pub use relay_fs::{RelayStorage, StorageError, StorageResult};
pub use sessions::SessionAllocator;
