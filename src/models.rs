// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Shared data structures for the REST API. Request and response types
//! specific to one endpoint group live next to their handlers; this
//! module holds the types that cross module boundaries.
//!
//! ## Session ID Type
//!
//! The [`SessionId`] newtype wraps the human-memorable session token
//! (e.g. `pearl-tiger-3f2a`). It provides type safety and clear
//! semantics throughout the storage engine and API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Session ID Type
// =============================================================================

/// Human-memorable session token wrapper.
///
/// Provides type safety for session identifiers throughout the API.
///
/// # Example
///
/// ```rust,ignore
/// let session = SessionId::from("pearl-tiger-3f2a");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

// =============================================================================
// File Metadata
// =============================================================================

/// Caller-supplied metadata accompanying an uploaded blob.
///
/// The client encrypts files before upload, so checksum and IV are
/// opaque to the relay: they are validated for shape here and stored
/// verbatim in the session ledger, never verified or recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Client-computed checksum of the (encrypted) payload.
    pub checksum: String,
    /// Initialization vector used by the client-side encryption.
    pub iv: String,
    /// Caller-provided upload timestamp (seconds since epoch).
    pub timestamp: f64,
    /// Original file name.
    pub file_name: String,
    /// Payload size in bytes.
    pub file_size: u64,
}
