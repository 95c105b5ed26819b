// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::storage::RelayStorage;

#[derive(Clone)]
pub struct AppState {
    storage: Arc<RelayStorage>,
}

impl AppState {
    pub fn new(storage: RelayStorage) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    pub fn storage(&self) -> &RelayStorage {
        &self.storage
    }
}
