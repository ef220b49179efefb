// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::queue::PendingQueue;
use kiln_core::asset::AssetId;
use kiln_core::collections::{StrTable, TableError};
use kiln_core::memory::HEAP;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

/// What [`Catalog::notify`](super::Catalog::notify) did with a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The path was appended to the pending queue.
    Queued,
    /// The path was already pending; the queue is unchanged.
    AlreadyQueued,
    /// The file is not tracked by the catalog.
    Ignored,
}

/// The key a file is registered under: its file name.
pub(crate) fn asset_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(OsStr::to_str)
}

/// Lowercased extension without the dot.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

/// The part of the catalog shared with the watcher thread.
///
/// The watcher only reads the name table and appends to the pending queue;
/// every other piece of catalog state stays on the draining thread.
pub(crate) struct CatalogInbox {
    names: RwLock<StrTable<'static, AssetId>>,
    pending: Mutex<PendingQueue>,
    /// Extensions queued even when unknown, if discovery is enabled.
    discover: Option<Vec<String>>,
}

impl CatalogInbox {
    pub(crate) fn new(discover: Option<Vec<String>>) -> Self {
        Self {
            names: RwLock::new(StrTable::new_in(&HEAP)),
            pending: Mutex::new(PendingQueue::new()),
            discover,
        }
    }

    fn pending(&self) -> MutexGuard<'_, PendingQueue> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn asset_id(&self, name: &str) -> Option<AssetId> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .find(name)
            .copied()
    }

    pub(crate) fn register(&self, name: &str, id: AssetId) -> Result<(), TableError> {
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(name.to_string(), id)
            .map(|_| ())
    }

    pub(crate) fn asset_count(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every registered name with its identifier, in no particular order.
    pub(crate) fn names(&self) -> Vec<(String, AssetId)> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect()
    }

    fn is_discoverable(&self, path: &Path) -> bool {
        let Some(extensions) = &self.discover else {
            return false;
        };
        extension_of(path).is_some_and(|ext| extensions.iter().any(|e| *e == ext))
    }

    pub(crate) fn notify(&self, path: &Path) -> NotifyOutcome {
        let known = asset_name(path).is_some_and(|name| self.asset_id(name).is_some());
        if !known && !self.is_discoverable(path) {
            log::debug!("Ignoring change to untracked file '{}'", path.display());
            return NotifyOutcome::Ignored;
        }

        match self.pending().push_unique(path) {
            Ok(true) => {
                log::debug!("Queued '{}' for reload", path.display());
                NotifyOutcome::Queued
            }
            Ok(false) => NotifyOutcome::AlreadyQueued,
            Err(err) => {
                log::error!("Dropping change to '{}': {err}", path.display());
                NotifyOutcome::Ignored
            }
        }
    }

    pub(crate) fn take_pending(&self) -> PendingQueue {
        self.pending().take()
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending().len()
    }
}
