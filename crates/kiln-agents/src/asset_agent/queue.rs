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

use kiln_core::collections::Array;
use kiln_core::memory::{HeapAllocator, MemoryError, HEAP};
use std::mem;
use std::path::{Path, PathBuf};

/// An ordered set of paths awaiting reprocessing.
///
/// Paths keep their first-enqueue order and appear at most once.
#[derive(Debug)]
pub struct PendingQueue {
    paths: Array<'static, PathBuf, HeapAllocator>,
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingQueue {
    /// Creates an empty queue backed by the process heap.
    pub fn new() -> Self {
        Self {
            paths: Array::new_in(&HEAP),
        }
    }

    /// Number of queued paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if `path` is already queued.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|queued| queued == path)
    }

    /// Appends `path` unless it is already queued. Returns whether it was added.
    pub fn push_unique(&mut self, path: &Path) -> Result<bool, MemoryError> {
        if self.contains(path) {
            return Ok(false);
        }
        self.paths.try_push(path.to_path_buf())?;
        Ok(true)
    }

    /// Takes every queued path, in order, leaving the queue empty.
    pub fn take(&mut self) -> PendingQueue {
        mem::take(self)
    }

    /// Iterates over the queued paths in order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> + '_ {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Removes and returns the queued paths in order.
    pub fn drain(&mut self) -> impl Iterator<Item = PathBuf> + '_ {
        self.paths.drain_all()
    }
}
