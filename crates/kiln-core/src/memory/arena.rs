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

use super::bump::BumpRegion;
use super::{Allocator, AllocatorStats, MemoryError};
use std::alloc::Layout;
use std::ptr::NonNull;

/// A bump allocator over a fixed-capacity buffer, reset wholesale.
///
/// Used for both the frame tier (reset once per frame) and the persistent tier
/// (never reset). Individual releases only reclaim the most recent allocation.
#[derive(Debug)]
pub struct ArenaAllocator {
    region: BumpRegion,
}

impl ArenaAllocator {
    /// Creates an arena owning `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        log::debug!("Creating arena allocator with {capacity} bytes");
        Self {
            region: BumpRegion::new(capacity),
        }
    }

    /// Total size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Bytes consumed since the last reset, including alignment padding.
    pub fn used(&self) -> usize {
        self.region.cursor()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Rewinds the arena to empty.
    ///
    /// Taking `&mut self` guarantees no container still borrows the arena.
    pub fn reset(&mut self) {
        self.region.rewind(0);
    }
}

impl Allocator for ArenaAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        self.region.allocate(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if !self.region.release_last(ptr, layout) {
            log::debug!(
                "Arena release of {} bytes ignored: not the most recent allocation",
                layout.size()
            );
        }
    }

    fn stats(&self) -> AllocatorStats {
        self.region.stats()
    }
}
