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

use super::{dangling_for, Allocator, AllocatorStats, MemoryError};
use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A counting wrapper around the system allocator.
///
/// This is the heap tier: every allocation is released individually. The
/// counters are atomics so a single instance can be shared between threads.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    current_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    allocations: AtomicU64,
    releases: AtomicU64,
}

/// The process-wide heap tier, for containers that must outlive any arena.
pub static HEAP: HeapAllocator = HeapAllocator::new();

impl HeapAllocator {
    /// Creates a heap allocator with zeroed counters.
    pub const fn new() -> Self {
        Self {
            current_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            allocations: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        let size = layout.size();
        if size == 0 {
            return Ok(dangling_for(layout));
        }

        // SAFETY: the layout has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(
            MemoryError::OutOfMemory {
                requested: size,
                remaining: 0,
            },
        )?;

        let result = self.current_bytes.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| current.checked_add(size),
        );
        match result {
            Ok(previous) => {
                self.peak_bytes.fetch_max(previous + size, Ordering::Relaxed);
                self.allocations.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => log::error!("Heap tracking counter overflowed during allocate! Size: {size}"),
        }

        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        let size = layout.size();
        if size == 0 {
            return;
        }

        let result = self.current_bytes.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| current.checked_sub(size),
        );
        if result.is_err() {
            log::error!("Heap tracking counter underflowed during release! Size: {size}");
        } else {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }

        alloc::dealloc(ptr.as_ptr(), layout);
    }

    fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            current_bytes: self.current_bytes.load(Ordering::Relaxed),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }
}
