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

//! The contiguous bump region shared by the arena and stack allocators.

use super::{dangling_for, AllocatorStats, MemoryError};
use std::alloc::{self, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

/// Alignment of the backing buffer itself.
const REGION_ALIGN: usize = 16;

/// A fixed-capacity buffer with a monotonic cursor.
///
/// Allocation advances the cursor past an aligned block. Only the most recent
/// allocation can be handed back individually; everything else is reclaimed by
/// rewinding the cursor.
#[derive(Debug)]
pub(crate) struct BumpRegion {
    base: NonNull<u8>,
    capacity: usize,
    cursor: Cell<usize>,
    /// Start offset of the last allocation and the cursor value before it.
    last: Cell<Option<(usize, usize)>>,
    peak: Cell<usize>,
    allocations: Cell<u64>,
    releases: Cell<u64>,
}

impl BumpRegion {
    pub(crate) fn new(capacity: usize) -> Self {
        let base = if capacity == 0 {
            NonNull::<u8>::dangling()
        } else {
            let layout = Self::buffer_layout(capacity);
            // SAFETY: the layout has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) };
            match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => alloc::handle_alloc_error(layout),
            }
        };

        Self {
            base,
            capacity,
            cursor: Cell::new(0),
            last: Cell::new(None),
            peak: Cell::new(0),
            allocations: Cell::new(0),
            releases: Cell::new(0),
        }
    }

    fn buffer_layout(capacity: usize) -> Layout {
        match Layout::from_size_align(capacity, REGION_ALIGN) {
            Ok(layout) => layout,
            Err(_) => panic!("bump region capacity {capacity} exceeds the addressable range"),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub(crate) fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        if layout.size() == 0 {
            return Ok(dangling_for(layout));
        }

        let cursor = self.cursor.get();
        let base_addr = self.base.as_ptr() as usize;
        let align = layout.align();

        // Align the absolute address so alignments larger than the buffer's own
        // alignment are honored too.
        let unaligned = base_addr
            .checked_add(cursor)
            .ok_or(MemoryError::InvalidLayout)?;
        let aligned = unaligned
            .checked_add(align - 1)
            .map(|addr| addr & !(align - 1))
            .ok_or(MemoryError::InvalidLayout)?;
        let start = aligned - base_addr;
        let end = start.checked_add(layout.size());

        let remaining = self.capacity - cursor;
        let Some(end) = end.filter(|&end| end <= self.capacity) else {
            return Err(MemoryError::OutOfMemory {
                requested: (start - cursor).saturating_add(layout.size()),
                remaining,
            });
        };

        self.cursor.set(end);
        self.last.set(Some((start, cursor)));
        self.allocations.set(self.allocations.get() + 1);
        if end > self.peak.get() {
            self.peak.set(end);
        }

        // SAFETY: `start + size <= capacity`, so the offset stays inside the buffer.
        Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(start)) })
    }

    /// Reclaims `ptr` if it is the most recent allocation. Returns whether it did.
    pub(crate) fn release_last(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
        if layout.size() == 0 {
            return true;
        }

        let offset = (ptr.as_ptr() as usize).wrapping_sub(self.base.as_ptr() as usize);
        match self.last.get() {
            Some((start, previous)) if start == offset => {
                self.cursor.set(previous);
                self.last.set(None);
                self.releases.set(self.releases.get() + 1);
                true
            }
            _ => false,
        }
    }

    /// Moves the cursor back to `mark`, invalidating everything allocated after it.
    pub(crate) fn rewind(&self, mark: usize) {
        debug_assert!(mark <= self.cursor.get(), "rewind past the current cursor");
        self.cursor.set(mark.min(self.cursor.get()));
        self.last.set(None);
    }

    pub(crate) fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            current_bytes: self.cursor.get(),
            peak_bytes: self.peak.get(),
            allocations: self.allocations.get(),
            releases: self.releases.get(),
        }
    }
}

impl Drop for BumpRegion {
    fn drop(&mut self) {
        if self.capacity != 0 {
            // SAFETY: `base` was allocated in `new` with exactly this layout.
            unsafe { alloc::dealloc(self.base.as_ptr(), Self::buffer_layout(self.capacity)) };
        }
    }
}

// SAFETY: the region exclusively owns its buffer; moving it to another thread
// moves that ownership. It is not `Sync` because of the `Cell` bookkeeping.
unsafe impl Send for BumpRegion {}
