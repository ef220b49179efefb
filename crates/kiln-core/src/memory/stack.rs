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

/// A bump allocator with scoped rollback, used for scratch work.
///
/// Memory is only handed out through a [`StackScope`]. Dropping the scope
/// rewinds the cursor to where the scope began, discarding everything it
/// allocated. Scopes nest: a child scope mutably borrows its parent, so the
/// parent cannot allocate until the child has been closed.
#[derive(Debug)]
pub struct StackAllocator {
    region: BumpRegion,
}

impl StackAllocator {
    /// Creates a stack allocator owning `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        log::debug!("Creating stack allocator with {capacity} bytes");
        Self {
            region: BumpRegion::new(capacity),
        }
    }

    /// Total size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Current cursor position. Zero whenever no scope is open.
    pub fn mark(&self) -> usize {
        self.region.cursor()
    }

    /// Bytes currently in use.
    pub fn used(&self) -> usize {
        self.region.cursor()
    }

    /// Counters accumulated over the allocator's life.
    pub fn stats(&self) -> AllocatorStats {
        self.region.stats()
    }

    /// Opens a scope at the current cursor.
    pub fn scope(&mut self) -> StackScope<'_> {
        StackScope::open(&self.region)
    }
}

/// An open region of a [`StackAllocator`]. Rewinds on drop.
#[derive(Debug)]
pub struct StackScope<'s> {
    region: &'s BumpRegion,
    mark: usize,
}

impl<'s> StackScope<'s> {
    fn open(region: &'s BumpRegion) -> Self {
        Self {
            mark: region.cursor(),
            region,
        }
    }

    /// The cursor position this scope will rewind to.
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// Bytes allocated inside this scope so far.
    pub fn used(&self) -> usize {
        self.region.cursor() - self.mark
    }

    /// Opens a nested scope. Its allocations are discarded when it is dropped,
    /// leaving this scope's allocations untouched.
    pub fn scope(&mut self) -> StackScope<'_> {
        StackScope::open(self.region)
    }
}

impl Allocator for StackScope<'_> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError> {
        self.region.allocate(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if !self.region.release_last(ptr, layout) {
            log::debug!(
                "Stack release of {} bytes ignored: not the most recent allocation",
                layout.size()
            );
        }
    }

    fn stats(&self) -> AllocatorStats {
        self.region.stats()
    }
}

impl Drop for StackScope<'_> {
    fn drop(&mut self) {
        self.region.rewind(self.mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_scope_rewinds_to_its_mark() {
        let mut stack = StackAllocator::new(128);
        {
            let scope = stack.scope();
            scope.allocate(Layout::array::<u8>(40).unwrap()).unwrap();
            assert_eq!(scope.used(), 40);
        }
        assert_eq!(stack.used(), 0);
    }

    #[test]
    fn nested_scopes_only_discard_their_own_allocations() {
        let mut stack = StackAllocator::new(128);
        let mut outer = stack.scope();
        outer.allocate(Layout::array::<u8>(10).unwrap()).unwrap();
        {
            let inner = outer.scope();
            assert_eq!(inner.mark(), 10);
            inner.allocate(Layout::array::<u8>(20).unwrap()).unwrap();
            assert_eq!(inner.used(), 20);
        }
        assert_eq!(outer.used(), 10);
        drop(outer);
        assert_eq!(stack.mark(), 0);
    }

    #[test]
    fn scope_reports_exhaustion() {
        let mut stack = StackAllocator::new(16);
        let scope = stack.scope();
        assert!(matches!(
            scope.allocate(Layout::array::<u8>(17).unwrap()),
            Err(MemoryError::OutOfMemory { .. })
        ));
    }

    #[test]
    fn peak_survives_rewinds() {
        let mut stack = StackAllocator::new(64);
        {
            let scope = stack.scope();
            scope.allocate(Layout::array::<u8>(48).unwrap()).unwrap();
        }
        {
            let scope = stack.scope();
            scope.allocate(Layout::array::<u8>(8).unwrap()).unwrap();
        }
        let stats = stack.stats();
        assert_eq!(stats.peak_bytes, 48);
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.current_bytes, 0);
    }
}
