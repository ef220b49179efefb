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

//! Provides the engine's manual memory-lifetime model.
//!
//! Every container in Kiln allocates through an [`Allocator`], and the allocator a
//! caller picks is how it expresses the intended lifetime of the data:
//!
//! - **frame**: an [`ArenaAllocator`] or a [`StackScope`] that is rewound every
//!   frame (or every unit of scratch work),
//! - **persistent**: an [`ArenaAllocator`] that is never reset,
//! - **heap**: the [`HeapAllocator`], released manually, element by element.
//!
//! Allocators are never owned by the data they back. Containers borrow their
//! allocator, so the borrow checker refuses to reset an arena or close a stack
//! scope while anything allocated from it is still alive.

mod arena;
mod bump;
mod heap;
mod stack;

pub use arena::ArenaAllocator;
pub use heap::{HeapAllocator, HEAP};
pub use stack::{StackAllocator, StackScope};

use std::alloc::Layout;
use std::ptr::NonNull;
use thiserror::Error;

/// An error returned when an allocator cannot satisfy a request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The allocator does not have enough space left for the request.
    #[error("allocator out of memory: requested {requested} bytes, {remaining} remaining")]
    OutOfMemory {
        /// The number of bytes requested (including alignment padding).
        requested: usize,
        /// The number of bytes still available in the allocator.
        remaining: usize,
    },
    /// The requested size and alignment do not form a valid layout.
    #[error("invalid allocation layout")]
    InvalidLayout,
}

/// A snapshot of an allocator's bookkeeping counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Bytes currently handed out (for bump allocators: the cursor position).
    pub current_bytes: usize,
    /// The highest value `current_bytes` has ever reached.
    pub peak_bytes: usize,
    /// Number of successful allocation calls.
    pub allocations: u64,
    /// Number of release calls that actually reclaimed memory.
    pub releases: u64,
}

/// The capability every lifetime strategy provides: hand out memory, take it back.
///
/// Allocation goes through `&self` so that several containers can share one
/// allocator. Operations that invalidate every outstanding allocation at once
/// (resetting an arena, closing a stack scope) require exclusive access instead.
pub trait Allocator {
    /// Allocates a block of memory fitting `layout`.
    ///
    /// Zero-sized layouts never touch the backing storage and return a dangling,
    /// well-aligned pointer.
    ///
    /// # Errors
    /// Returns [`MemoryError::OutOfMemory`] when the allocator is exhausted.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, MemoryError>;

    /// Hands a block back to the allocator.
    ///
    /// Bump allocators only reclaim the block when it is the most recent
    /// allocation; any other release is a logged no-op and the memory stays
    /// reserved until the whole allocator is rewound.
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate` on this same allocator with
    /// the same `layout`, and must not be used after this call.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);

    /// Returns a snapshot of the allocator's counters.
    fn stats(&self) -> AllocatorStats;
}

/// Returns a dangling pointer aligned for `layout`, used for zero-sized requests.
#[inline]
pub(crate) fn dangling_for(layout: Layout) -> NonNull<u8> {
    // Alignment is always a non-zero power of two.
    NonNull::new(layout.align() as *mut u8).unwrap_or(NonNull::dangling())
}
