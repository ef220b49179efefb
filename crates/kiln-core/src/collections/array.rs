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

use crate::memory::{Allocator, HeapAllocator, MemoryError};
use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

/// A growable array whose buffer comes from a borrowed [`Allocator`].
///
/// Capacity doubles on overflow (0, 1, 2, 4, ...). Growing allocates a fresh
/// buffer, moves the elements over, and hands the old buffer back; on a bump
/// allocator the old buffer is simply abandoned until the allocator is rewound.
/// The buffer address is therefore not stable across growth, which the borrow
/// checker enforces for any slice obtained through [`Deref`].
pub struct Array<'a, T, A: Allocator + ?Sized = HeapAllocator> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    allocator: &'a A,
    _marker: PhantomData<T>,
}

impl<'a, T, A: Allocator + ?Sized> Array<'a, T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty array. Nothing is allocated until the first push.
    pub fn new_in(allocator: &'a A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: if Self::IS_ZST { usize::MAX } else { 0 },
            allocator,
            _marker: PhantomData,
        }
    }

    /// Creates an empty array with room for at least `capacity` elements.
    ///
    /// # Errors
    /// Propagates the allocator's failure.
    pub fn with_capacity_in(capacity: usize, allocator: &'a A) -> Result<Self, MemoryError> {
        let mut array = Self::new_in(allocator);
        if capacity > array.capacity {
            array.reallocate(capacity)?;
        }
        Ok(array)
    }

    /// The allocator backing this array.
    pub fn allocator(&self) -> &'a A {
        self.allocator
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of elements the current buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` when the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value`, growing the buffer if needed, and returns its index.
    ///
    /// # Errors
    /// Returns the allocator's error if growth fails. `value` is dropped in
    /// that case and the array is left untouched.
    pub fn try_push(&mut self, value: T) -> Result<usize, MemoryError> {
        if self.len == self.capacity {
            let doubled = if self.capacity == 0 {
                1
            } else {
                self.capacity
                    .checked_mul(2)
                    .ok_or(MemoryError::InvalidLayout)?
            };
            self.reallocate(doubled)?;
        }

        let index = self.len;
        // SAFETY: `index < capacity` after the growth check above.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        self.len += 1;
        Ok(index)
    }

    /// Appends `value` and returns its index.
    ///
    /// # Panics
    /// Panics if the allocator cannot provide a larger buffer. Use
    /// [`Array::try_push`] when exhaustion is an expected outcome.
    pub fn push(&mut self, value: T) -> usize {
        match self.try_push(value) {
            Ok(index) => index,
            Err(err) => panic!("Array::push failed to grow: {err}"),
        }
    }

    /// Removes the element at `index` by moving the last element into its slot.
    ///
    /// Runs in O(1) and does not preserve order. Removing the last element is
    /// a plain shrink.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "remove index {index} out of bounds (len {len})");

        // SAFETY: both `index` and `len - 1` are initialized slots. The value
        // at `index` is read out before the last slot is moved over it, and
        // `len` shrinks so the old last slot is no longer considered live.
        unsafe {
            let base = self.ptr.as_ptr();
            let removed = base.add(index).read();
            let last = len - 1;
            if index != last {
                ptr::copy_nonoverlapping(base.add(last), base.add(index), 1);
            }
            self.len = last;
            removed
        }
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was initialized and is now outside `len`.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drops every element, keeping the buffer.
    pub fn clear(&mut self) {
        let len = self.len;
        // Shrink first so a panicking destructor cannot cause a double drop.
        self.len = 0;
        // SAFETY: the first `len` slots were initialized.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len)) };
    }

    /// Moves every element out in index order, leaving the array empty with its
    /// buffer intact. Elements the iterator does not yield are dropped with it.
    pub fn drain_all(&mut self) -> Drain<'_, T> {
        let len = mem::replace(&mut self.len, 0);
        Drain {
            ptr: self.ptr,
            next: 0,
            len,
            _marker: PhantomData,
        }
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<(), MemoryError> {
        debug_assert!(!Self::IS_ZST);
        let new_layout = Layout::array::<T>(new_capacity).map_err(|_| MemoryError::InvalidLayout)?;
        let new_ptr = self.allocator.allocate(new_layout)?.cast::<T>();

        if self.capacity > 0 {
            // SAFETY: the old buffer holds `len` initialized elements and does
            // not overlap the fresh allocation.
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
                self.allocator.release(self.ptr.cast(), self.current_layout());
            }
        }

        self.ptr = new_ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    fn current_layout(&self) -> Layout {
        // The same layout was already validated when the buffer was allocated.
        Layout::array::<T>(self.capacity).unwrap_or_else(|_| Layout::new::<T>())
    }
}

impl<T: Clone, A: Allocator + ?Sized> Array<'_, T, A> {
    /// Clones every element of `items` onto the end of the array.
    ///
    /// # Errors
    /// Stops at the first failed growth; elements appended before it stay.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), MemoryError> {
        for item in items {
            self.try_push(item.clone())?;
        }
        Ok(())
    }
}

/// Iterator returned by [`Array::drain_all`].
pub struct Drain<'s, T> {
    ptr: NonNull<T>,
    next: usize,
    len: usize,
    _marker: PhantomData<&'s mut T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.len {
            return None;
        }
        // SAFETY: slots `next..len` are initialized and each is read once.
        let value = unsafe { self.ptr.as_ptr().add(self.next).read() };
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        let remaining = self.len - self.next;
        // SAFETY: the tail `next..len` was never yielded.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(self.next),
                remaining,
            ))
        };
    }
}

impl<T, A: Allocator + ?Sized> Deref for Array<'_, T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` is valid for `len` initialized elements (or dangling with `len == 0`).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: Allocator + ?Sized> DerefMut for Array<'_, T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as for `deref`, and `&mut self` guarantees uniqueness.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<'s, T, A: Allocator + ?Sized> IntoIterator for &'s Array<'_, T, A> {
    type Item = &'s T;
    type IntoIter = std::slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'s, T, A: Allocator + ?Sized> IntoIterator for &'s mut Array<'_, T, A> {
    type Item = &'s mut T;
    type IntoIter = std::slice::IterMut<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for Array<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: Allocator + ?Sized> Drop for Array<'_, T, A> {
    fn drop(&mut self) {
        self.clear();
        if !Self::IS_ZST && self.capacity > 0 {
            // SAFETY: the buffer was allocated from this allocator with this layout.
            unsafe { self.allocator.release(self.ptr.cast(), self.current_layout()) };
        }
    }
}

// SAFETY: the array uniquely owns its elements; the allocator is only reached
// through a shared reference, which is sendable when the allocator is `Sync`.
unsafe impl<T: Send, A: Allocator + Sync + ?Sized> Send for Array<'_, T, A> {}
// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: Allocator + Sync + ?Sized> Sync for Array<'_, T, A> {}
