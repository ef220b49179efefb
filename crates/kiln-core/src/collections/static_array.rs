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

use std::fmt;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::ptr;

/// A fixed-capacity array over caller-supplied storage.
///
/// The array never allocates or resizes; it only tracks how much of the borrowed
/// storage is initialized. Pushing past the end is a programmer error.
pub struct StaticArray<'a, T> {
    slots: &'a mut [MaybeUninit<T>],
    len: usize,
}

impl<'a, T> StaticArray<'a, T> {
    /// Wraps `slots` as an empty array whose capacity is `slots.len()`.
    pub fn new(slots: &'a mut [MaybeUninit<T>]) -> Self {
        Self { slots, len: 0 }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no further element fits.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Appends `value` and returns its index.
    ///
    /// # Panics
    /// Panics if the array is full.
    pub fn push(&mut self, value: T) -> usize {
        assert!(
            !self.is_full(),
            "StaticArray::push past capacity {}",
            self.capacity()
        );
        let index = self.len;
        self.slots[index].write(value);
        self.len += 1;
        index
    }

    /// Removes the element at `index` by moving the last element into its slot.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "remove index {index} out of bounds (len {})", self.len);
        let last = self.len - 1;
        self.slots.swap(index, last);
        self.len = last;
        // SAFETY: slot `last` now holds the removed, initialized value and is
        // outside the live range.
        unsafe { self.slots[last].assume_init_read() }
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // SAFETY: the first `len` slots were initialized.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.slots.as_mut_ptr().cast::<T>(),
                len,
            ))
        };
    }
}

impl<T> Deref for StaticArray<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { std::slice::from_raw_parts(self.slots.as_ptr().cast::<T>(), self.len) }
    }
}

impl<T> DerefMut for StaticArray<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { std::slice::from_raw_parts_mut(self.slots.as_mut_ptr().cast::<T>(), self.len) }
    }
}

impl<T: fmt::Debug> fmt::Debug for StaticArray<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Drop for StaticArray<'_, T> {
    fn drop(&mut self) {
        self.clear();
    }
}
