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

use super::array::Array;
use crate::memory::{Allocator, HeapAllocator, MemoryError};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use thiserror::Error;

/// Number of buckets in every [`HashTable`].
pub const TABLE_SIZE: usize = 128;

/// An error returned when inserting into a [`HashTable`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The key is already present; the table was left unchanged.
    #[error("key already present in table")]
    DuplicateKey,
    /// The bucket could not grow.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// How a [`HashTable`] hashes and compares its keys.
pub trait KeyStrategy {
    /// The borrowed form lookups are performed with.
    type Key: ?Sized;

    /// Hashes a key. Only the value modulo [`TABLE_SIZE`] is used.
    fn hash(key: &Self::Key) -> u64;

    /// Compares two keys for equality.
    fn eq(a: &Self::Key, b: &Self::Key) -> bool;
}

/// Byte-string keys: FNV-1a over the UTF-8 bytes, byte-wise equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrKeys;

impl KeyStrategy for StrKeys {
    type Key = str;

    fn hash(key: &str) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        key.bytes()
            .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
    }

    fn eq(a: &str, b: &str) -> bool {
        a == b
    }
}

/// Fixed-size keys: hashed with `ahash` using fixed seeds, compared with `==`.
pub struct PodKeys<K>(PhantomData<fn() -> K>);

const POD_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

impl<K: Hash + Eq> KeyStrategy for PodKeys<K> {
    type Key = K;

    fn hash(key: &K) -> u64 {
        ahash::RandomState::with_seeds(POD_SEEDS[0], POD_SEEDS[1], POD_SEEDS[2], POD_SEEDS[3])
            .hash_one(key)
    }

    fn eq(a: &K, b: &K) -> bool {
        a == b
    }
}

/// A stored key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair<K, V> {
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

/// An append-only hash table with [`TABLE_SIZE`] buckets, each an [`Array`] of pairs.
///
/// A key is stored at most once: adding an existing key is rejected and leaves
/// the table untouched. There is no overwrite and no removal. References
/// returned by [`HashTable::find`] borrow the table, so they cannot outlive the
/// next insertion.
pub struct HashTable<'a, K, V, S, A = HeapAllocator>
where
    S: KeyStrategy,
    K: Borrow<S::Key>,
    A: Allocator + ?Sized,
{
    buckets: [Array<'a, Pair<K, V>, A>; TABLE_SIZE],
    len: usize,
    _strategy: PhantomData<fn() -> S>,
}

/// A table keyed by owned strings, looked up by `&str`.
pub type StrTable<'a, V, A = HeapAllocator> = HashTable<'a, String, V, StrKeys, A>;

/// A table keyed by small `Copy` values such as identifiers.
pub type PodTable<'a, K, V, A = HeapAllocator> = HashTable<'a, K, V, PodKeys<K>, A>;

impl<'a, K, V, S, A> HashTable<'a, K, V, S, A>
where
    S: KeyStrategy,
    K: Borrow<S::Key>,
    A: Allocator + ?Sized,
{
    /// Creates an empty table whose buckets allocate from `allocator`.
    pub fn new_in(allocator: &'a A) -> Self {
        Self {
            buckets: std::array::from_fn(|_| Array::new_in(allocator)),
            len: 0,
            _strategy: PhantomData,
        }
    }

    #[inline]
    fn bucket_of(key: &S::Key) -> usize {
        (S::hash(key) % TABLE_SIZE as u64) as usize
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the table holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key` with `value` and returns a reference to the stored value.
    ///
    /// # Errors
    /// [`TableError::DuplicateKey`] if `key` is already present, or
    /// [`TableError::Memory`] if the bucket cannot grow. The table is unchanged
    /// in both cases.
    pub fn add(&mut self, key: K, value: V) -> Result<&mut V, TableError> {
        let bucket = &mut self.buckets[Self::bucket_of(key.borrow())];
        if bucket
            .iter()
            .any(|pair| S::eq(pair.key.borrow(), key.borrow()))
        {
            log::error!("Rejected duplicate key in hash table");
            return Err(TableError::DuplicateKey);
        }

        let index = bucket.try_push(Pair { key, value })?;
        self.len += 1;
        Ok(&mut bucket[index].value)
    }

    /// Looks up the value stored under `key`.
    pub fn find(&self, key: &S::Key) -> Option<&V> {
        self.buckets[Self::bucket_of(key)]
            .iter()
            .find(|pair| S::eq(pair.key.borrow(), key))
            .map(|pair| &pair.value)
    }

    /// Looks up the value stored under `key` for in-place mutation.
    pub fn find_mut(&mut self, key: &S::Key) -> Option<&mut V> {
        self.buckets[Self::bucket_of(key)]
            .iter_mut()
            .find(|pair| S::eq(pair.key.borrow(), key))
            .map(|pair| &mut pair.value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &S::Key) -> bool {
        self.find(key).is_some()
    }

    /// Iterates over every pair, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter())
            .map(|pair| (&pair.key, &pair.value))
    }
}

impl<K, V, S, A> fmt::Debug for HashTable<'_, K, V, S, A>
where
    S: KeyStrategy,
    K: Borrow<S::Key> + fmt::Debug,
    V: fmt::Debug,
    A: Allocator + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ArenaAllocator;

    #[test]
    fn add_then_find_returns_the_value() {
        let heap = HeapAllocator::new();
        let mut table: StrTable<'_, u32> = HashTable::new_in(&heap);
        for (i, name) in ["a.bmp", "b.obj", "c.ent", "d.bmp"].iter().enumerate() {
            table.add(name.to_string(), i as u32).unwrap();
        }
        assert_eq!(table.len(), 4);
        assert_eq!(table.find("a.bmp"), Some(&0));
        assert_eq!(table.find("c.ent"), Some(&2));
        assert_eq!(table.find("missing"), None);
    }

    #[test]
    fn duplicate_add_leaves_table_unchanged() {
        let heap = HeapAllocator::new();
        let mut table: StrTable<'_, &str> = HashTable::new_in(&heap);
        table.add("key".to_string(), "first").unwrap();

        let err = table.add("key".to_string(), "second").unwrap_err();
        assert_eq!(err, TableError::DuplicateKey);
        assert_eq!(table.len(), 1);
        assert_eq!(table.find("key"), Some(&"first"));
    }

    #[test]
    fn many_keys_share_buckets_without_loss() {
        let arena = ArenaAllocator::new(1 << 20);
        let mut table: PodTable<'_, u32, u32, _> = HashTable::new_in(&arena);
        for key in 0..1000u32 {
            table.add(key, key * 2).unwrap();
        }
        for key in 0..1000u32 {
            assert_eq!(table.find(&key), Some(&(key * 2)));
        }
        assert_eq!(table.iter().count(), 1000);
    }

    #[test]
    fn find_mut_edits_in_place() {
        let heap = HeapAllocator::new();
        let mut table: PodTable<'_, u64, String> = HashTable::new_in(&heap);
        table.add(7, "seven".to_string()).unwrap();
        table.find_mut(&7).unwrap().push('!');
        assert_eq!(table.find(&7).map(String::as_str), Some("seven!"));
    }

    #[test]
    fn fnv_matches_reference_values() {
        assert_eq!(StrKeys::hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(StrKeys::hash("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
