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

//! Containers that allocate through a borrowed [`Allocator`](crate::memory::Allocator).

mod array;
mod hash_table;
mod static_array;

pub use array::{Array, Drain};
pub use hash_table::{
    HashTable, KeyStrategy, Pair, PodKeys, PodTable, StrKeys, StrTable, TableError, TABLE_SIZE,
};
pub use static_array::StaticArray;
