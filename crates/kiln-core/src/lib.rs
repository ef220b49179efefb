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

//! # Kiln Core
//!
//! Foundational crate containing the engine's manual memory-lifetime model,
//! the containers built on top of it, and the interface contracts the asset
//! catalog consumes from its collaborators.

#![warn(missing_docs)]

pub mod asset;
pub mod collections;
pub mod gpu;
pub mod math;
pub mod memory;
pub mod vfs;

pub use collections::{Array, HashTable, StaticArray};
pub use memory::{Allocator, ArenaAllocator, HeapAllocator, StackAllocator, HEAP};
