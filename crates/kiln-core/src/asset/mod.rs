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

//! Provides the primitive types shared by every part of the asset pipeline.
//!
//! This module defines the identifiers the catalog hands out and the plain
//! in-memory records the decoders produce. It has no knowledge of how files
//! are read, decoded, or stored.

mod entity;
mod id;
mod mesh;
mod texture;

pub use entity::*;
pub use id::*;
pub use mesh::*;
pub use texture::*;

/// A marker trait for the records a decoder can produce.
///
/// The supertraits let decoded records be moved across threads and stored for
/// the lifetime of the application.
pub trait Asset: Send + Sync + 'static {}
