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

//! The asset catalog and everything it needs to cold-load and hot-reload files.
//!
//! Loading a file goes through three steps:
//! 1. The [`Catalog`] picks a [`CatalogHandler`] by the file's extension.
//! 2. The handler decodes the bytes with a lane from `kiln_lanes`.
//! 3. The handler stores the record through the [`HandlerContext`], which hands
//!    out the [`AssetId`](kiln_core::asset::AssetId) and talks to the GPU.
//!
//! At runtime a background watcher feeds changed paths into a shared queue, and
//! [`Catalog::drain`] replays them on the owning thread once per frame.

mod catalog;
mod config;
mod context;
mod error;
mod handlers;
mod inbox;
mod queue;
mod store;

pub use catalog::Catalog;
pub use config::{CatalogConfig, FolderConfig, DEFAULT_SCRATCH_BYTES};
pub use context::HandlerContext;
pub use error::CatalogError;
pub use handlers::{CatalogHandler, EntityHandler, HandlerRegistry, MeshHandler, TextureHandler};
pub use inbox::NotifyOutcome;
pub use queue::PendingQueue;
pub use store::{AssetKind, AssetStore, EntityAsset, MeshAsset, TextureAsset};
